//! # Triage
//!
//! Multi-label classifier training for disaster-response messages.
//!
//! A training run loads labelled messages from a SQLite database or a CSV
//! file, drops categories that never vary, searches a hyperparameter grid
//! with k-fold cross-validation, reports held-out scores, refits the best
//! configuration on every message and saves the result as one artifact.
//!
//! ## Features
//!
//! - Message normalization chain (tokenize, stop words, lemmas)
//! - TF-IDF, token-count, word-count and character-count features
//! - One logistic regression per category (`lbfgs` and `saga` solvers)
//! - Parallel grid search with rayon
//! - Checksummed model artifacts
//!
//! ```no_run
//! use triage::config::TrainingConfig;
//! use triage::train::Trainer;
//!
//! let summary = Trainer::new(TrainingConfig::default())
//!     .run("data/DisasterResponse.db", "classifier.bin")
//!     .unwrap();
//! println!("{}", summary.report);
//! ```

pub mod analysis;
pub mod classifier;
pub mod cli;
pub mod config;
pub mod dataset;
pub mod error;
pub mod evaluate;
pub mod features;
pub mod persist;
pub mod pipeline;
pub mod search;
pub mod train;

pub mod prelude {
    pub use crate::config::TrainingConfig;
    pub use crate::error::{Result, TriageError};
    pub use crate::persist::{ModelArtifact, load, save};
    pub use crate::pipeline::{LabelVector, Pipeline};
    pub use crate::train::Trainer;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
