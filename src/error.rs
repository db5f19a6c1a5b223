//! Error types for the triage library.
//!
//! All fallible operations return [`TriageError`] through the [`Result`]
//! alias. Each pipeline stage has its own variant so that a failure deep
//! inside a cross-validation fold still tells the caller which stage broke.
//!
//! # Examples
//!
//! ```
//! use triage::error::{Result, TriageError};
//!
//! fn fit_nothing(docs: &[String]) -> Result<()> {
//!     if docs.is_empty() {
//!         return Err(TriageError::feature("cannot fit on an empty corpus"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(fit_nothing(&[]).is_err());
//! ```

use std::io;

use thiserror::Error;

/// The main error type for triage operations.
#[derive(Error, Debug)]
pub enum TriageError {
    /// I/O errors (missing dataset, unreadable artifact path, ...)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Dataset shape or content errors
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Feature extraction errors
    #[error("Feature error: {0}")]
    Feature(String),

    /// Classifier fitting or prediction errors
    #[error("Model error: {0}")]
    Model(String),

    /// Hyperparameter search errors
    #[error("Search error: {0}")]
    Search(String),

    /// Artifact encoding/decoding errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Relational store errors
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// CSV reader errors
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),
}

/// Result type alias for operations that may fail with TriageError.
pub type Result<T> = std::result::Result<T, TriageError>;

impl TriageError {
    /// Create a new dataset error.
    pub fn dataset<S: Into<String>>(msg: S) -> Self {
        TriageError::Dataset(msg.into())
    }

    /// Create a new feature error.
    pub fn feature<S: Into<String>>(msg: S) -> Self {
        TriageError::Feature(msg.into())
    }

    /// Create a new model error.
    pub fn model<S: Into<String>>(msg: S) -> Self {
        TriageError::Model(msg.into())
    }

    /// Create a new search error.
    pub fn search<S: Into<String>>(msg: S) -> Self {
        TriageError::Search(msg.into())
    }

    /// Create a new serialization error.
    pub fn serialization<S: Into<String>>(msg: S) -> Self {
        TriageError::Serialization(msg.into())
    }

    /// Create a new invalid config error.
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        TriageError::Other(format!("Invalid configuration: {}", msg.into()))
    }

    /// Create a new invalid argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        TriageError::Other(format!("Invalid argument: {}", msg.into()))
    }

    /// Create a new internal error.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        TriageError::Other(format!("Internal error: {}", msg.into()))
    }
}
