//! Hyperparameter search: parameter grids, k-fold splits, scoring metrics
//! and the cross-validated search engine.

pub mod cv;
pub mod engine;
pub mod grid;
pub mod metrics;

pub use self::cv::{Fold, KFold};
pub use self::engine::{CandidateResult, GridSearch, GridSearchResult, MetricScores};
pub use self::grid::{ClassWeight, ModelConfig, MultiClass, Parallelism, ParamGrid, Solver};
pub use self::metrics::{Average, ClassScores, Metric};
