//! Supervised classifiers over feature matrices.

pub mod logistic;
pub mod multi_label;

pub use logistic::{BinaryModel, FitReport, LogisticRegression};
pub use multi_label::{DEFAULT_THRESHOLD, MultiLabelClassifier};

use crate::dataset::LabelMatrix;
use crate::error::Result;
use crate::features::FeatureMatrix;

/// The final stage of a [`Pipeline`](crate::pipeline::Pipeline).
///
/// Shares the stage contract of [`Transformer`](crate::features::Transformer):
/// `fit` learns from training rows only and `predict` depends on nothing but
/// the fitted state and its input. Feature stages map text to a
/// [`FeatureMatrix`]; the estimator maps that matrix to labels.
pub trait Estimator: Send + Sync {
    /// Fit on feature rows and their labels.
    fn fit(&mut self, x: &FeatureMatrix, y: &LabelMatrix) -> Result<()>;

    /// Predict one label row per feature row, columns in fitted category
    /// order.
    fn predict(&self, x: &FeatureMatrix) -> Result<LabelMatrix>;

    fn name(&self) -> &'static str;
}
