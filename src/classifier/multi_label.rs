//! One independent binary classifier per category.

use rayon::ThreadPoolBuilder;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::classifier::Estimator;
use crate::classifier::logistic::{FitReport, LogisticRegression};
use crate::dataset::LabelMatrix;
use crate::error::{Result, TriageError};
use crate::features::FeatureMatrix;
use crate::search::grid::{ModelConfig, Parallelism};

/// Probability above which a category is predicted positive.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

/// Multi-label classifier: a [`LogisticRegression`] per category, fitted
/// and applied independently.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MultiLabelClassifier {
    config: ModelConfig,
    threshold: f64,
    categories: Vec<String>,
    estimators: Vec<LogisticRegression>,
}

impl MultiLabelClassifier {
    pub fn new(config: ModelConfig) -> Self {
        MultiLabelClassifier {
            config,
            threshold: DEFAULT_THRESHOLD,
            categories: Vec::new(),
            estimators: Vec::new(),
        }
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Categories in prediction order. Empty until fitted.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    pub fn estimators(&self) -> &[LogisticRegression] {
        &self.estimators
    }

    pub fn is_fitted(&self) -> bool {
        !self.estimators.is_empty()
    }

    /// Run `op` on the configured number of threads.
    fn run<T, F>(&self, op: F) -> Result<T>
    where
        T: Send,
        F: FnOnce() -> Result<T> + Send,
    {
        match self.config.n_jobs {
            Parallelism::All => op(),
            jobs @ Parallelism::Threads(_) => {
                let pool = ThreadPoolBuilder::new()
                    .num_threads(jobs.threads())
                    .thread_name(|i| format!("triage-fit-{i}"))
                    .build()
                    .map_err(|e| {
                        TriageError::internal(format!("Failed to create thread pool: {e}"))
                    })?;
                pool.install(op)
            }
        }
    }

    /// Positive-class probabilities, one column per category.
    pub fn predict_proba(&self, x: &FeatureMatrix) -> Result<Vec<Vec<f64>>> {
        if !self.is_fitted() {
            return Err(TriageError::model("multi-label classifier is not fitted"));
        }
        self.estimators
            .par_iter()
            .map(|estimator| estimator.predict_proba(x))
            .collect()
    }
}

impl Estimator for MultiLabelClassifier {
    fn fit(&mut self, x: &FeatureMatrix, y: &LabelMatrix) -> Result<()> {
        if y.n_categories() == 0 {
            return Err(TriageError::model("no categories to fit"));
        }
        self.config.validate()?;

        let config = self.config;
        let fitted: Vec<(LogisticRegression, FitReport)> = self.run(|| {
            (0..y.n_categories())
                .into_par_iter()
                .map(|j| {
                    let mut estimator = LogisticRegression::new(&config);
                    let report = estimator.fit(x, &y.column(j))?;
                    Ok((estimator, report))
                })
                .collect::<Result<Vec<_>>>()
        })?;

        for (name, (_, report)) in y.categories().iter().zip(&fitted) {
            log::debug!(
                "category '{name}': {} iterations, converged={}",
                report.iterations,
                report.converged
            );
        }

        self.categories = y.categories().to_vec();
        self.estimators = fitted.into_iter().map(|(e, _)| e).collect();
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<LabelMatrix> {
        let probabilities = self.predict_proba(x)?;
        let rows = (0..x.rows())
            .map(|i| {
                probabilities
                    .iter()
                    .map(|column| u8::from(column[i] > self.threshold))
                    .collect()
            })
            .collect();
        LabelMatrix::from_rows(self.categories.clone(), rows)
    }

    fn name(&self) -> &'static str {
        "multi_label_logistic"
    }
}
