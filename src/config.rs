//! Training run configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::classifier::DEFAULT_THRESHOLD;
use crate::error::{Result, TriageError};
use crate::features::FeatureConfig;
use crate::search::grid::ParamGrid;
use crate::search::metrics::Metric;

/// Settings of one training run. Every field has a default, so a JSON file
/// only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Fraction of messages held out for evaluation.
    pub test_size: f64,
    /// Seed of the train/test shuffle.
    pub seed: u64,
    /// Number of cross-validation folds.
    pub folds: usize,
    pub grid: ParamGrid,
    /// Metric used to pick the best candidate.
    pub refit_metric: Metric,
    /// Probability above which a category is predicted positive.
    pub threshold: f64,
    pub features: FeatureConfig,
    /// SQLite table name. Defaults to the dataset file stem.
    pub table: Option<String>,
    /// Upper bound on search worker threads. `None` uses every core.
    pub threads: Option<usize>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        TrainingConfig {
            test_size: 0.3,
            seed: 42,
            folds: 5,
            grid: ParamGrid::default(),
            refit_metric: Metric::F1,
            threshold: DEFAULT_THRESHOLD,
            features: FeatureConfig::default(),
            table: None,
            threads: None,
        }
    }
}

impl TrainingConfig {
    /// Read a JSON configuration file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: TrainingConfig = serde_json::from_str(&content).map_err(|e| {
            TriageError::invalid_config(format!(
                "Failed to parse config {}: {e}",
                path.display()
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(TriageError::invalid_config(format!(
                "test_size must be in (0, 1), got {}",
                self.test_size
            )));
        }
        if self.folds < 2 {
            return Err(TriageError::invalid_config(format!(
                "folds must be at least 2, got {}",
                self.folds
            )));
        }
        if !(self.threshold > 0.0 && self.threshold < 1.0) {
            return Err(TriageError::invalid_config(format!(
                "threshold must be in (0, 1), got {}",
                self.threshold
            )));
        }
        if self.threads == Some(0) {
            return Err(TriageError::invalid_config("threads must be at least 1"));
        }
        self.grid.expand().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::grid::Solver;

    #[test]
    fn test_defaults() {
        let config = TrainingConfig::default();
        assert_eq!(config.test_size, 0.3);
        assert_eq!(config.folds, 5);
        assert_eq!(config.grid.len(), 6);
        assert_eq!(config.refit_metric, Metric::F1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("train.json");
        fs::write(
            &path,
            r#"{"folds": 3, "refit_metric": "recall", "grid": {"solver": ["lbfgs"]}}"#,
        )
        .unwrap();

        let config = TrainingConfig::from_file(&path).unwrap();
        assert_eq!(config.folds, 3);
        assert_eq!(config.refit_metric, Metric::Recall);
        assert_eq!(config.grid.solver, vec![Solver::Lbfgs]);
        assert_eq!(config.grid.c, vec![1.0, 5.0, 10.0]);
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, r#"{"test_size": 1.5}"#).unwrap();
        assert!(TrainingConfig::from_file(&path).is_err());

        fs::write(&path, "not json").unwrap();
        assert!(TrainingConfig::from_file(&path).is_err());

        let config = TrainingConfig {
            folds: 1,
            ..TrainingConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
