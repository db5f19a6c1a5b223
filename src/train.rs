//! Training run orchestration.
//!
//! Stages run strictly in sequence and each one finishes before the next
//! starts:
//!
//! ```text
//! load -> exclude constant categories -> split -> search -> evaluate
//!      -> final fit on every message -> save
//! ```
//!
//! A line is printed to stdout at every stage boundary.

use std::path::Path;
use std::time::Instant;

use chrono::Utc;
use serde::Serialize;

use crate::config::TrainingConfig;
use crate::dataset::{CategorySet, Dataset, DatasetLoader, train_test_split};
use crate::error::{Result, TriageError};
use crate::evaluate::{EvaluationReport, Evaluator};
use crate::persist::{self, ArtifactMetadata, ModelArtifact};
use crate::pipeline::Pipeline;
use crate::search::engine::{GridSearch, GridSearchResult};

/// Outcome of a completed training run.
#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub dataset: String,
    pub model: String,
    pub examples: usize,
    pub train_examples: usize,
    pub test_examples: usize,
    pub categories: CategorySet,
    pub report: EvaluationReport,
    pub metadata: ArtifactMetadata,
    pub duration_secs: f64,
}

/// Runs every training stage for one dataset.
#[derive(Debug, Clone)]
pub struct Trainer {
    config: TrainingConfig,
    print_report: bool,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Trainer {
            config,
            print_report: true,
        }
    }

    /// Whether the evaluation table is printed after the evaluation stage.
    pub fn with_print_report(mut self, print_report: bool) -> Self {
        self.print_report = print_report;
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Train on the dataset at `dataset_path` and write the model to
    /// `model_path`.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        dataset_path: P,
        model_path: Q,
    ) -> Result<TrainingSummary> {
        let dataset_path = dataset_path.as_ref();
        let model_path = model_path.as_ref();
        self.config.validate()?;
        let started = Instant::now();

        println!("Loading data...\n    DATABASE: {}", dataset_path.display());
        let (dataset, categories) = self.load(dataset_path)?;
        let (train, test) = train_test_split(dataset.len(), self.config.test_size, self.config.seed)?;
        let train_set = dataset.select(&train);
        let test_set = dataset.select(&test);

        println!("Building model...");
        let search = self.build_search();

        println!("Training model...");
        let result = search.fit(&train_set.messages(), train_set.labels())?;

        println!("Evaluating model...");
        let report = Evaluator::new(&result).evaluate(&test_set.messages(), test_set.labels())?;
        if self.print_report {
            println!("{report}");
        }

        println!("Building final model with best parameters...");
        let artifact = self.build_final_model(&dataset, &categories, &result)?;

        println!("Saving model...\n    MODEL: {}", model_path.display());
        persist::save(&artifact, model_path)?;

        println!("Trained model saved!");

        Ok(TrainingSummary {
            dataset: dataset_path.display().to_string(),
            model: model_path.display().to_string(),
            examples: dataset.len(),
            train_examples: train.len(),
            test_examples: test.len(),
            categories,
            report,
            metadata: artifact.metadata().clone(),
            duration_secs: started.elapsed().as_secs_f64(),
        })
    }

    /// Load the dataset and drop categories without any variation.
    pub fn load(&self, path: &Path) -> Result<(Dataset, CategorySet)> {
        let mut loader = DatasetLoader::new();
        if let Some(table) = &self.config.table {
            loader = loader.with_table(table.as_str());
        }
        let (dataset, categories) = loader.load(path)?.retain_informative()?;

        if categories.retained.is_empty() {
            return Err(TriageError::dataset(
                "no category has both positive and negative examples",
            ));
        }
        log::info!(
            "{} messages, {} categories retained, {} excluded",
            dataset.len(),
            categories.retained.len(),
            categories.excluded.len()
        );
        Ok((dataset, categories))
    }

    /// The grid search described by the configuration.
    pub fn build_search(&self) -> GridSearch {
        GridSearch::new(self.config.grid.clone())
            .with_folds(self.config.folds)
            .with_refit_metric(self.config.refit_metric)
            .with_features(self.config.features)
            .with_threshold(self.config.threshold)
            .with_threads(self.config.threads)
    }

    /// Refit the winning configuration on every message of `dataset`, test
    /// split included.
    pub fn build_final_model(
        &self,
        dataset: &Dataset,
        categories: &CategorySet,
        result: &GridSearchResult,
    ) -> Result<ModelArtifact> {
        let config = *result.best_config();
        log::info!("refitting {config} on {} messages", dataset.len());

        let mut pipeline =
            Pipeline::new(self.config.features, config).with_threshold(self.config.threshold);
        pipeline.fit(&dataset.messages(), dataset.labels())?;

        let metadata = ArtifactMetadata {
            version: crate::VERSION.to_string(),
            trained_at: Utc::now(),
            training_examples: dataset.len(),
            config,
            cv_score: result.best_score(),
            retained_categories: categories.retained.clone(),
            excluded_categories: categories.excluded.clone(),
        };
        ModelArtifact::new(pipeline, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::grid::{ClassWeight, Parallelism, ParamGrid, Solver};

    fn write_csv(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("messages.csv");
        let mut writer = csv::Writer::from_path(&path).unwrap();
        writer
            .write_record(["id", "message", "original", "genre", "water", "food", "fire"])
            .unwrap();
        let rows = [
            ("need water", "1", "0"),
            ("water please", "1", "0"),
            ("no clean water", "1", "0"),
            ("send food", "0", "1"),
            ("we need food", "0", "1"),
            ("hungry and no food", "0", "1"),
            ("all is well", "0", "0"),
            ("roads are clear", "0", "0"),
            ("thanks for the help", "0", "0"),
            ("water and food", "1", "1"),
        ];
        for (i, (message, water, food)) in rows.iter().enumerate() {
            let id = i.to_string();
            writer
                .write_record([id.as_str(), message, "", "direct", water, food, "0"])
                .unwrap();
        }
        writer.flush().unwrap();
        path
    }

    fn config() -> TrainingConfig {
        TrainingConfig {
            folds: 2,
            grid: ParamGrid {
                c: vec![1.0, 10.0],
                max_iter: vec![300],
                solver: vec![Solver::Lbfgs],
                class_weight: vec![ClassWeight::Balanced],
                n_jobs: vec![Parallelism::Threads(1)],
                ..ParamGrid::default()
            },
            ..TrainingConfig::default()
        }
    }

    #[test]
    fn test_run_excludes_constant_category() {
        let dir = tempfile::tempdir().unwrap();
        let dataset = write_csv(dir.path());
        let model = dir.path().join("model.bin");

        let summary = Trainer::new(config())
            .with_print_report(false)
            .run(&dataset, &model)
            .unwrap();

        assert_eq!(summary.categories.excluded, vec!["fire"]);
        assert_eq!(summary.report.categories.len(), 2);
        assert_eq!(summary.test_examples, 3);
        assert_eq!(summary.metadata.training_examples, 10);

        let artifact = persist::load(&model).unwrap();
        let prediction = artifact.predict("need water").unwrap();
        assert_eq!(prediction.len(), 2);
        assert!(!prediction.contains("fire"));
    }

    #[test]
    fn test_missing_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let result = Trainer::new(config())
            .with_print_report(false)
            .run(dir.path().join("absent.db"), dir.path().join("model.bin"));
        assert!(matches!(result, Err(TriageError::Io(_))));
    }
}
