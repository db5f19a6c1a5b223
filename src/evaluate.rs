//! Held-out evaluation of a search result.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::dataset::LabelMatrix;
use crate::error::{Result, TriageError};
use crate::pipeline::Pipeline;
use crate::search::engine::GridSearchResult;
use crate::search::grid::ModelConfig;
use crate::search::metrics::{self, Average, ClassScores, Metric};

/// Scores of one category on the test split.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryReport {
    pub category: String,
    #[serde(flatten)]
    pub scores: ClassScores,
}

/// One averaged summary row.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AverageReport {
    pub average: Average,
    #[serde(flatten)]
    pub scores: ClassScores,
}

/// Per-category and averaged test scores alongside the search outcome.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EvaluationReport {
    pub categories: Vec<CategoryReport>,
    pub averages: Vec<AverageReport>,
    /// Mean over all label cells of `y_true == y_pred`.
    pub accuracy: f64,
    pub test_examples: usize,
    pub best_params: ModelConfig,
    pub refit_metric: Metric,
    pub best_cv_score: f64,
}

impl EvaluationReport {
    pub fn category_names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.category.as_str()).collect()
    }

    pub fn average(&self, average: Average) -> Option<&ClassScores> {
        self.averages
            .iter()
            .find(|a| a.average == average)
            .map(|a| &a.scores)
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self
            .categories
            .iter()
            .map(|c| c.category.chars().count())
            .chain(self.averages.iter().map(|a| a.average.label().len()))
            .max()
            .unwrap_or(0)
            .max(12);

        writeln!(
            f,
            "{:>width$} {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support"
        )?;
        writeln!(f)?;
        for row in &self.categories {
            write_row(f, &row.category, &row.scores, width)?;
        }
        writeln!(f)?;
        for row in &self.averages {
            write_row(f, row.average.label(), &row.scores, width)?;
        }
        writeln!(f)?;
        writeln!(f, "Accuracy: {:.4}", self.accuracy)?;
        writeln!(f, "Best parameters: {}", self.best_params)?;
        write!(
            f,
            "Best cross-validated {}: {:.4}",
            self.refit_metric, self.best_cv_score
        )
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, name: &str, s: &ClassScores, width: usize) -> fmt::Result {
    writeln!(
        f,
        "{name:>width$} {:>9.2} {:>9.2} {:>9.2} {:>9}",
        s.precision, s.recall, s.f1, s.support
    )
}

/// Scores a fitted pipeline on held-out messages. Never mutates the model.
pub struct Evaluator<'a> {
    result: &'a GridSearchResult,
}

impl<'a> Evaluator<'a> {
    pub fn new(result: &'a GridSearchResult) -> Self {
        Evaluator { result }
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.result.best_pipeline
    }

    pub fn evaluate(&self, texts: &[&str], y_true: &LabelMatrix) -> Result<EvaluationReport> {
        if texts.len() != y_true.n_rows() {
            return Err(TriageError::invalid_argument(format!(
                "{} test messages but {} label rows",
                texts.len(),
                y_true.n_rows()
            )));
        }

        let y_pred = self.pipeline().predict(texts)?;

        let categories = y_true
            .categories()
            .iter()
            .cloned()
            .zip(metrics::per_category(y_true, &y_pred)?)
            .map(|(category, scores)| CategoryReport { category, scores })
            .collect();

        let averages = Average::ALL
            .iter()
            .map(|&average| {
                Ok(AverageReport {
                    average,
                    scores: metrics::average(y_true, &y_pred, average)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(EvaluationReport {
            categories,
            averages,
            accuracy: metrics::label_accuracy(y_true, &y_pred)?,
            test_examples: texts.len(),
            best_params: *self.result.best_config(),
            refit_metric: self.result.refit_metric,
            best_cv_score: self.result.best_score(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureConfig;
    use crate::search::engine::GridSearch;
    use crate::search::grid::{ClassWeight, Parallelism, ParamGrid, Solver};

    fn corpus() -> (Vec<&'static str>, LabelMatrix) {
        let texts = vec![
            "need water now",
            "no water in the camp",
            "food is needed",
            "we are hungry send food",
            "water and food please",
            "everything is calm",
            "the bridge is repaired",
            "water needed for children",
            "food for families",
            "school reopened today",
        ];
        let labels = LabelMatrix::from_rows(
            vec!["water".into(), "food".into()],
            vec![
                vec![1, 0],
                vec![1, 0],
                vec![0, 1],
                vec![0, 1],
                vec![1, 1],
                vec![0, 0],
                vec![0, 0],
                vec![1, 0],
                vec![0, 1],
                vec![0, 0],
            ],
        )
        .unwrap();
        (texts, labels)
    }

    fn search_result(texts: &[&str], labels: &LabelMatrix) -> GridSearchResult {
        let grid = ParamGrid {
            c: vec![10.0],
            max_iter: vec![500],
            solver: vec![Solver::Lbfgs],
            class_weight: vec![ClassWeight::Balanced],
            n_jobs: vec![Parallelism::Threads(1)],
            ..ParamGrid::default()
        };
        GridSearch::new(grid)
            .with_folds(2)
            .with_features(FeatureConfig::default())
            .fit(texts, labels)
            .unwrap()
    }

    #[test]
    fn test_report_shape() {
        let (texts, labels) = corpus();
        let result = search_result(&texts, &labels);

        let report = Evaluator::new(&result).evaluate(&texts, &labels).unwrap();

        assert_eq!(report.category_names(), vec!["water", "food"]);
        assert_eq!(report.averages.len(), 4);
        assert_eq!(report.test_examples, 10);
        assert_eq!(report.best_params, *result.best_config());
        assert!((0.0..=1.0).contains(&report.accuracy));
        assert_eq!(report.categories[0].scores.support, 4);
        assert_eq!(report.average(Average::Micro).unwrap().support, 8);
    }

    #[test]
    fn test_report_renders_and_serializes() {
        let (texts, labels) = corpus();
        let result = search_result(&texts, &labels);
        let report = Evaluator::new(&result).evaluate(&texts, &labels).unwrap();

        let table = report.to_string();
        assert!(table.contains("precision"));
        assert!(table.contains("weighted avg"));
        assert!(table.contains("Best parameters: C=10"));

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["categories"][0]["category"], "water");
        assert!(json["categories"][0]["precision"].is_number());
        assert_eq!(json["averages"][3]["average"], "samples");
    }

    #[test]
    fn test_mismatched_rows() {
        let (texts, labels) = corpus();
        let result = search_result(&texts, &labels);
        assert!(Evaluator::new(&result).evaluate(&texts[..2], &labels).is_err());
    }
}
