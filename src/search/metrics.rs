//! Multi-label classification metrics.
//!
//! Undefined ratios (no predicted or no true positives) score 1.0 instead of
//! failing.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dataset::LabelMatrix;
use crate::error::{Result, TriageError};

/// Value used when a ratio has a zero denominator.
pub const ZERO_DIVISION: f64 = 1.0;

/// Scoring metric used during cross-validation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    /// Fraction of rows whose whole label vector is correct.
    Accuracy,
    /// Support-weighted mean of per-category recall.
    Recall,
    /// Support-weighted mean of per-category F1.
    #[default]
    F1,
}

impl Metric {
    pub const ALL: [Metric; 3] = [Metric::Accuracy, Metric::Recall, Metric::F1];

    pub fn score(self, y_true: &LabelMatrix, y_pred: &LabelMatrix) -> Result<f64> {
        match self {
            Metric::Accuracy => subset_accuracy(y_true, y_pred),
            Metric::Recall => Ok(average(y_true, y_pred, Average::Weighted)?.recall),
            Metric::F1 => Ok(average(y_true, y_pred, Average::Weighted)?.f1),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metric::Accuracy => write!(f, "accuracy"),
            Metric::Recall => write!(f, "recall"),
            Metric::F1 => write!(f, "f1"),
        }
    }
}

impl FromStr for Metric {
    type Err = TriageError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "accuracy" => Ok(Metric::Accuracy),
            "recall" => Ok(Metric::Recall),
            "f1" => Ok(Metric::F1),
            other => Err(TriageError::invalid_config(format!("unknown metric '{other}'"))),
        }
    }
}

/// Precision, recall, F1 and support of one category or one average.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassScores {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Ways of combining per-category scores.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Average {
    /// Pool true/false positives over all categories.
    Micro,
    /// Unweighted mean over categories.
    Macro,
    /// Mean over categories weighted by support.
    Weighted,
    /// Mean over rows of per-row scores.
    Samples,
}

impl Average {
    pub const ALL: [Average; 4] = [
        Average::Micro,
        Average::Macro,
        Average::Weighted,
        Average::Samples,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Average::Micro => "micro avg",
            Average::Macro => "macro avg",
            Average::Weighted => "weighted avg",
            Average::Samples => "samples avg",
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
struct Counts {
    tp: usize,
    fp: usize,
    fn_: usize,
}

impl Counts {
    fn add(&mut self, truth: u8, predicted: u8) {
        match (truth, predicted) {
            (1, 1) => self.tp += 1,
            (0, 1) => self.fp += 1,
            (1, 0) => self.fn_ += 1,
            _ => {}
        }
    }

    fn scores(&self) -> ClassScores {
        ClassScores {
            precision: ratio(self.tp, self.tp + self.fp),
            recall: ratio(self.tp, self.tp + self.fn_),
            f1: ratio(2 * self.tp, 2 * self.tp + self.fp + self.fn_),
            support: self.tp + self.fn_,
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        ZERO_DIVISION
    } else {
        numerator as f64 / denominator as f64
    }
}

fn check_shapes(y_true: &LabelMatrix, y_pred: &LabelMatrix) -> Result<()> {
    if y_true.categories() != y_pred.categories() {
        return Err(TriageError::search(
            "true and predicted labels have different categories",
        ));
    }
    if y_true.n_rows() != y_pred.n_rows() {
        return Err(TriageError::search(format!(
            "{} true rows but {} predicted rows",
            y_true.n_rows(),
            y_pred.n_rows()
        )));
    }
    Ok(())
}

fn column_counts(y_true: &LabelMatrix, y_pred: &LabelMatrix) -> Vec<Counts> {
    let mut counts = vec![Counts::default(); y_true.n_categories()];
    for (truth, predicted) in y_true.rows().zip(y_pred.rows()) {
        for (j, c) in counts.iter_mut().enumerate() {
            c.add(truth[j], predicted[j]);
        }
    }
    counts
}

/// Fraction of rows predicted exactly.
pub fn subset_accuracy(y_true: &LabelMatrix, y_pred: &LabelMatrix) -> Result<f64> {
    check_shapes(y_true, y_pred)?;
    if y_true.is_empty() {
        return Ok(ZERO_DIVISION);
    }
    let exact = y_true
        .rows()
        .zip(y_pred.rows())
        .filter(|(t, p)| t == p)
        .count();
    Ok(exact as f64 / y_true.n_rows() as f64)
}

/// Fraction of individual label cells predicted correctly.
pub fn label_accuracy(y_true: &LabelMatrix, y_pred: &LabelMatrix) -> Result<f64> {
    check_shapes(y_true, y_pred)?;
    let cells = y_true.n_rows() * y_true.n_categories();
    if cells == 0 {
        return Ok(ZERO_DIVISION);
    }
    let correct: usize = y_true
        .rows()
        .zip(y_pred.rows())
        .map(|(t, p)| t.iter().zip(p).filter(|(a, b)| a == b).count())
        .sum();
    Ok(correct as f64 / cells as f64)
}

/// Scores of every category, in category order.
pub fn per_category(y_true: &LabelMatrix, y_pred: &LabelMatrix) -> Result<Vec<ClassScores>> {
    check_shapes(y_true, y_pred)?;
    Ok(column_counts(y_true, y_pred)
        .iter()
        .map(Counts::scores)
        .collect())
}

/// Averaged scores. `support` is the total number of positive true labels.
pub fn average(y_true: &LabelMatrix, y_pred: &LabelMatrix, average: Average) -> Result<ClassScores> {
    check_shapes(y_true, y_pred)?;
    let counts = column_counts(y_true, y_pred);
    let scores: Vec<ClassScores> = counts.iter().map(Counts::scores).collect();
    let support: usize = scores.iter().map(|s| s.support).sum();

    let result = match average {
        Average::Micro => {
            let total = counts.iter().fold(Counts::default(), |acc, c| Counts {
                tp: acc.tp + c.tp,
                fp: acc.fp + c.fp,
                fn_: acc.fn_ + c.fn_,
            });
            total.scores()
        }
        Average::Macro => {
            let k = scores.len().max(1) as f64;
            ClassScores {
                precision: scores.iter().map(|s| s.precision).sum::<f64>() / k,
                recall: scores.iter().map(|s| s.recall).sum::<f64>() / k,
                f1: scores.iter().map(|s| s.f1).sum::<f64>() / k,
                support,
            }
        }
        Average::Weighted => {
            if support == 0 {
                ClassScores {
                    precision: ZERO_DIVISION,
                    recall: ZERO_DIVISION,
                    f1: ZERO_DIVISION,
                    support,
                }
            } else {
                let total = support as f64;
                let weighted = |f: fn(&ClassScores) -> f64| {
                    scores
                        .iter()
                        .map(|s| f(s) * s.support as f64)
                        .sum::<f64>()
                        / total
                };
                ClassScores {
                    precision: weighted(|s| s.precision),
                    recall: weighted(|s| s.recall),
                    f1: weighted(|s| s.f1),
                    support,
                }
            }
        }
        Average::Samples => {
            let n = y_true.n_rows().max(1) as f64;
            let mut sums = (0.0, 0.0, 0.0);
            for (truth, predicted) in y_true.rows().zip(y_pred.rows()) {
                let mut row = Counts::default();
                for (&t, &p) in truth.iter().zip(predicted) {
                    row.add(t, p);
                }
                let s = row.scores();
                sums.0 += s.precision;
                sums.1 += s.recall;
                sums.2 += s.f1;
            }
            ClassScores {
                precision: sums.0 / n,
                recall: sums.1 / n,
                f1: sums.2 / n,
                support,
            }
        }
    };
    Ok(result)
}
