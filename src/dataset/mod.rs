//! Labelled message datasets.
//!
//! A [`Dataset`] pairs the message records produced by the ETL step with a
//! [`LabelMatrix`] holding one binary column per response category. Datasets
//! are loaded from SQLite or CSV ([`loader`]), reduced to their informative
//! categories ([`categories`]) and split for evaluation ([`split`]).

pub mod categories;
pub mod labels;
pub mod loader;
pub mod split;

use serde::{Deserialize, Serialize};

pub use categories::CategorySet;
pub use labels::LabelMatrix;
pub use loader::{DatasetLoader, load_dataset};
pub use split::train_test_split;

use crate::error::{Result, TriageError};

/// Names of the non-category columns of a dataset, in source order.
pub const RECORD_COLUMNS: [&str; 4] = ["id", "message", "original", "genre"];

/// One relief message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: i64,
    /// English message text, the input to every feature extractor.
    pub message: String,
    /// Message in its original language, when it was translated.
    pub original: Option<String>,
    /// Channel the message arrived through (direct, news, social).
    pub genre: String,
}

impl Record {
    pub fn new<S: Into<String>>(id: i64, message: S, genre: S) -> Self {
        Record {
            id,
            message: message.into(),
            original: None,
            genre: genre.into(),
        }
    }

    pub fn with_original<S: Into<String>>(mut self, original: S) -> Self {
        self.original = Some(original.into());
        self
    }
}

/// Message records aligned row-by-row with their category labels.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    records: Vec<Record>,
    labels: LabelMatrix,
}

impl Dataset {
    /// Create a dataset, checking that every record has a label row.
    pub fn new(records: Vec<Record>, labels: LabelMatrix) -> Result<Self> {
        if records.len() != labels.n_rows() {
            return Err(TriageError::dataset(format!(
                "{} records but {} label rows",
                records.len(),
                labels.n_rows()
            )));
        }
        Ok(Dataset { records, labels })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn labels(&self) -> &LabelMatrix {
        &self.labels
    }

    pub fn categories(&self) -> &[String] {
        self.labels.categories()
    }

    /// Message texts in row order.
    pub fn messages(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.message.as_str()).collect()
    }

    /// Subset of rows, in the given order.
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            records: indices.iter().map(|&i| self.records[i].clone()).collect(),
            labels: self.labels.select_rows(indices),
        }
    }

    /// Drop categories that never vary and return the reduced dataset along
    /// with the partition that was applied.
    pub fn retain_informative(&self) -> Result<(Dataset, CategorySet)> {
        let set = CategorySet::partition(&self.labels);
        let labels = self.labels.select_categories(&set.retained)?;
        let dataset = Dataset {
            records: self.records.clone(),
            labels,
        };
        Ok((dataset, set))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        let records = vec![
            Record::new(1, "need water", "direct"),
            Record::new(2, "need food", "news").with_original("besoin de nourriture"),
            Record::new(3, "roads blocked", "social"),
        ];
        let labels = LabelMatrix::from_rows(
            vec!["water".into(), "food".into(), "offer".into()],
            vec![vec![1, 0, 0], vec![0, 1, 0], vec![0, 0, 0]],
        )
        .unwrap();
        Dataset::new(records, labels).unwrap()
    }

    #[test]
    fn test_mismatched_lengths() {
        let labels = LabelMatrix::from_rows(vec!["water".into()], vec![vec![1]]).unwrap();
        assert!(Dataset::new(Vec::new(), labels).is_err());
    }

    #[test]
    fn test_select_keeps_alignment() {
        let dataset = sample();
        let subset = dataset.select(&[1]);
        assert_eq!(subset.len(), 1);
        assert_eq!(subset.messages(), vec!["need food"]);
        assert_eq!(subset.labels().row(0), &[0, 1, 0]);
        assert_eq!(
            subset.records()[0].original.as_deref(),
            Some("besoin de nourriture")
        );
    }

    #[test]
    fn test_retain_informative() {
        let (reduced, set) = sample().retain_informative().unwrap();
        assert_eq!(reduced.categories(), &["water", "food"]);
        assert_eq!(set.excluded, vec!["offer"]);
        assert_eq!(reduced.len(), 3);
    }
}
