//! Category discovery and zero-variance exclusion.

use serde::{Deserialize, Serialize};

use crate::dataset::labels::LabelMatrix;

/// Partition of a dataset's categories into those used for training and
/// those dropped because every record carries the same value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySet {
    pub retained: Vec<String>,
    pub excluded: Vec<String>,
}

impl CategorySet {
    /// Compute the partition in a single read-only pass over the columns.
    ///
    /// Source column order is preserved in both lists. Each excluded
    /// category is reported with `log::warn!`.
    pub fn partition(labels: &LabelMatrix) -> Self {
        let mut set = CategorySet::default();

        for (j, name) in labels.categories().iter().enumerate() {
            if is_constant(labels, j) {
                let value = if labels.is_empty() { 0 } else { labels.get(0, j) };
                log::warn!(
                    "excluding category '{name}': every record has label {value}"
                );
                set.excluded.push(name.clone());
            } else {
                set.retained.push(name.clone());
            }
        }

        set
    }

    pub fn is_retained(&self, name: &str) -> bool {
        self.retained.iter().any(|c| c == name)
    }
}

fn is_constant(labels: &LabelMatrix, column: usize) -> bool {
    let mut rows = 0..labels.n_rows();
    match rows.next() {
        None => true,
        Some(first) => {
            let value = labels.get(first, column);
            rows.all(|i| labels.get(i, column) == value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacent_constant_columns_are_all_excluded() {
        let labels = LabelMatrix::from_rows(
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            vec![vec![0, 1, 0, 1], vec![0, 1, 1, 0], vec![0, 1, 0, 0]],
        )
        .unwrap();

        let set = CategorySet::partition(&labels);

        assert_eq!(set.excluded, vec!["a", "b"]);
        assert_eq!(set.retained, vec!["c", "d"]);
        assert!(set.is_retained("c"));
        assert!(!set.is_retained("a"));
    }

    #[test]
    fn test_all_ones_column_is_excluded() {
        let labels =
            LabelMatrix::from_rows(vec!["related".into()], vec![vec![1], vec![1]]).unwrap();
        assert_eq!(CategorySet::partition(&labels).excluded, vec!["related"]);
    }
}
