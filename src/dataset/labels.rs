//! Binary label matrix.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};

/// Row-major matrix of {0,1} labels, one column per category.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelMatrix {
    categories: Vec<String>,
    n_rows: usize,
    data: Vec<u8>,
}

impl LabelMatrix {
    /// Build a matrix from rows of label values.
    ///
    /// Every row must have one value per category and every value must be 0
    /// or 1.
    pub fn from_rows(categories: Vec<String>, rows: Vec<Vec<u8>>) -> Result<Self> {
        let width = categories.len();
        let mut data = Vec::with_capacity(rows.len() * width);

        for (i, row) in rows.iter().enumerate() {
            if row.len() != width {
                return Err(TriageError::dataset(format!(
                    "row {i} has {} labels, expected {width}",
                    row.len()
                )));
            }
            if let Some((j, value)) = row.iter().enumerate().find(|(_, v)| **v > 1) {
                return Err(TriageError::dataset(format!(
                    "row {i} category '{}' has label {value}, expected 0 or 1",
                    categories[j]
                )));
            }
            data.extend_from_slice(row);
        }

        Ok(LabelMatrix {
            categories,
            n_rows: rows.len(),
            data,
        })
    }

    /// Category names in column order.
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Number of categories.
    pub fn n_categories(&self) -> usize {
        self.categories.len()
    }

    /// Check if the matrix has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    /// Labels of one row.
    pub fn row(&self, i: usize) -> &[u8] {
        let width = self.categories.len();
        &self.data[i * width..(i + 1) * width]
    }

    /// Single label value.
    pub fn get(&self, row: usize, column: usize) -> u8 {
        self.data[row * self.categories.len() + column]
    }

    /// Copy out one category column.
    pub fn column(&self, column: usize) -> Vec<u8> {
        (0..self.n_rows).map(|i| self.get(i, column)).collect()
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> {
        (0..self.n_rows).map(move |i| self.row(i))
    }

    /// New matrix containing the given rows, in the given order.
    pub fn select_rows(&self, indices: &[usize]) -> LabelMatrix {
        let mut data = Vec::with_capacity(indices.len() * self.categories.len());
        for &i in indices {
            data.extend_from_slice(self.row(i));
        }
        LabelMatrix {
            categories: self.categories.clone(),
            n_rows: indices.len(),
            data,
        }
    }

    /// New matrix containing only the named categories, in the given order.
    pub fn select_categories(&self, names: &[String]) -> Result<LabelMatrix> {
        let columns = names
            .iter()
            .map(|name| {
                self.categories
                    .iter()
                    .position(|c| c == name)
                    .ok_or_else(|| TriageError::dataset(format!("unknown category '{name}'")))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut data = Vec::with_capacity(self.n_rows * columns.len());
        for i in 0..self.n_rows {
            data.extend(columns.iter().map(|&j| self.get(i, j)));
        }

        Ok(LabelMatrix {
            categories: names.to_vec(),
            n_rows: self.n_rows,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LabelMatrix {
        LabelMatrix::from_rows(
            vec!["water".into(), "food".into(), "shelter".into()],
            vec![vec![1, 0, 0], vec![0, 1, 1], vec![1, 1, 0]],
        )
        .unwrap()
    }

    #[test]
    fn test_shape_and_access() {
        let labels = sample();
        assert_eq!(labels.n_rows(), 3);
        assert_eq!(labels.n_categories(), 3);
        assert_eq!(labels.row(1), &[0, 1, 1]);
        assert_eq!(labels.column(0), vec![1, 0, 1]);
        assert_eq!(labels.get(2, 1), 1);
    }

    #[test]
    fn test_rejects_non_binary_values() {
        let result = LabelMatrix::from_rows(vec!["related".into()], vec![vec![2]]);
        assert!(matches!(result, Err(TriageError::Dataset(_))));
    }

    #[test]
    fn test_rejects_ragged_rows() {
        let result = LabelMatrix::from_rows(vec!["a".into(), "b".into()], vec![vec![1]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_select_rows_and_categories() {
        let labels = sample();
        let rows = labels.select_rows(&[2, 0]);
        assert_eq!(rows.row(0), &[1, 1, 0]);
        assert_eq!(rows.row(1), &[1, 0, 0]);

        let projected = labels
            .select_categories(&["shelter".to_string(), "water".to_string()])
            .unwrap();
        assert_eq!(projected.categories(), &["shelter", "water"]);
        assert_eq!(projected.row(1), &[1, 0]);
    }
}
