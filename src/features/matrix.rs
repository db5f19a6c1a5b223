//! Sparse feature matrix helpers.
//!
//! Feature blocks are stored as CSR matrices (`sprs::CsMat<f64>`), one row
//! per document.

use sprs::{CsMat, TriMat};

use crate::error::{Result, TriageError};

/// Document-by-feature matrix in compressed sparse row layout.
pub type FeatureMatrix = CsMat<f64>;

/// Build a CSR matrix from per-row `(column, value)` entries.
///
/// Zero values are not stored. Duplicate columns within a row are summed.
pub fn from_rows(n_cols: usize, rows: &[Vec<(usize, f64)>]) -> Result<FeatureMatrix> {
    let mut row_inds = Vec::new();
    let mut col_inds = Vec::new();
    let mut data = Vec::new();

    for (i, row) in rows.iter().enumerate() {
        for &(j, value) in row {
            if j >= n_cols {
                return Err(TriageError::feature(format!(
                    "column {j} out of bounds for width {n_cols}"
                )));
            }
            if value != 0.0 {
                row_inds.push(i);
                col_inds.push(j);
                data.push(value);
            }
        }
    }

    let triplets = TriMat::from_triplets((rows.len(), n_cols), row_inds, col_inds, data);
    Ok(triplets.to_csr())
}

/// Concatenate blocks column-wise, preserving block order.
pub fn hstack(blocks: &[FeatureMatrix]) -> Result<FeatureMatrix> {
    let n_rows = blocks.first().map(|b| b.rows()).unwrap_or(0);
    if let Some(bad) = blocks.iter().find(|b| b.rows() != n_rows) {
        return Err(TriageError::feature(format!(
            "cannot stack blocks with {} and {} rows",
            n_rows,
            bad.rows()
        )));
    }

    let mut rows: Vec<Vec<(usize, f64)>> = vec![Vec::new(); n_rows];
    let mut offset = 0;
    for block in blocks {
        for (i, row) in block.outer_iterator().enumerate() {
            rows[i].extend(row.iter().map(|(j, &value)| (offset + j, value)));
        }
        offset += block.cols();
    }

    from_rows(offset, &rows)
}

/// New matrix holding the given rows, in the given order.
pub fn select_rows(matrix: &FeatureMatrix, indices: &[usize]) -> Result<FeatureMatrix> {
    let rows = indices
        .iter()
        .map(|&i| {
            matrix
                .outer_view(i)
                .map(|row| row.iter().map(|(j, &v)| (j, v)).collect())
                .ok_or_else(|| TriageError::feature(format!("row {i} out of bounds")))
        })
        .collect::<Result<Vec<Vec<(usize, f64)>>>>()?;

    from_rows(matrix.cols(), &rows)
}

/// Dense copy of one row, mainly for inspection and tests.
pub fn dense_row(matrix: &FeatureMatrix, i: usize) -> Vec<f64> {
    let mut dense = vec![0.0; matrix.cols()];
    if let Some(row) = matrix.outer_view(i) {
        for (j, &value) in row.iter() {
            dense[j] = value;
        }
    }
    dense
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_drops_zeros() {
        let m = from_rows(3, &[vec![(0, 1.0), (2, 0.0)], vec![], vec![(1, 2.5)]]).unwrap();
        assert_eq!(m.rows(), 3);
        assert_eq!(m.cols(), 3);
        assert_eq!(m.nnz(), 2);
        assert_eq!(dense_row(&m, 2), vec![0.0, 2.5, 0.0]);
    }

    #[test]
    fn test_from_rows_rejects_out_of_bounds() {
        assert!(from_rows(2, &[vec![(2, 1.0)]]).is_err());
    }

    #[test]
    fn test_hstack() {
        let a = from_rows(2, &[vec![(0, 1.0)], vec![(1, 2.0)]]).unwrap();
        let b = from_rows(1, &[vec![(0, 3.0)], vec![]]).unwrap();

        let stacked = hstack(&[a, b]).unwrap();

        assert_eq!(stacked.cols(), 3);
        assert_eq!(dense_row(&stacked, 0), vec![1.0, 0.0, 3.0]);
        assert_eq!(dense_row(&stacked, 1), vec![0.0, 2.0, 0.0]);
    }

    #[test]
    fn test_hstack_row_mismatch() {
        let a = from_rows(1, &[vec![(0, 1.0)]]).unwrap();
        let b = from_rows(1, &[vec![], vec![]]).unwrap();
        assert!(hstack(&[a, b]).is_err());
    }

    #[test]
    fn test_select_rows() {
        let m = from_rows(2, &[vec![(0, 1.0)], vec![(1, 2.0)], vec![(0, 3.0)]]).unwrap();
        let selected = select_rows(&m, &[2, 0]).unwrap();
        assert_eq!(selected.rows(), 2);
        assert_eq!(dense_row(&selected, 0), vec![3.0, 0.0]);
        assert_eq!(dense_row(&selected, 1), vec![1.0, 0.0]);
        assert!(select_rows(&m, &[5]).is_err());
    }
}
