//! Compressed sparse row matrices and their on-disk `.npz` encoding.

use std::fs::File;
use std::path::Path;

use ndarray::Array1;
use ndarray_npy::{NpzReader, NpzWriter};
use serde::{Deserialize, Serialize};

use crate::error::{open_file, BenchError, Result};

/// A sparse document-term matrix in compressed sparse row form.
///
/// Rows are documents, columns are vocabulary terms, values are term counts.
/// `data[k]` is the value of the k-th stored entry, `indices[k]` its column,
/// and row `i` owns the entries in `indptr[i]..indptr[i + 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CsrMatrix {
    data: Vec<f64>,
    indices: Vec<usize>,
    indptr: Vec<usize>,
    rows: usize,
    cols: usize,
}

impl CsrMatrix {
    /// Build a matrix from raw CSR arrays, validating their consistency.
    ///
    /// Every structural invariant is checked up front so downstream row
    /// access can index without further bounds reasoning.
    pub fn from_parts(
        data: Vec<f64>,
        indices: Vec<usize>,
        indptr: Vec<usize>,
        rows: usize,
        cols: usize,
    ) -> Result<Self> {
        if indptr.len() != rows + 1 {
            return Err(BenchError::DataFormat(format!(
                "indptr has {} entries, expected {} for {} rows",
                indptr.len(),
                rows + 1,
                rows
            )));
        }
        if indptr[0] != 0 {
            return Err(BenchError::DataFormat(format!(
                "indptr must start at 0, found {}",
                indptr[0]
            )));
        }
        if data.len() != indices.len() {
            return Err(BenchError::DataFormat(format!(
                "{} values but {} column indices",
                data.len(),
                indices.len()
            )));
        }
        if indptr[rows] != data.len() {
            return Err(BenchError::DataFormat(format!(
                "indptr ends at {} but {} entries are stored",
                indptr[rows],
                data.len()
            )));
        }
        if indptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(BenchError::DataFormat(
                "indptr is not nondecreasing".to_string(),
            ));
        }
        if let Some(&bad) = indices.iter().find(|&&j| j >= cols) {
            return Err(BenchError::DataFormat(format!(
                "column index {} out of range for {} columns",
                bad, cols
            )));
        }
        Ok(Self {
            data,
            indices,
            indptr,
            rows,
            cols,
        })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.data.len()
    }

    /// Column indices and values of row `i`.
    pub fn row(&self, i: usize) -> (&[usize], &[f64]) {
        let span = self.indptr[i]..self.indptr[i + 1];
        (&self.indices[span.clone()], &self.data[span])
    }

    /// Iterate rows in order as (column indices, values) pairs.
    pub fn iter_rows(&self) -> impl Iterator<Item = (&[usize], &[f64])> + '_ {
        (0..self.rows).map(move |i| self.row(i))
    }

    /// New matrix whose row `i` is this matrix's row `perm[i]`.
    pub fn permute_rows(&self, perm: &[usize]) -> Self {
        assert_eq!(perm.len(), self.rows, "permutation length mismatch");
        let mut data = Vec::with_capacity(self.data.len());
        let mut indices = Vec::with_capacity(self.indices.len());
        let mut indptr = Vec::with_capacity(self.rows + 1);
        indptr.push(0);
        for &src in perm {
            let (cols, vals) = self.row(src);
            indices.extend_from_slice(cols);
            data.extend_from_slice(vals);
            indptr.push(data.len());
        }
        Self {
            data,
            indices,
            indptr,
            rows: self.rows,
            cols: self.cols,
        }
    }

    /// Rows `start..end` as a new matrix.
    pub fn slice_rows(&self, start: usize, end: usize) -> Self {
        assert!(start <= end && end <= self.rows, "row range out of bounds");
        let lo = self.indptr[start];
        let hi = self.indptr[end];
        Self {
            data: self.data[lo..hi].to_vec(),
            indices: self.indices[lo..hi].to_vec(),
            indptr: self.indptr[start..=end].iter().map(|&p| p - lo).collect(),
            rows: end - start,
            cols: self.cols,
        }
    }

    /// Read a sparse `.npz` holding `data`, `indices`, `indptr` and `shape`
    /// arrays (float64 values, int64 index arrays).
    pub fn read_npz(path: &Path) -> Result<Self> {
        let mut npz = NpzReader::new(open_file(path)?)?;
        let data: Array1<f64> = npz.by_name("data.npy")?;
        let indices: Array1<i64> = npz.by_name("indices.npy")?;
        let indptr: Array1<i64> = npz.by_name("indptr.npy")?;
        let shape: Array1<i64> = npz.by_name("shape.npy")?;
        if shape.len() != 2 {
            return Err(BenchError::DataFormat(format!(
                "shape array has {} entries, expected 2",
                shape.len()
            )));
        }
        let (rows, cols) = (to_index(shape[0])?, to_index(shape[1])?);
        let indices = indices.iter().map(|&v| to_index(v)).collect::<Result<_>>()?;
        let indptr = indptr.iter().map(|&v| to_index(v)).collect::<Result<_>>()?;
        Self::from_parts(data.to_vec(), indices, indptr, rows, cols)
    }

    /// Write the matrix in the same `.npz` layout `read_npz` consumes.
    pub fn write_npz(&self, path: &Path) -> Result<()> {
        let mut npz = NpzWriter::new(File::create(path)?);
        npz.add_array("data.npy", &Array1::from(self.data.clone()))?;
        npz.add_array("indices.npy", &to_i64_array(&self.indices))?;
        npz.add_array("indptr.npy", &to_i64_array(&self.indptr))?;
        npz.add_array("shape.npy", &Array1::from(vec![self.rows as i64, self.cols as i64]))?;
        npz.finish()?;
        Ok(())
    }
}

fn to_index(v: i64) -> Result<usize> {
    usize::try_from(v)
        .map_err(|_| BenchError::DataFormat(format!("negative index value {}", v)))
}

fn to_i64_array(values: &[usize]) -> Array1<i64> {
    values.iter().map(|&v| v as i64).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CsrMatrix {
        // [[1, 0, 2], [0, 0, 0], [0, 3, 0]]
        CsrMatrix::from_parts(
            vec![1.0, 2.0, 3.0],
            vec![0, 2, 1],
            vec![0, 2, 2, 3],
            3,
            3,
        )
        .unwrap()
    }

    #[test]
    fn test_round_trip_entries() {
        let m = sample();
        let mut triples = Vec::new();
        for (i, (cols, vals)) in m.iter_rows().enumerate() {
            for (&j, &v) in cols.iter().zip(vals) {
                triples.push((i, j, v));
            }
        }
        assert_eq!(triples, vec![(0, 0, 1.0), (0, 2, 2.0), (2, 1, 3.0)]);
        assert_eq!(m.nnz(), 3);
        assert_eq!(m.shape(), (3, 3));
    }

    #[test]
    fn test_rejects_bad_indptr_length() {
        let err = CsrMatrix::from_parts(vec![1.0], vec![0], vec![0, 1], 2, 2).unwrap_err();
        assert!(matches!(err, BenchError::DataFormat(_)));
    }

    #[test]
    fn test_rejects_decreasing_indptr() {
        let err =
            CsrMatrix::from_parts(vec![1.0, 2.0], vec![0, 1], vec![0, 2, 1, 2], 3, 2).unwrap_err();
        assert!(matches!(err, BenchError::DataFormat(_)));
    }

    #[test]
    fn test_rejects_column_out_of_range() {
        let err = CsrMatrix::from_parts(vec![1.0], vec![5], vec![0, 1], 1, 3).unwrap_err();
        assert!(matches!(err, BenchError::DataFormat(_)));
    }

    #[test]
    fn test_permute_rows() {
        let m = sample();
        let p = m.permute_rows(&[2, 0, 1]);
        assert_eq!(p.row(0), (&[1usize][..], &[3.0][..]));
        assert_eq!(p.row(1), (&[0usize, 2][..], &[1.0, 2.0][..]));
        assert_eq!(p.row(2), (&[][..], &[][..]));
    }

    #[test]
    fn test_slice_rows() {
        let m = sample();
        let tail = m.slice_rows(1, 3);
        assert_eq!(tail.shape(), (2, 3));
        assert_eq!(tail.row(0), (&[][..], &[][..]));
        assert_eq!(tail.row(1), (&[1usize][..], &[3.0][..]));
    }

    #[test]
    fn test_npz_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.npz");
        let m = sample();
        m.write_npz(&path).unwrap();
        let back = CsrMatrix::read_npz(&path).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn test_missing_npz_is_resource_not_found() {
        let err = CsrMatrix::read_npz(Path::new("no/such/file.npz")).unwrap_err();
        assert!(matches!(err, BenchError::ResourceNotFound(_)));
    }
}
