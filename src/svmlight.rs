//! Svmlight-format document files: `label index:value index:value ...`.

use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{open_file, BenchError, Result};
use crate::sparse::CsrMatrix;

/// One parsed svmlight file: per-document labels and sparse count rows.
///
/// Column indices are kept exactly as written; the caller decides the final
/// column count, usually the maximum index across the train and test files
/// so both matrices agree on width.
#[derive(Debug)]
pub struct SvmlightFile {
    pub labels: Vec<i64>,
    rows: Vec<Vec<(usize, f64)>>,
    max_index: Option<usize>,
}

impl SvmlightFile {
    pub fn read(path: &Path) -> Result<Self> {
        let reader = BufReader::new(open_file(path)?);
        let mut labels = Vec::new();
        let mut rows = Vec::new();
        let mut max_index = None;
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            // Anything after '#' is a comment.
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            let mut tokens = line.split_whitespace();
            let label = tokens
                .next()
                .and_then(|t| t.parse::<f64>().ok())
                .ok_or_else(|| bad_line(path, lineno, "missing or non-numeric label"))?;
            let mut row = Vec::new();
            for token in tokens {
                let (idx, val) = token
                    .split_once(':')
                    .ok_or_else(|| bad_line(path, lineno, "feature without ':'"))?;
                let idx: usize = idx
                    .parse()
                    .map_err(|_| bad_line(path, lineno, "non-integer feature index"))?;
                let val: f64 = val
                    .parse()
                    .map_err(|_| bad_line(path, lineno, "non-numeric feature value"))?;
                max_index = Some(max_index.map_or(idx, |m: usize| m.max(idx)));
                row.push((idx, val));
            }
            labels.push(label as i64);
            rows.push(row);
        }
        Ok(Self {
            labels,
            rows,
            max_index,
        })
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Smallest column count that can hold every stored index.
    pub fn min_cols(&self) -> usize {
        self.max_index.map_or(0, |m| m + 1)
    }

    /// Assemble the rows into a CSR matrix with `cols` columns.
    pub fn to_matrix(&self, cols: usize) -> Result<CsrMatrix> {
        let mut data = Vec::new();
        let mut indices = Vec::new();
        let mut indptr = vec![0];
        for row in &self.rows {
            for &(idx, val) in row {
                indices.push(idx);
                data.push(val);
            }
            indptr.push(data.len());
        }
        CsrMatrix::from_parts(data, indices, indptr, self.rows.len(), cols)
    }
}

fn bad_line(path: &Path, lineno: usize, what: &str) -> BenchError {
    BenchError::DataFormat(format!(
        "{}:{}: {}",
        path.display(),
        lineno + 1,
        what
    ))
}
