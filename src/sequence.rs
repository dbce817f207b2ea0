//! Expansion of bag-of-words rows into randomized token sequences.
//!
//! Sequence-consuming models take documents as token streams, not count
//! vectors. The expansion synthesizes an ordering; only multiset membership
//! carries information downstream.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::sparse::CsrMatrix;

/// Expand one sparse row into a flat sequence of term indices, each index
/// repeated its (integer-truncated) count number of times, in uniformly
/// random order. An all-zero row yields an empty sequence. The source row
/// is left untouched.
pub fn expand_row<R: Rng>(indices: &[usize], counts: &[f64], rng: &mut R) -> Vec<usize> {
    let mut seq = Vec::new();
    for (&idx, &count) in indices.iter().zip(counts) {
        for _ in 0..count as usize {
            seq.push(idx);
        }
    }
    seq.shuffle(rng);
    seq
}

/// Expand every row of a document-term matrix.
pub fn expand_matrix(matrix: &CsrMatrix) -> Vec<Vec<usize>> {
    let mut rng = rand::thread_rng();
    matrix
        .iter_rows()
        .map(|(indices, counts)| expand_row(indices, counts, &mut rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_multiset_expansion() {
        let mut rng = StdRng::seed_from_u64(7);
        let seq = expand_row(&[2, 5], &[3.0, 1.0], &mut rng);
        assert_eq!(seq.len(), 4);
        assert_eq!(seq.iter().filter(|&&i| i == 2).count(), 3);
        assert_eq!(seq.iter().filter(|&&i| i == 5).count(), 1);
    }

    #[test]
    fn test_zero_row_is_empty() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(expand_row(&[], &[], &mut rng).is_empty());
        assert!(expand_row(&[3], &[0.0], &mut rng).is_empty());
    }

    #[test]
    fn test_counts_truncate() {
        let mut rng = StdRng::seed_from_u64(7);
        let seq = expand_row(&[1], &[2.9], &mut rng);
        assert_eq!(seq, vec![1, 1]);
    }

    #[test]
    fn test_expand_matrix() {
        let m = CsrMatrix::from_parts(vec![2.0, 1.0], vec![0, 1], vec![0, 1, 1, 2], 3, 2)
            .unwrap();
        let seqs = expand_matrix(&m);
        assert_eq!(seqs.len(), 3);
        assert_eq!(seqs[0], vec![0, 0]);
        assert!(seqs[1].is_empty());
        assert_eq!(seqs[2], vec![1]);
    }
}
