//! Paired shuffling of documents and their labels.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::corpus::{Labels, Split};
use crate::sparse::CsrMatrix;

/// Draw a fresh uniform permutation of `0..n`.
pub fn permutation<R: Rng>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut perm: Vec<usize> = (0..n).collect();
    perm.shuffle(rng);
    perm
}

/// Permute matrix rows and labels by one shared random permutation.
///
/// Each call draws its own permutation, so shuffling train and validation
/// separately reorders them independently. Row-to-label correspondence is
/// preserved exactly.
pub fn shuffle_pair(matrix: &CsrMatrix, labels: &Labels) -> (CsrMatrix, Labels) {
    shuffle_pair_with(matrix, labels, &mut rand::thread_rng())
}

/// Seedable variant of [`shuffle_pair`].
pub fn shuffle_pair_with<R: Rng>(
    matrix: &CsrMatrix,
    labels: &Labels,
    rng: &mut R,
) -> (CsrMatrix, Labels) {
    let perm = permutation(matrix.rows(), rng);
    (matrix.permute_rows(&perm), labels.permute(&perm))
}

/// Shuffle a whole split in place, keeping matrix, labels, and any attached
/// token sequences aligned under the same permutation.
pub fn shuffle_split(split: &mut Split) {
    let perm = permutation(split.matrix.rows(), &mut rand::thread_rng());
    split.matrix = split.matrix.permute_rows(&perm);
    split.labels = split.labels.permute(&perm);
    if let Some(seqs) = split.sequences.take() {
        split.sequences = Some(perm.iter().map(|&i| seqs[i].clone()).collect());
    }
}
