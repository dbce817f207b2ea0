//! Information-retrieval precision at fixed corpus-size fractions.

/// Cutoff fractions of the training-set size at which retrieval precision is
/// reported, in increasing order.
pub const IR_FRACTIONS: [f64; 7] = [0.00001, 0.00006, 0.00051, 0.004, 0.016, 0.064, 0.256];

/// Mean precision of a query relevance curve at each configured cutoff.
///
/// `queries[r]` is the mean relevance of the rank-`r` retrieved training
/// document, averaged over all queries; `train_size` is the number of
/// training documents. The cutoff rank for a fraction `f` is
/// `f * train_size + 1` truncated to an integer. That extra +1 before
/// truncation is kept as is: changing it changes every reported precision
/// number. Ranks past the end of the curve clamp to its length.
pub fn evaluate_ir(queries: &[f64], train_size: usize) -> Vec<f64> {
    IR_FRACTIONS
        .iter()
        .map(|f| {
            let rank = (f * train_size as f64 + 1.0) as usize;
            let take = rank.min(queries.len());
            queries[..take].iter().sum::<f64>() / take as f64
        })
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

pub fn std_dev(values: &[f64]) -> f64 {
    let m = mean(values);
    (values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64).sqrt()
}
