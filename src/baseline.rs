//! Count-based retrieval baseline wired through the model interface.
//!
//! TF-IDF document vectors with cosine ranking, a Laplace-smoothed unigram
//! distribution for perplexity, and JSON state as the restorable checkpoint.
//! No learned parameters beyond corpus statistics, which makes it a cheap
//! reference point next to the neural adapters.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::corpus::{Labels, Split};
use crate::error::{open_file, BenchError, Result};
use crate::model::{TopicModel, TrainOptions};
use crate::sparse::CsrMatrix;
use crate::vocab::Vocabulary;

/// Everything the model learns from a training set. Serialized wholesale as
/// the checkpoint.
#[derive(Serialize, Deserialize)]
struct State {
    vocab_size: usize,
    idf: Vec<f64>,
    unigram_logp: Vec<f64>,
    /// Embedded training documents; these define the term geometry behind
    /// `closest_words`.
    train_docs: Vec<Vec<(usize, f64)>>,
    col_norms: Vec<f64>,
}

pub struct TfidfRetrieval {
    vocab: Option<Vocabulary>,
    state: Option<State>,
}

impl TfidfRetrieval {
    pub fn new(vocab: Option<Vocabulary>) -> Self {
        Self { vocab, state: None }
    }

    fn state(&self) -> Result<&State> {
        self.state
            .as_ref()
            .ok_or_else(|| BenchError::Model("model has not been trained or restored".to_string()))
    }

    /// Persist the learned statistics as an opaque JSON checkpoint.
    pub fn save(&self, path: &Path) -> Result<()> {
        let state = self.state()?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut file = BufWriter::new(File::create(path)?);
        serde_json::to_writer(&mut file, state)?;
        file.flush()?;
        Ok(())
    }
}

/// TF normalized by document length, `ln(n / df)` IDF, L2-normalized rows.
fn embed(matrix: &CsrMatrix, idf: &[f64]) -> Vec<Vec<(usize, f64)>> {
    matrix
        .iter_rows()
        .map(|(cols, vals)| {
            let total: f64 = vals.iter().sum();
            if total == 0.0 {
                return Vec::new();
            }
            let mut row: Vec<(usize, f64)> = cols
                .iter()
                .zip(vals)
                .map(|(&j, &v)| (j, v / total * idf[j]))
                .collect();
            let norm = row.iter().map(|&(_, w)| w * w).sum::<f64>().sqrt();
            if norm > 0.0 {
                for (_, w) in &mut row {
                    *w /= norm;
                }
            }
            row
        })
        .collect()
}

/// Cosine scores of `query` against every embedded training document.
fn score_against(
    train_docs: &[Vec<(usize, f64)>],
    query: &[(usize, f64)],
    buf: &mut [f64],
) -> Vec<f64> {
    for &(j, w) in query {
        buf[j] = w;
    }
    let scores = train_docs
        .iter()
        .map(|doc| doc.iter().map(|&(j, w)| w * buf[j]).sum())
        .collect();
    for &(j, _) in query {
        buf[j] = 0.0;
    }
    scores
}

/// Training-document indices ordered by decreasing score.
fn ranking(scores: &[f64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    order
}

fn check_label_layout(train: &Split, test: &Split, multi_label: bool) -> Result<()> {
    if train.labels.is_multi_label() != test.labels.is_multi_label() {
        return Err(BenchError::DataFormat(
            "train and test label layouts differ".to_string(),
        ));
    }
    if multi_label != train.labels.is_multi_label() {
        return Err(BenchError::DataFormat(
            "multi_label flag does not match the label layout".to_string(),
        ));
    }
    Ok(())
}

/// 1.0 when training document `i` is a relevant result for query `q`.
/// Multi-label documents are relevant when they share at least one label.
fn relevance(train_labels: &Labels, test_labels: &Labels, i: usize, q: usize) -> f64 {
    match (train_labels, test_labels) {
        (Labels::Classes(a), Labels::Classes(b)) => {
            if a[i] == b[q] {
                1.0
            } else {
                0.0
            }
        }
        (Labels::Indicator(a), Labels::Indicator(b)) => {
            let (ai, av) = a.row(i);
            let (bi, bv) = b.row(q);
            let overlap = ai.iter().zip(av).any(|(&ja, &va)| {
                va != 0.0 && bi.iter().zip(bv).any(|(&jb, &vb)| jb == ja && vb != 0.0)
            });
            if overlap {
                1.0
            } else {
                0.0
            }
        }
        _ => 0.0,
    }
}

impl TopicModel for TfidfRetrieval {
    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn train(&mut self, train: &Split, heldout: Option<&Split>, opts: &TrainOptions) -> Result<()> {
        let matrix = &train.matrix;
        let (n, vocab_size) = matrix.shape();
        println!("fitting tf-idf statistics over {} documents...", n);

        let mut df = vec![0usize; vocab_size];
        let mut counts = vec![0.0f64; vocab_size];
        let mut total = 0.0;
        for (cols, vals) in matrix.iter_rows() {
            for (&j, &v) in cols.iter().zip(vals) {
                if v != 0.0 {
                    df[j] += 1;
                }
                counts[j] += v;
                total += v;
            }
        }
        let idf: Vec<f64> = df
            .iter()
            .map(|&d| (n as f64 / d.max(1) as f64).ln())
            .collect();
        // Laplace smoothing keeps unseen terms at finite log-probability.
        let unigram_logp: Vec<f64> = counts
            .iter()
            .map(|&c| ((c + 1.0) / (total + vocab_size as f64)).ln())
            .collect();

        let train_docs = embed(matrix, &idf);
        let mut col_norms = vec![0.0f64; vocab_size];
        for doc in &train_docs {
            for &(j, w) in doc {
                col_norms[j] += w * w;
            }
        }
        for norm in &mut col_norms {
            *norm = norm.sqrt();
        }

        self.state = Some(State {
            vocab_size,
            idf,
            unigram_logp,
            train_docs,
            col_norms,
        });

        if let Some(heldout) = heldout {
            println!("  heldout perplexity: {:.2}", self.perplexity(heldout)?);
        }
        if let Some(path) = &opts.checkpoint {
            self.save(path)?;
            println!("  checkpoint written to {}", path.display());
        }
        Ok(())
    }

    fn restore(&mut self, checkpoint: &Path) -> Result<()> {
        let reader = BufReader::new(open_file(checkpoint)?);
        self.state = Some(serde_json::from_reader(reader)?);
        Ok(())
    }

    fn perplexity(&self, eval: &Split) -> Result<f64> {
        let state = self.state()?;
        let logp = &state.unigram_logp;
        let mut loglik = 0.0;
        let mut tokens = 0.0;
        if let Some(seqs) = &eval.sequences {
            for seq in seqs {
                for &t in seq {
                    let p = logp.get(t).ok_or_else(|| {
                        BenchError::Model(format!("token index {} outside the vocabulary", t))
                    })?;
                    loglik += p;
                    tokens += 1.0;
                }
            }
        } else {
            for (cols, vals) in eval.matrix.iter_rows() {
                for (&j, &v) in cols.iter().zip(vals) {
                    let p = logp.get(j).ok_or_else(|| {
                        BenchError::Model(format!("token index {} outside the vocabulary", j))
                    })?;
                    loglik += v * p;
                    tokens += v;
                }
            }
        }
        Ok((-loglik / tokens).exp())
    }

    fn closest_words(&self, term: &str, k: usize) -> Result<Vec<(String, f64)>> {
        let state = self.state()?;
        let vocab = self
            .vocab
            .as_ref()
            .ok_or_else(|| BenchError::Model("no vocabulary attached to this model".to_string()))?;
        let target = vocab
            .index_of(term)
            .ok_or_else(|| BenchError::Model(format!("term '{}' is not in the vocabulary", term)))?;

        // Term-term cosine through the documents both terms occur in.
        let mut scores = vec![0.0f64; state.vocab_size];
        for doc in &state.train_docs {
            let wt = doc
                .iter()
                .find(|&&(j, _)| j == target)
                .map(|&(_, w)| w)
                .unwrap_or(0.0);
            if wt == 0.0 {
                continue;
            }
            for &(j, w) in doc {
                scores[j] += wt * w;
            }
        }
        let target_norm = state.col_norms[target];
        let mut ranked: Vec<(String, f64)> = Vec::new();
        for (j, &s) in scores.iter().enumerate() {
            if j == target || s <= 0.0 {
                continue;
            }
            let norm = state.col_norms[j];
            if norm == 0.0 || target_norm == 0.0 {
                continue;
            }
            if let Some(word) = vocab.word(j) {
                ranked.push((word.to_string(), s / (target_norm * norm)));
            }
        }
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked.truncate(k);
        Ok(ranked)
    }

    fn ir(&self, train: &Split, test: &Split, multi_label: bool) -> Result<Vec<f64>> {
        check_label_layout(train, test, multi_label)?;
        let state = self.state()?;
        let train_docs = embed(&train.matrix, &state.idf);
        let test_docs = embed(&test.matrix, &state.idf);
        let mut buf = vec![0.0f64; state.vocab_size];
        let mut sums = vec![0.0f64; train_docs.len()];
        for (q, query) in test_docs.iter().enumerate() {
            let scores = score_against(&train_docs, query, &mut buf);
            for (r, &i) in ranking(&scores).iter().enumerate() {
                sums[r] += relevance(&train.labels, &test.labels, i, q);
            }
        }
        let n_queries = test_docs.len() as f64;
        Ok(sums.into_iter().map(|s| s / n_queries).collect())
    }

    fn similarity(&self, train: &Split, test: &Split, multi_label: bool) -> Result<Vec<f64>> {
        check_label_layout(train, test, multi_label)?;
        let state = self.state()?;
        let train_docs = embed(&train.matrix, &state.idf);
        let test_docs = embed(&test.matrix, &state.idf);
        let mut buf = vec![0.0f64; state.vocab_size];
        let mut result = Vec::with_capacity(test_docs.len());
        for (q, query) in test_docs.iter().enumerate() {
            let scores = score_against(&train_docs, query, &mut buf);
            let nearest = *ranking(&scores)
                .first()
                .ok_or_else(|| BenchError::Model("empty training set".to_string()))?;
            result.push(relevance(&train.labels, &test.labels, nearest, q));
        }
        Ok(result)
    }
}
