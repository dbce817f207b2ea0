//! # docbench
//!
//! An evaluation harness for comparing unsupervised neural document models
//! (DocNADE, RSM, NVDM, DeepDocNADE, VAENADE, DVAE) on text-classification
//! corpora. The crate owns the protocol every model is scored under:
//! dataset loading, paired shuffling, sequence expansion, and evaluation via
//! perplexity, retrieval precision at fixed corpus-size fractions, and
//! nearest-neighbor relevance. The models themselves are external adapters
//! behind the [`model::TopicModel`] trait; a count-based TF-IDF baseline
//! ships in-crate so every path is runnable.
//!
//! ## Quick start
//!
//! ```no_run
//! use std::path::Path;
//! use docbench::corpus::DatasetKind;
//! use docbench::eval::evaluate_ir;
//! use docbench::model::{build_model, ModelFamily, TrainOptions};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let corpus = DatasetKind::TwentyNewsgroups.load(Path::new("data"))?;
//!     let mut model = build_model(ModelFamily::Tfidf, corpus.vocab.clone())?;
//!     model.train(&corpus.train, corpus.validation.as_ref(), &TrainOptions::default())?;
//!
//!     let queries = model.ir(&corpus.train, &corpus.test, false)?;
//!     let precision = evaluate_ir(&queries, corpus.train.num_docs());
//!     println!("{:?}", precision);
//!     Ok(())
//! }
//! ```
//!
//! ## Dataset layout
//!
//! Datasets live under one root directory, one subdirectory per dataset.
//! Pre-split datasets (`20ng`, `reuters`) ship `{train,valid,test}_data.npz`
//! sparse matrices with `{split}_labels.npy` class ids or `.npz` indicator
//! matrices, plus an optional `vocab.txt`. Pooled datasets (`reuters_big`)
//! ship one `data.npz` / `data_lbl.npz` pair, a `seq_data` JSON token file
//! and a `meta_data` vocabulary file; the last rows are held out as the test
//! set. Svmlight datasets (`20ng_seq`) ship `train` / `test` text records
//! with `seq_train` / `seq_test` JSON token files.

pub mod baseline;
pub mod cli;
pub mod config;
pub mod corpus;
pub mod error;
pub mod eval;
pub mod model;
pub mod report;
pub mod sequence;
pub mod shuffle;
pub mod sparse;
pub mod svmlight;
pub mod vocab;

pub use corpus::{Corpus, DatasetKind, Labels, Split};
pub use error::{BenchError, Result};
pub use eval::{evaluate_ir, IR_FRACTIONS};
pub use model::{build_model, ModelFamily, TopicModel, TrainOptions};
pub use sparse::CsrMatrix;
pub use vocab::Vocabulary;
