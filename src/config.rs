//! Run configuration for the evaluation harness.
//!
//! Strongly-typed TOML configuration: dataset, model family, training
//! hyperparameters, and output paths are all chosen at run time instead of
//! by editing source.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BenchError, Result};
use crate::model::TrainOptions;

/// Main configuration structure loaded from `config.toml`.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    pub model: ModelConfig,
    pub training: TrainingConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
pub struct DataConfig {
    /// Root directory holding one subdirectory per dataset.
    pub root: PathBuf,
    /// Dataset name: "20ng", "reuters", "reuters_big" or "20ng_seq".
    pub dataset: String,
}

#[derive(Debug, Deserialize)]
pub struct ModelConfig {
    /// Model family name, e.g. "tfidf", "docnade", "nvdm".
    pub family: String,
    /// Checkpoint path written by `train` and read by the evaluation
    /// commands.
    pub checkpoint: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct TrainingConfig {
    pub learning_rate: f64,
    pub max_iter: usize,
    pub batch_size: usize,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    /// Directory result dumps are written into.
    pub dir: PathBuf,
    pub queries_file: String,
    pub precision_file: String,
    pub similarity_file: String,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                BenchError::ResourceNotFound(path.to_path_buf())
            } else {
                BenchError::Io(e)
            }
        })?;
        Ok(toml::from_str(&content)?)
    }

    pub fn train_options(&self) -> TrainOptions {
        TrainOptions {
            learning_rate: self.training.learning_rate,
            max_iter: self.training.max_iter,
            batch_size: self.training.batch_size,
            checkpoint: Some(self.model.checkpoint.clone()),
        }
    }
}

impl Default for Config {
    /// Configuration used when no `config.toml` is present.
    fn default() -> Self {
        Config {
            data: DataConfig {
                root: PathBuf::from("data"),
                dataset: "20ng".to_string(),
            },
            model: ModelConfig {
                family: "tfidf".to_string(),
                checkpoint: PathBuf::from("checkpoints/tfidf.ckpt"),
            },
            training: TrainingConfig {
                learning_rate: 0.0005,
                max_iter: 10_000,
                batch_size: 100,
            },
            output: OutputConfig {
                dir: PathBuf::from("results"),
                queries_file: "queries.json".to_string(),
                precision_file: "precision.json".to_string(),
                similarity_file: "similarity.json".to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[data]
root = "corpora"
dataset = "reuters_big"

[model]
family = "docnade"
checkpoint = "best_ckpt/docnade.ckpt"

[training]
learning_rate = 0.001
max_iter = 500
batch_size = 32

[output]
dir = "out"
queries_file = "q.json"
precision_file = "p.json"
similarity_file = "s.json"
"#,
        )
        .unwrap();
        let config = Config::load(&path).unwrap();
        assert_eq!(config.data.dataset, "reuters_big");
        assert_eq!(config.model.family, "docnade");
        let opts = config.train_options();
        assert_eq!(opts.max_iter, 500);
        assert_eq!(
            opts.checkpoint.as_deref(),
            Some(Path::new("best_ckpt/docnade.ckpt"))
        );
    }

    #[test]
    fn test_missing_config_is_resource_not_found() {
        let err = Config::load(Path::new("no/such/config.toml")).unwrap_err();
        assert!(matches!(err, BenchError::ResourceNotFound(_)));
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data.dataset, "20ng");
        assert_eq!(config.model.family, "tfidf");
        assert_eq!(config.training.learning_rate, 0.0005);
    }
}
