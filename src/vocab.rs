//! Vocabulary mappings between terms and column indices.

use std::collections::HashMap;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;

use crate::error::{open_file, BenchError, Result};

/// Bijection between vocabulary terms and integer indices.
///
/// Owned for the duration of one dataset session and rebuilt per dataset;
/// nothing here survives a dataset switch.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    words: Vec<String>,
    index: HashMap<String, usize>,
}

/// Structured metadata file with `w2i` and `i2w` members, as shipped with
/// the sequence-flavored datasets.
#[derive(Deserialize)]
struct MetaFile {
    w2i: HashMap<String, usize>,
    i2w: HashMap<String, String>,
}

impl Vocabulary {
    /// Build from an ordered word list, index = position.
    pub fn from_words(words: Vec<String>) -> Result<Self> {
        let mut index = HashMap::with_capacity(words.len());
        for (i, w) in words.iter().enumerate() {
            if index.insert(w.clone(), i).is_some() {
                return Err(BenchError::DataFormat(format!(
                    "duplicate vocabulary term '{}'",
                    w
                )));
            }
        }
        Ok(Self { words, index })
    }

    /// Read a plain-text vocabulary listing, one term per line, line number
    /// equals index.
    pub fn read_txt(path: &Path) -> Result<Self> {
        let reader = BufReader::new(open_file(path)?);
        let words = reader.lines().collect::<std::io::Result<Vec<_>>>()?;
        Self::from_words(words)
    }

    /// Read a JSON metadata file holding `w2i` and `i2w` mappings, checking
    /// that the two sides agree.
    pub fn read_meta(path: &Path) -> Result<Self> {
        let reader = BufReader::new(open_file(path)?);
        let meta: MetaFile = serde_json::from_reader(reader)?;
        let size = meta.w2i.len();
        let mut words = vec![None; size];
        for (word, &i) in &meta.w2i {
            if i >= size {
                return Err(BenchError::DataFormat(format!(
                    "w2i index {} out of range for {} terms",
                    i, size
                )));
            }
            if words[i].replace(word.clone()).is_some() {
                return Err(BenchError::DataFormat(format!(
                    "w2i maps two terms to index {}",
                    i
                )));
            }
        }
        let words: Vec<String> = words
            .into_iter()
            .collect::<Option<_>>()
            .ok_or_else(|| BenchError::DataFormat("w2i indices are not contiguous".to_string()))?;
        for (key, word) in &meta.i2w {
            let i: usize = key.parse().map_err(|_| {
                BenchError::DataFormat(format!("non-numeric i2w key '{}'", key))
            })?;
            if words.get(i) != Some(word) {
                return Err(BenchError::DataFormat(format!(
                    "i2w disagrees with w2i at index {}",
                    i
                )));
            }
        }
        Self::from_words(words)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn index_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    pub fn word(&self, idx: usize) -> Option<&str> {
        self.words.get(idx).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_bijection() {
        let v = Vocabulary::from_words(vec!["alpha".into(), "beta".into(), "gamma".into()])
            .unwrap();
        assert_eq!(v.len(), 3);
        for i in 0..v.len() {
            let w = v.word(i).unwrap();
            assert_eq!(v.index_of(w), Some(i));
        }
        assert_eq!(v.index_of("delta"), None);
        assert_eq!(v.word(7), None);
    }

    #[test]
    fn test_rejects_duplicate_terms() {
        let err = Vocabulary::from_words(vec!["a".into(), "a".into()]).unwrap_err();
        assert!(matches!(err, BenchError::DataFormat(_)));
    }

    #[test]
    fn test_read_txt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.txt");
        fs::write(&path, "medical\nscience\nspace\n").unwrap();
        let v = Vocabulary::read_txt(&path).unwrap();
        assert_eq!(v.len(), 3);
        assert_eq!(v.index_of("space"), Some(2));
    }

    #[test]
    fn test_read_meta() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta_data");
        fs::write(
            &path,
            r#"{"w2i": {"a": 0, "b": 1}, "i2w": {"0": "a", "1": "b"}}"#,
        )
        .unwrap();
        let v = Vocabulary::read_meta(&path).unwrap();
        assert_eq!(v.word(1), Some("b"));
    }

    #[test]
    fn test_read_meta_rejects_disagreement() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meta_data");
        fs::write(
            &path,
            r#"{"w2i": {"a": 0, "b": 1}, "i2w": {"0": "b", "1": "a"}}"#,
        )
        .unwrap();
        let err = Vocabulary::read_meta(&path).unwrap_err();
        assert!(matches!(err, BenchError::DataFormat(_)));
    }
}
