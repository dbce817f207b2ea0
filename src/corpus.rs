//! Dataset loading: named corpora, splits, and label data.
//!
//! Three on-disk flavors exist. Pre-split datasets persist train, validation
//! and test matrices independently; pooled datasets persist one combined
//! matrix and hold out the last rows as the test set; svmlight datasets
//! persist train and test as text records. The sequence-flavored datasets
//! additionally ship pre-tokenized documents and a vocabulary metadata file.

use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use ndarray::Array1;
use ndarray_npy::ReadNpyExt;

use crate::error::{open_file, BenchError, Result};
use crate::sequence;
use crate::shuffle;
use crate::sparse::CsrMatrix;
use crate::svmlight::SvmlightFile;
use crate::vocab::Vocabulary;

/// Per-document label data, aligned by row with a document-term matrix.
#[derive(Debug, Clone, PartialEq)]
pub enum Labels {
    /// One class id per document.
    Classes(Vec<i64>),
    /// One multi-label indicator row per document.
    Indicator(CsrMatrix),
}

impl Labels {
    pub fn len(&self) -> usize {
        match self {
            Labels::Classes(c) => c.len(),
            Labels::Indicator(m) => m.rows(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_multi_label(&self) -> bool {
        matches!(self, Labels::Indicator(_))
    }

    /// New labels whose entry `i` is this set's entry `perm[i]`.
    pub fn permute(&self, perm: &[usize]) -> Labels {
        match self {
            Labels::Classes(c) => Labels::Classes(perm.iter().map(|&i| c[i]).collect()),
            Labels::Indicator(m) => Labels::Indicator(m.permute_rows(perm)),
        }
    }

    fn slice(&self, start: usize, end: usize) -> Labels {
        match self {
            Labels::Classes(c) => Labels::Classes(c[start..end].to_vec()),
            Labels::Indicator(m) => Labels::Indicator(m.slice_rows(start, end)),
        }
    }
}

/// One named partition of a dataset: documents, labels, and (for the
/// sequence-flavored datasets) pre-tokenized documents. Created once at load
/// time; only the shuffler reorders it afterwards.
#[derive(Debug, Clone)]
pub struct Split {
    pub matrix: CsrMatrix,
    pub labels: Labels,
    pub sequences: Option<Vec<Vec<usize>>>,
}

impl Split {
    pub fn new(
        matrix: CsrMatrix,
        labels: Labels,
        sequences: Option<Vec<Vec<usize>>>,
    ) -> Result<Self> {
        if labels.len() != matrix.rows() {
            return Err(BenchError::DataFormat(format!(
                "{} documents but {} labels",
                matrix.rows(),
                labels.len()
            )));
        }
        if let Some(seqs) = &sequences {
            if seqs.len() != matrix.rows() {
                return Err(BenchError::DataFormat(format!(
                    "{} documents but {} token sequences",
                    matrix.rows(),
                    seqs.len()
                )));
            }
        }
        Ok(Self {
            matrix,
            labels,
            sequences,
        })
    }

    pub fn num_docs(&self) -> usize {
        self.matrix.rows()
    }

    /// Token sequences for every document, expanding from the count rows
    /// when the dataset did not ship a sequence file.
    pub fn sequences_or_expand(&mut self) -> &[Vec<usize>] {
        if self.sequences.is_none() {
            self.sequences = Some(sequence::expand_matrix(&self.matrix));
        }
        self.sequences.as_deref().unwrap_or(&[])
    }
}

/// A fully loaded dataset session.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub train: Split,
    pub validation: Option<Split>,
    pub test: Split,
    pub vocab: Option<Vocabulary>,
}

impl Corpus {
    pub fn vocab_size(&self) -> usize {
        self.train.matrix.cols()
    }
}

/// The datasets the harness knows how to load, selected by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetKind {
    /// 20 Newsgroups, pre-split with class labels and a vocab.txt listing.
    TwentyNewsgroups,
    /// Reuters, pre-split with multi-label indicator matrices.
    Reuters,
    /// Large Reuters pool with sequence data, last 10000 rows held out.
    ReutersBig,
    /// 20 Newsgroups in svmlight form with sequence data.
    TwentyNewsgroupsSeq,
}

impl DatasetKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DatasetKind::TwentyNewsgroups => "20ng",
            DatasetKind::Reuters => "reuters",
            DatasetKind::ReutersBig => "reuters_big",
            DatasetKind::TwentyNewsgroupsSeq => "20ng_seq",
        }
    }

    /// Subdirectory of the data root holding this dataset's files.
    pub fn dir_name(&self) -> &'static str {
        match self {
            DatasetKind::ReutersBig => "reuters_big_seq",
            other => other.as_str(),
        }
    }

    pub fn load(&self, data_root: &Path) -> Result<Corpus> {
        let dir = data_root.join(self.dir_name());
        match self {
            DatasetKind::TwentyNewsgroups => load_presplit(&dir, true),
            DatasetKind::Reuters => load_presplit(&dir, false),
            DatasetKind::ReutersBig => load_pooled(&dir, 10000),
            DatasetKind::TwentyNewsgroupsSeq => load_svmlight_seq(&dir),
        }
    }
}

impl FromStr for DatasetKind {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "20ng" => Ok(DatasetKind::TwentyNewsgroups),
            "reuters" => Ok(DatasetKind::Reuters),
            "reuters_big" => Ok(DatasetKind::ReutersBig),
            "20ng_seq" => Ok(DatasetKind::TwentyNewsgroupsSeq),
            other => Err(BenchError::DataFormat(format!(
                "unknown dataset '{}'",
                other
            ))),
        }
    }
}

/// Class ids from `{stem}_labels.npy` or an indicator matrix from
/// `{stem}_labels.npz`, whichever the dataset ships.
fn load_labels(dir: &Path, stem: &str) -> Result<Labels> {
    let npy = dir.join(format!("{}_labels.npy", stem));
    if npy.exists() {
        let arr = Array1::<i64>::read_npy(open_file(&npy)?)?;
        return Ok(Labels::Classes(arr.to_vec()));
    }
    let npz = dir.join(format!("{}_labels.npz", stem));
    if npz.exists() {
        return Ok(Labels::Indicator(CsrMatrix::read_npz(&npz)?));
    }
    Err(BenchError::ResourceNotFound(npy))
}

/// Pre-split flavor: three independently persisted splits, each shuffled at
/// load, plus an optional plain-text vocabulary listing.
fn load_presplit(dir: &Path, has_vocab: bool) -> Result<Corpus> {
    let mut train = Split::new(
        CsrMatrix::read_npz(&dir.join("train_data.npz"))?,
        load_labels(dir, "train")?,
        None,
    )?;
    let mut validation = Split::new(
        CsrMatrix::read_npz(&dir.join("valid_data.npz"))?,
        load_labels(dir, "valid")?,
        None,
    )?;
    let mut test = Split::new(
        CsrMatrix::read_npz(&dir.join("test_data.npz"))?,
        load_labels(dir, "test")?,
        None,
    )?;
    shuffle::shuffle_split(&mut train);
    shuffle::shuffle_split(&mut validation);
    shuffle::shuffle_split(&mut test);
    let vocab = if has_vocab {
        Some(Vocabulary::read_txt(&dir.join("vocab.txt"))?)
    } else {
        None
    };
    Ok(Corpus {
        train,
        validation: Some(validation),
        test,
        vocab,
    })
}

fn read_seq_file(path: &Path) -> Result<Vec<Vec<usize>>> {
    let reader = BufReader::new(open_file(path)?);
    Ok(serde_json::from_reader(reader)?)
}

/// Pooled flavor: one combined matrix and indicator-label matrix with the
/// last `holdout` rows split off as the test set, token sequences from a
/// side JSON file split at the same point. No shuffle.
fn load_pooled(dir: &Path, holdout: usize) -> Result<Corpus> {
    let data = CsrMatrix::read_npz(&dir.join("data.npz"))?;
    let labels = CsrMatrix::read_npz(&dir.join("data_lbl.npz"))?;
    if holdout >= data.rows() {
        return Err(BenchError::DataFormat(format!(
            "holdout of {} rows exceeds pool of {}",
            holdout,
            data.rows()
        )));
    }
    if labels.rows() != data.rows() {
        return Err(BenchError::DataFormat(format!(
            "{} documents but {} label rows",
            data.rows(),
            labels.rows()
        )));
    }
    let labels = Labels::Indicator(labels);
    let seqs = read_seq_file(&dir.join("seq_data"))?;
    if seqs.len() != data.rows() {
        return Err(BenchError::DataFormat(format!(
            "{} documents but {} token sequences",
            data.rows(),
            seqs.len()
        )));
    }
    let cut = data.rows() - holdout;
    let train = Split::new(
        data.slice_rows(0, cut),
        labels.slice(0, cut),
        Some(seqs[..cut].to_vec()),
    )?;
    let test = Split::new(
        data.slice_rows(cut, data.rows()),
        labels.slice(cut, labels.len()),
        Some(seqs[cut..].to_vec()),
    )?;
    let vocab = Vocabulary::read_meta(&dir.join("meta_data"))?;
    Ok(Corpus {
        train,
        validation: None,
        test,
        vocab: Some(vocab),
    })
}

/// Svmlight flavor: train and test text records, token sequences from side
/// JSON files, vocabulary from the metadata file. No shuffle.
fn load_svmlight_seq(dir: &Path) -> Result<Corpus> {
    let train_file = SvmlightFile::read(&dir.join("train"))?;
    let test_file = SvmlightFile::read(&dir.join("test"))?;
    let vocab = Vocabulary::read_meta(&dir.join("meta_data"))?;
    // Both matrices share one width wide enough for every index seen.
    let cols = train_file
        .min_cols()
        .max(test_file.min_cols())
        .max(vocab.len());
    let train = Split::new(
        train_file.to_matrix(cols)?,
        Labels::Classes(train_file.labels.clone()),
        Some(read_seq_file(&dir.join("seq_train"))?),
    )?;
    let test = Split::new(
        test_file.to_matrix(cols)?,
        Labels::Classes(test_file.labels.clone()),
        Some(read_seq_file(&dir.join("seq_test"))?),
    )?;
    Ok(Corpus {
        train,
        validation: None,
        test,
        vocab: Some(vocab),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray_npy::WriteNpyExt;
    use std::fs;
    use std::fs::File;

    fn write_labels_npy(path: &Path, labels: &[i64]) {
        let arr = Array1::from(labels.to_vec());
        arr.write_npy(File::create(path).unwrap()).unwrap();
    }

    // 3 documents over 5 terms; row i holds value i + 1 at column i, so a
    // document's identity survives shuffling.
    fn tagged_3x5() -> CsrMatrix {
        CsrMatrix::from_parts(
            vec![1.0, 2.0, 3.0],
            vec![0, 1, 2],
            vec![0, 1, 2, 3],
            3,
            5,
        )
        .unwrap()
    }

    fn write_presplit_dataset(dir: &Path) {
        let m = tagged_3x5();
        for stem in ["train", "valid", "test"] {
            m.write_npz(&dir.join(format!("{}_data.npz", stem))).unwrap();
            write_labels_npy(&dir.join(format!("{}_labels.npy", stem)), &[10, 20, 30]);
        }
        fs::write(dir.join("vocab.txt"), "a\nb\nc\nd\ne\n").unwrap();
    }

    #[test]
    fn test_presplit_load_preserves_alignment() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("20ng");
        fs::create_dir(&dir).unwrap();
        write_presplit_dataset(&dir);

        let corpus = DatasetKind::TwentyNewsgroups.load(root.path()).unwrap();
        assert_eq!(corpus.train.matrix.shape(), (3, 5));
        assert_eq!(corpus.train.labels.len(), 3);
        assert_eq!(corpus.vocab_size(), 5);
        assert_eq!(corpus.vocab.as_ref().unwrap().len(), 5);
        assert!(corpus.validation.is_some());

        // After the load-time shuffle, each row's tag still matches its
        // label: document i carries value i + 1 and label (i + 1) * 10.
        let classes = match &corpus.train.labels {
            Labels::Classes(c) => c.clone(),
            _ => unreachable!(),
        };
        for i in 0..3 {
            let (_, vals) = corpus.train.matrix.row(i);
            assert_eq!(classes[i], vals[0] as i64 * 10);
        }
    }

    #[test]
    fn test_presplit_missing_file() {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir(root.path().join("20ng")).unwrap();
        let err = DatasetKind::TwentyNewsgroups.load(root.path()).unwrap_err();
        assert!(matches!(err, BenchError::ResourceNotFound(_)));
    }

    #[test]
    fn test_pooled_load_splits_holdout() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("reuters_big_seq");
        fs::create_dir(&dir).unwrap();
        let m = tagged_3x5();
        m.write_npz(&dir.join("data.npz")).unwrap();
        m.write_npz(&dir.join("data_lbl.npz")).unwrap();
        fs::write(dir.join("seq_data"), "[[0], [1, 1], [2]]").unwrap();
        fs::write(
            dir.join("meta_data"),
            r#"{"w2i": {"a": 0, "b": 1, "c": 2, "d": 3, "e": 4},
                "i2w": {"0": "a", "1": "b", "2": "c", "3": "d", "4": "e"}}"#,
        )
        .unwrap();

        let corpus = load_pooled(&dir, 1).unwrap();
        assert_eq!(corpus.train.num_docs(), 2);
        assert_eq!(corpus.test.num_docs(), 1);
        assert!(corpus.validation.is_none());
        assert_eq!(corpus.test.matrix.row(0), (&[2usize][..], &[3.0][..]));
        assert_eq!(corpus.test.sequences.as_ref().unwrap()[0], vec![2]);
        assert!(corpus.train.labels.is_multi_label());
    }

    #[test]
    fn test_pooled_rejects_sequence_count_mismatch() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("pool");
        fs::create_dir(&dir).unwrap();
        let m = tagged_3x5();
        m.write_npz(&dir.join("data.npz")).unwrap();
        m.write_npz(&dir.join("data_lbl.npz")).unwrap();
        fs::write(dir.join("seq_data"), "[[0]]").unwrap();
        let err = load_pooled(&dir, 1).unwrap_err();
        assert!(matches!(err, BenchError::DataFormat(_)));
    }

    #[test]
    fn test_svmlight_seq_load() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("20ng_seq");
        fs::create_dir(&dir).unwrap();
        fs::write(dir.join("train"), "1 0:2 1:1\n2 2:1\n").unwrap();
        fs::write(dir.join("test"), "1 3:1\n").unwrap();
        fs::write(dir.join("seq_train"), "[[0, 0, 1], [2]]").unwrap();
        fs::write(dir.join("seq_test"), "[[3]]").unwrap();
        fs::write(
            dir.join("meta_data"),
            r#"{"w2i": {"a": 0, "b": 1, "c": 2, "d": 3},
                "i2w": {"0": "a", "1": "b", "2": "c", "3": "d"}}"#,
        )
        .unwrap();

        let corpus = DatasetKind::TwentyNewsgroupsSeq.load(root.path()).unwrap();
        assert_eq!(corpus.train.matrix.shape(), (2, 4));
        assert_eq!(corpus.test.matrix.shape(), (1, 4));
        assert_eq!(corpus.train.sequences.as_ref().unwrap()[0], vec![0, 0, 1]);
        match &corpus.train.labels {
            Labels::Classes(c) => assert_eq!(c, &vec![1, 2]),
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_split_rejects_label_mismatch() {
        let err = Split::new(tagged_3x5(), Labels::Classes(vec![1, 2]), None).unwrap_err();
        assert!(matches!(err, BenchError::DataFormat(_)));
    }

    #[test]
    fn test_sequences_or_expand() {
        let mut split = Split::new(tagged_3x5(), Labels::Classes(vec![1, 2, 3]), None).unwrap();
        let seqs = split.sequences_or_expand();
        assert_eq!(seqs.len(), 3);
        assert_eq!(seqs[1], vec![1, 1]);
    }

    #[test]
    fn test_dataset_names() {
        for kind in [
            DatasetKind::TwentyNewsgroups,
            DatasetKind::Reuters,
            DatasetKind::ReutersBig,
            DatasetKind::TwentyNewsgroupsSeq,
        ] {
            assert_eq!(kind.as_str().parse::<DatasetKind>().unwrap(), kind);
        }
        assert!("webkb".parse::<DatasetKind>().is_err());
    }
}
