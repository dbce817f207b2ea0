//! Result persistence: one JSON value per file, for offline analysis.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{open_file, Result};

/// Serialize `value` as JSON to `path`, replacing any existing file.
///
/// Purely a passthrough: no schema, no versioning. Whatever serializes is
/// accepted.
pub fn dump<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<()> {
    let mut file = BufWriter::new(File::create(path)?);
    serde_json::to_writer(&mut file, value)?;
    file.flush()?;
    Ok(())
}

/// Read back a value written by [`dump`].
pub fn load<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = BufReader::new(open_file(path)?);
    Ok(serde_json::from_reader(file)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BenchError;
    use serde_json::{json, Value};

    #[test]
    fn test_round_trip_nested_structure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result");
        let value = json!({"a": [1, 2, 3], "b": 2.5});
        dump(&value, &path).unwrap();
        let back: Value = load(&path).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("result");
        dump(&vec![1.0, 2.0, 3.0], &path).unwrap();
        dump(&vec![9.0], &path).unwrap();
        let back: Vec<f64> = load(&path).unwrap();
        assert_eq!(back, vec![9.0]);
    }

    #[test]
    fn test_load_missing_file() {
        let err = load::<Value>(Path::new("no/such/result")).unwrap_err();
        assert!(matches!(err, BenchError::ResourceNotFound(_)));
    }
}
