use std::{
    fs,
    io::{self, ErrorKind},
    path::{Path, PathBuf},
};

use serde::de::DeserializeOwned;

/// Read and deserialize a JSON file from the given path
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, JsonFileError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| JsonFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    serde_json::from_str(&contents).map_err(|source| JsonFileError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Copy each of the named files that exist in `from` into `to`, returning the new paths
pub fn copy_existing(from: &Path, to: &Path, names: &[&str]) -> io::Result<Vec<PathBuf>> {
    let mut copied = Vec::with_capacity(names.len());

    for name in names {
        let source = from.join(name);
        let target = to.join(name);

        match fs::copy(&source, &target) {
            Ok(_) => copied.push(target),
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(copied)
}

/// JSON file errors
#[derive(thiserror::Error, Debug)]
pub enum JsonFileError {
    /// The file could not be read
    #[error("unable to read {}: {source}", path.display())]
    Io {
        /// The file that failed
        path: PathBuf,
        /// The underlying I/O error
        source: io::Error,
    },

    /// The file is not valid JSON for the expected shape
    #[error("unable to parse {}: {source}", path.display())]
    Parse {
        /// The file that failed
        path: PathBuf,
        /// The underlying parse error
        source: serde_json::Error,
    },
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    use super::*;

    #[derive(Deserialize, Debug, PartialEq)]
    struct Sample {
        name: String,
    }

    #[tokio::test]
    async fn test_read_json_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = read_json::<Sample>(&dir.path().join("missing.json")).await;
        assert!(matches!(missing, Err(JsonFileError::Io { .. })));

        let path = dir.path().join("broken.json");
        fs::write(&path, "{ \"name\": ").unwrap();
        let broken = read_json::<Sample>(&path).await;
        assert!(matches!(broken, Err(JsonFileError::Parse { .. })));

        fs::write(&path, "{ \"name\": \"intents\" }").unwrap();
        let sample = read_json::<Sample>(&path).await.unwrap();
        assert_eq!(
            sample,
            Sample {
                name: "intents".to_string()
            }
        );
    }

    #[test]
    fn test_copy_existing_skips_missing() {
        let from = tempfile::tempdir().unwrap();
        let to = tempfile::tempdir().unwrap();

        fs::write(from.path().join("tokenizer.json"), "{}").unwrap();

        let copied = copy_existing(from.path(), to.path(), &["tokenizer.json", "vocab.txt"]).unwrap();

        assert_eq!(copied, vec![to.path().join("tokenizer.json")]);
    }
}
