//! File-backed persistence: one file per key under a data directory.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;

use crate::error::{Error, Result};

use super::LocalPersistence;

/// Durable key-value storage on the local filesystem.
///
/// Writes go through a temp file followed by a rename, so a crash mid-write
/// leaves the previous value intact rather than a truncated file.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    dir: PathBuf,
}

impl FilePersistence {
    /// Create the storage directory if needed and return a handle to it
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        if key.is_empty()
            || !key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(Error::InvalidInput(format!(
                "Invalid persistence key: {key:?}"
            )));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

#[async_trait]
impl LocalPersistence for FilePersistence {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path_for(key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(None),
            Err(error) => Err(Error::Persistence(format!(
                "Failed to read {}: {error}",
                path.display()
            ))),
        }
    }

    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        let path = self.path_for(key)?;
        let tmp_path = self.dir.join(format!("{key}.json.tmp"));
        tokio::fs::write(&tmp_path, value)
            .await
            .map_err(|error| Error::Persistence(format!("Failed to write {key}: {error}")))?;
        tokio::fs::rename(&tmp_path, &path)
            .await
            .map_err(|error| Error::Persistence(format!("Failed to commit {key}: {error}")))?;
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(()),
            Err(error) => Err(Error::Persistence(format!(
                "Failed to remove {key}: {error}"
            ))),
        }
    }
}
