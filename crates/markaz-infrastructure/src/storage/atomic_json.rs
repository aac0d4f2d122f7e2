//! Atomic JSON file operations.
//!
//! Writes go to a sibling temp file which is flushed and renamed over the
//! target, so a reader never observes a half-written document.

use std::marker::PhantomData;
use std::path::PathBuf;

use markaz_core::{MarkazError, Result};
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

/// A handle to a JSON file holding one `T`.
#[derive(Debug, Clone)]
pub struct AtomicJsonFile<T> {
    path: PathBuf,
    _phantom: PhantomData<T>,
}

impl<T> AtomicJsonFile<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            _phantom: PhantomData,
        }
    }

    /// Loads and deserializes the file.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(T))`: Successfully loaded and deserialized
    /// - `Ok(None)`: File doesn't exist or is empty
    /// - `Err`: Failed to read or parse the file
    pub async fn load(&self) -> Result<Option<T>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        let data = serde_json::from_str(&content).map_err(|e| MarkazError::Serialization {
            format: "JSON".to_string(),
            message: format!("{}: {}", self.path.display(), e),
        })?;
        Ok(Some(data))
    }

    /// Saves data atomically (temp file, fsync, rename).
    pub async fn save(&self, data: &T) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(data)?;
        let tmp_path = self.path.with_extension("json.tmp");

        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        name: String,
        count: u32,
    }

    #[tokio::test]
    async fn test_missing_file_loads_none() {
        let temp_dir = TempDir::new().unwrap();
        let file: AtomicJsonFile<Sample> = AtomicJsonFile::new(temp_dir.path().join("a.json"));
        assert!(file.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_creates_parent_and_leaves_no_temp_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("a.json");
        let file = AtomicJsonFile::new(path.clone());

        let sample = Sample {
            name: "sun".to_string(),
            count: 2,
        };
        file.save(&sample).await.unwrap();

        assert_eq!(file.load().await.unwrap(), Some(sample));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.json");
        std::fs::write(&path, "{not json").unwrap();

        let file: AtomicJsonFile<Sample> = AtomicJsonFile::new(path);
        let err = file.load().await.unwrap_err();
        assert!(matches!(err, MarkazError::Serialization { .. }));
    }
}
