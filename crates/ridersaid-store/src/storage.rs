//! File-based snapshot storage with atomic writes

use std::path::{Path, PathBuf};

use ridersaid_errors::StoreError;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs as async_fs;
use tracing::debug;

/// Single-file JSON storage for store snapshots
#[derive(Debug)]
pub struct FileStorage {
    snapshot_path: PathBuf,
}

fn io_error(path: &Path, err: impl std::fmt::Display) -> StoreError {
    StoreError::snapshot(path.display().to_string(), err.to_string())
}

impl FileStorage {
    /// Create a storage rooted at `snapshot_path`.
    ///
    /// Creates the parent directory if it doesn't exist.
    pub async fn new(snapshot_path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = snapshot_path.parent()
            && !parent.as_os_str().is_empty()
        {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| io_error(parent, e))?;
        }
        Ok(Self {
            snapshot_path: snapshot_path.to_path_buf(),
        })
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Storage for a second file kept next to the snapshot:
    /// `store.json` with `kind = "accounts"` becomes `store.accounts.json`.
    pub async fn companion(&self, kind: &str) -> Result<Self, StoreError> {
        Self::new(&self.snapshot_path.with_extension(format!("{kind}.json"))).await
    }

    /// Write content to a file atomically
    ///
    /// The temp file is renamed over the target, so a failed write leaves
    /// the previous snapshot intact.
    pub async fn write_atomic(&self, path: &Path, content: &str) -> Result<(), StoreError> {
        debug!(path = ?path, "Writing file atomically");

        let temp_path = path.with_extension("tmp");

        async_fs::write(&temp_path, content)
            .await
            .map_err(|e| io_error(&temp_path, e))?;

        async_fs::rename(&temp_path, path)
            .await
            .map_err(|e| io_error(path, e))?;

        debug!(path = ?path, "File written successfully");
        Ok(())
    }

    pub async fn read_to_string(&self, path: &Path) -> Result<String, StoreError> {
        debug!(path = ?path, "Reading file");
        async_fs::read_to_string(path)
            .await
            .map_err(|e| io_error(path, e))
    }

    pub fn exists(&self) -> bool {
        self.snapshot_path.exists()
    }

    /// Load the snapshot. A missing file is `Ok(None)`, not an error.
    pub async fn load<T: DeserializeOwned>(&self) -> Result<Option<T>, StoreError> {
        if !self.exists() {
            debug!(path = ?self.snapshot_path, "Snapshot file not found");
            return Ok(None);
        }
        let json = self.read_to_string(&self.snapshot_path).await?;
        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| StoreError::Corrupt(format!("{}: {e}", self.snapshot_path.display())))
    }

    pub async fn save<T: Serialize>(&self, value: &T) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        self.write_atomic(&self.snapshot_path, &json).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn create_test_storage() -> Result<(FileStorage, TempDir), StoreError> {
        let temp_dir = TempDir::new().map_err(|e| StoreError::unavailable(e.to_string()))?;
        let storage = FileStorage::new(&temp_dir.path().join("data").join("store.json")).await?;
        Ok((storage, temp_dir))
    }

    #[tokio::test]
    async fn test_storage_creates_parent_dir() -> Result<(), StoreError> {
        let (storage, temp_dir) = create_test_storage().await?;
        assert!(temp_dir.path().join("data").is_dir());
        assert!(!storage.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_atomic_write_leaves_no_temp_file() -> Result<(), StoreError> {
        let (storage, temp_dir) = create_test_storage().await?;
        let file_path = temp_dir.path().join("test.json");

        storage.write_atomic(&file_path, r#"{"test": "data"}"#).await?;

        assert!(file_path.exists());
        assert!(!temp_dir.path().join("test.tmp").exists());
        assert_eq!(storage.read_to_string(&file_path).await?, r#"{"test": "data"}"#);
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_snapshot_loads_as_none() -> Result<(), StoreError> {
        let (storage, _temp_dir) = create_test_storage().await?;
        let loaded: Option<Vec<String>> = storage.load().await?;
        assert!(loaded.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_save_then_load() -> Result<(), StoreError> {
        let (storage, _temp_dir) = create_test_storage().await?;
        storage.save(&vec!["a".to_string(), "b".to_string()]).await?;
        let loaded: Option<Vec<String>> = storage.load().await?;
        assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));
        Ok(())
    }

    #[tokio::test]
    async fn test_companion_sits_next_to_snapshot() -> Result<(), StoreError> {
        let (storage, temp_dir) = create_test_storage().await?;
        let accounts = storage.companion("accounts").await?;
        assert_eq!(
            accounts.snapshot_path(),
            temp_dir.path().join("data").join("store.accounts.json")
        );
        accounts.save(&vec!["x".to_string()]).await?;
        assert!(!storage.exists());
        assert!(accounts.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_snapshot_is_reported() -> Result<(), StoreError> {
        let (storage, _temp_dir) = create_test_storage().await?;
        storage
            .write_atomic(storage.snapshot_path(), "{ not json")
            .await?;
        let loaded: Result<Option<Vec<String>>, _> = storage.load().await;
        assert!(matches!(loaded, Err(StoreError::Corrupt(_))));
        Ok(())
    }
}
