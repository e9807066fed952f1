//! Local filesystem storage implementation.
//!
//! Snapshots are written as pretty-printed UTF-8 JSON, atomically
//! (temp file + rename), so an interrupted write never leaves a truncated
//! `last_check.json` behind.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::{Snapshot, StorageConfig, WebData};
use crate::storage::SnapshotStore;

/// Local filesystem storage backend.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    snapshot_key: String,
    web_data_key: String,
}

impl LocalStorage {
    /// Create a new LocalStorage rooted at the given directory with default file names.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self::with_config(root_dir, &StorageConfig::default())
    }

    /// Create a LocalStorage using configured file names.
    pub fn with_config(root_dir: impl Into<PathBuf>, config: &StorageConfig) -> Self {
        Self {
            root_dir: root_dir.into(),
            snapshot_key: config.snapshot_file.clone(),
            web_data_key: config.web_data_file.clone(),
        }
    }

    /// Override where the website export is written. Relative keys resolve
    /// under the storage directory.
    pub fn with_web_data_key(mut self, key: impl Into<String>) -> Self {
        self.web_data_key = key.into();
        self
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    /// Full path of the snapshot file.
    pub fn snapshot_path(&self) -> PathBuf {
        self.path(&self.snapshot_key)
    }

    /// Full path of the website export.
    pub fn web_data_path(&self) -> PathBuf {
        self.path(&self.web_data_key)
    }

    /// Get the full path for a key. Absolute keys are used as-is.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        self.ensure_dir(&path).await?;

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    /// Write JSON data.
    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read bytes, returning None if file doesn't exist.
    async fn read_bytes(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let path = self.path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Read JSON data.
    async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.read_bytes(key).await? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Load the last website export, if any.
    pub async fn load_web_data(&self) -> Result<Option<WebData>> {
        self.read_json(&self.web_data_key).await
    }
}

#[async_trait]
impl SnapshotStore for LocalStorage {
    async fn load(&self) -> Result<Snapshot> {
        match self.read_json::<Snapshot>(&self.snapshot_key).await? {
            Some(snapshot) => Ok(snapshot),
            None => {
                log::info!("No {} found, starting from an empty snapshot", self.snapshot_key);
                Ok(Snapshot::new())
            }
        }
    }

    async fn save(&self, snapshot: &Snapshot) -> Result<()> {
        self.write_json(&self.snapshot_key, snapshot).await?;
        log::info!(
            "Snapshot: {} districts, {} spots written to {}",
            snapshot.district_count(),
            snapshot.spot_count(),
            self.snapshot_key
        );
        Ok(())
    }

    async fn publish(&self, data: &WebData) -> Result<()> {
        self.write_json(&self.web_data_key, data).await?;
        log::info!(
            "Website data: {} districts written to {}",
            data.spots.district_count(),
            self.web_data_key
        );
        Ok(())
    }
}
