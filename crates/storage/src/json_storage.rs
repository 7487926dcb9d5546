//! JSON file cache implementation.
//!
//! Stores each entry as `<key>.json` in a single directory.

use std::path::{Path, PathBuf};
use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{CacheEntry, CourseCache, Result, StorageError};

/// File-based JSON cache backend.
pub struct JsonCache {
    root: PathBuf,
}

impl JsonCache {
    /// Create the cache, creating `root` if needed.
    pub async fn new(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(format!("{}.json", key)))
    }
}

#[async_trait]
impl CourseCache for JsonCache {
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        read_json(&self.entry_path(key)?).await
    }

    async fn store(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        let path = self.entry_path(key)?;
        let json = serde_json::to_string_pretty(entry)?;
        // Write to a sibling file first so readers never see a torn entry.
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json.as_bytes()).await?;
        fs::rename(&tmp, &path).await?;
        debug!("Cached {} at {}", key, path.display());
        Ok(())
    }

    async fn evict(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.entry_path(key)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

async fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    match fs::read_to_string(path).await {
        Ok(json) => {
            let value = serde_json::from_str(&json)?;
            Ok(Some(value))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}
