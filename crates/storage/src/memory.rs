//! In-memory cache, used when no cache directory is configured.

use std::collections::HashMap;
use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{CacheEntry, CourseCache, Result};

/// Process-local cache backend.
#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourseCache for MemoryCache {
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.lock().await.get(key).cloned())
    }

    async fn store(&self, key: &str, entry: &CacheEntry) -> Result<()> {
        self.entries
            .lock()
            .await
            .insert(key.to_string(), entry.clone());
        Ok(())
    }

    async fn evict(&self, key: &str) -> Result<()> {
        self.entries.lock().await.remove(key);
        Ok(())
    }
}
