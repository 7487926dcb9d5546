//! Cache-aside course loading.

use std::sync::Arc;
use chrono::Utc;
use coursetrack_core::Course;
use coursetrack_storage::{course_key, CacheEntry, CourseCache};
use tracing::{debug, warn};

use crate::api::ContentFetch;
use crate::error::FetchError;

/// Loads courses through a cache: fresh entries are served locally, stale or
/// missing ones are fetched and written back.
///
/// Cache failures are logged and never fail a load.
pub struct CourseLoader {
    fetch: Arc<dyn ContentFetch>,
    cache: Arc<dyn CourseCache>,
    ttl: chrono::Duration,
}

impl CourseLoader {
    /// Create a loader.
    pub fn new(fetch: Arc<dyn ContentFetch>, cache: Arc<dyn CourseCache>, ttl: chrono::Duration) -> Self {
        Self { fetch, cache, ttl }
    }

    /// Load a course, preferring a fresh cache entry.
    pub async fn load(&self, slug: &str) -> Result<Course, FetchError> {
        let key = course_key(slug);
        match self.cache.load(&key).await {
            Ok(Some(entry)) if entry.is_fresh(Utc::now(), self.ttl) => {
                debug!("Cache hit for {}", key);
                return Ok(entry.course);
            }
            Ok(Some(_)) => debug!("Cache entry {} is stale", key),
            Ok(None) => debug!("Cache miss for {}", key),
            Err(e) => warn!("Failed to read cache entry {}: {}", key, e),
        }
        self.refresh(slug).await
    }

    /// Fetch a course and overwrite its cache entry.
    pub async fn refresh(&self, slug: &str) -> Result<Course, FetchError> {
        let course = self.fetch.fetch_course(slug).await?;
        let key = course_key(slug);
        if let Err(e) = self.cache.store(&key, &CacheEntry::new(course.clone())).await {
            warn!("Failed to cache {}: {}", key, e);
        }
        Ok(course)
    }

    /// Drop the cached copy of a course, e.g. after its progress changed.
    pub async fn invalidate(&self, slug: &str) {
        let key = course_key(slug);
        if let Err(e) = self.cache.evict(&key).await {
            warn!("Failed to evict {}: {}", key, e);
        }
    }
}
