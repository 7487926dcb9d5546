//! Cache trait abstraction.

use async_trait::async_trait;
use chrono::Duration;
use coursetrack_core::{Course, Time};
use serde::{Deserialize, Serialize};

/// Error type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Default freshness window of a cached course.
pub const DEFAULT_TTL_HOURS: i64 = 24;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Key contains characters that cannot be used as a file name
    #[error("Invalid cache key: {0}")]
    InvalidKey(String),
}

/// Cache key for a course slug.
pub fn course_key(slug: &str) -> String {
    format!("course_{}", slug)
}

/// A cached course together with the time it was fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Cached course
    pub course: Course,

    /// When the course was fetched
    pub cached_at: Time,
}

impl CacheEntry {
    /// Wrap a freshly fetched course.
    pub fn new(course: Course) -> Self {
        Self {
            course,
            cached_at: chrono::Utc::now(),
        }
    }

    /// Whether the entry is younger than `ttl` at `now`.
    pub fn is_fresh(&self, now: Time, ttl: Duration) -> bool {
        now.signed_duration_since(self.cached_at) < ttl
    }
}

/// Key-value cache for fetched courses.
///
/// Methods take `&self` so a cache can be shared behind an `Arc` between the
/// loader and other readers.
#[async_trait]
pub trait CourseCache: Send + Sync {
    /// Load an entry.
    async fn load(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Store (overwrite) an entry.
    async fn store(&self, key: &str, entry: &CacheEntry) -> Result<()>;

    /// Remove an entry. Missing keys are not an error.
    async fn evict(&self, key: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_freshness_window() {
        let course: Course = serde_json::from_str(
            r#"{"id": "c1", "slug": "s", "title": "T", "modules": []}"#,
        )
        .unwrap();
        let entry = CacheEntry::new(course);
        let ttl = Duration::hours(DEFAULT_TTL_HOURS);

        assert!(entry.is_fresh(entry.cached_at + Duration::hours(23), ttl));
        assert!(!entry.is_fresh(entry.cached_at + Duration::hours(24), ttl));
    }

    #[test]
    fn test_course_key_format() {
        assert_eq!(course_key("rust-101"), "course_rust-101");
    }
}
