//! Course cache abstraction and implementations for coursetrack.
//!
//! This crate provides a trait-based key-value cache for fetched courses
//! with a JSON-file reference implementation and an in-memory one.

#![warn(missing_docs)]

pub mod trait_;
pub mod json_storage;
pub mod memory;

pub use trait_::{course_key, CacheEntry, CourseCache, StorageError, Result, DEFAULT_TTL_HOURS};
pub use json_storage::JsonCache;
pub use memory::MemoryCache;
