//! coursetrack core data models.
//!
//! This crate defines the course tree (course → modules → lessons), the
//! per-lesson progress record and the position pointer used to walk it.

#![warn(missing_docs)]

// Core identities
mod id;

// Course tree
mod course;
mod position;
mod tree;

mod error;

// Re-exports
pub use id::*;

pub use course::{Course, Lesson, LessonType, Module, Progress};
pub use position::Position;
pub use error::{CoreError, Result};

/// Timestamp type
pub type Time = chrono::DateTime<chrono::Utc>;
