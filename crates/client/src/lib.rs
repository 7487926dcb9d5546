//! Backend collaborators for coursetrack.
//!
//! HTTP implementations of course content fetching, progress persistence and
//! lesson notes, plus the cache-aside course loader.

#![warn(missing_docs)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod loader;
pub mod notes;

pub use api::{ContentFetch, HttpCourseApi};
pub use auth::{AuthProvider, StaticToken};
pub use config::ClientConfig;
pub use error::{FetchError, FetchErrorKind, Redirect};
pub use loader::CourseLoader;
pub use notes::{Note, NoteDraft};
