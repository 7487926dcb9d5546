//! Position pointer into the course tree.

use serde::{Deserialize, Serialize};

/// Identifies the current lesson by module and lesson index.
///
/// A position is only meaningful against the course it was validated
/// against; see `Course::validate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    /// Index into `Course::modules`
    pub module_index: usize,

    /// Index into `Module::lessons`
    pub lesson_index: usize,
}

impl Position {
    /// Create a position.
    pub const fn new(module_index: usize, lesson_index: usize) -> Self {
        Self { module_index, lesson_index }
    }

    /// First lesson of the first module.
    pub const fn origin() -> Self {
        Self::new(0, 0)
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.module_index + 1, self.lesson_index + 1)
    }
}
