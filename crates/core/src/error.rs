//! Core error type.

use crate::id::LessonId;

/// Result alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;

/// Validation failures on the course tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoreError {
    /// Position does not address an existing lesson
    #[error("position out of range: module {module_index}, lesson {lesson_index}")]
    OutOfRange {
        /// Requested module index
        module_index: usize,
        /// Requested lesson index
        lesson_index: usize,
    },

    /// No lesson with this id in the course
    #[error("lesson not found: {0}")]
    LessonNotFound(LessonId),

    /// Course has no lessons at all
    #[error("course has no lessons")]
    NoLessons,
}
