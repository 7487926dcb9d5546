//! Lesson notes.

use coursetrack_core::{CourseId, LessonId, NoteId, Time};
use serde::{Deserialize, Serialize};

/// A note a learner attached to a lesson.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    /// Unique identifier
    pub id: NoteId,

    /// Course the note belongs to
    pub course_id: CourseId,

    /// Lesson the note belongs to
    pub lesson_id: LessonId,

    /// Note text
    pub content: String,

    /// Playback position the note refers to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,

    /// When created
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Time>,
}

/// A note to be created.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    /// Course the note belongs to
    pub course_id: CourseId,

    /// Lesson the note belongs to
    pub lesson_id: LessonId,

    /// Note text
    pub content: String,

    /// Playback position the note refers to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}
