//! Collaborator interfaces the progress layer writes through.

use std::collections::HashMap;
use async_trait::async_trait;
use coursetrack_core::{CourseId, Lesson, LessonId};
use serde::{Deserialize, Serialize};

/// Body of a progress write.
///
/// Writes built by the session always carry the full progress of the lesson,
/// so the most recent write for a lesson supersedes all earlier ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    /// Course id
    pub course_id: CourseId,

    /// Lesson id
    pub lesson_id: LessonId,

    /// Completion flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,

    /// Seconds watched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub watched_seconds: Option<u64>,

    /// Last playback position
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_position: Option<u64>,
}

impl ProgressUpdate {
    /// Full progress snapshot of `lesson`.
    pub fn snapshot(course_id: &CourseId, lesson: &Lesson) -> Self {
        Self {
            course_id: course_id.clone(),
            lesson_id: lesson.id.clone(),
            completed: Some(lesson.progress.completed),
            watched_seconds: Some(lesson.progress.watched_seconds),
            last_position: Some(lesson.progress.last_position),
        }
    }
}

/// Errors returned by a persistence collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PersistenceError {
    /// Backend answered with a non-success status
    #[error("progress write rejected (status {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Error message from the response envelope
        message: String,
    },

    /// Request never produced a response
    #[error("progress write failed: {0}")]
    Transport(String),

    /// No credentials available for the write
    #[error("not signed in: {0}")]
    Unauthorized(String),
}

/// Remote store of lesson progress.
#[async_trait]
pub trait ProgressPersistence: Send + Sync {
    /// Persist a progress update.
    async fn save_progress(&self, update: &ProgressUpdate) -> Result<(), PersistenceError>;
}

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Informational
    Info,
    /// Something failed
    Error,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Severity
    pub level: NotificationLevel,
    /// Short title
    pub title: String,
    /// Detail message
    pub message: String,
}

impl Notification {
    /// Error notification.
    pub fn error(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            title: title.into(),
            message: message.into(),
        }
    }

    /// Info notification.
    pub fn info(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Info,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Surface for user-visible notifications (toasts, status lines).
pub trait Notifier: Send + Sync {
    /// Show a notification.
    fn notify(&self, notification: Notification);
}

/// What became of a persistence request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    /// Backend confirmed the write
    Confirmed,
    /// Write failed; local state was kept
    Failed(String),
    /// A newer write for the same lesson was issued before this one resolved
    Superseded,
}

/// Kind of write, kept for logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteKind {
    /// Completion of a lesson
    Completion,
    /// Debounced playback report
    Playback,
}

impl std::fmt::Display for WriteKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteKind::Completion => write!(f, "completion"),
            WriteKind::Playback => write!(f, "playback"),
        }
    }
}

/// Identifies one issued write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteTicket {
    /// Lesson written
    pub lesson_id: LessonId,
    /// Generation within the lesson
    pub generation: u64,
    /// Kind of write
    pub kind: WriteKind,
}

/// Monotonic per-lesson write generations.
///
/// Completion and playback writes share one counter per lesson, so a race
/// between the two is resolved in issue order.
#[derive(Debug, Default)]
pub struct WriteSequencer {
    latest: HashMap<LessonId, u64>,
}

impl WriteSequencer {
    /// Issue the next generation for `lesson_id`.
    pub fn issue(&mut self, lesson_id: &LessonId, kind: WriteKind) -> WriteTicket {
        let generation = self.latest.entry(lesson_id.clone()).or_insert(0);
        *generation += 1;
        WriteTicket {
            lesson_id: lesson_id.clone(),
            generation: *generation,
            kind,
        }
    }

    /// Whether `ticket` is still the newest write for its lesson.
    pub fn is_latest(&self, ticket: &WriteTicket) -> bool {
        self.latest.get(&ticket.lesson_id).copied() == Some(ticket.generation)
    }
}
