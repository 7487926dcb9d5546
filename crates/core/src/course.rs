//! Course model - the course → module → lesson tree fetched from the backend.

use serde::{Deserialize, Serialize};
use crate::id::{CourseId, LessonId, ModuleId};
use crate::Time;

/// A course as returned by the content endpoint.
///
/// Modules and lessons keep their insertion order, which is also the display
/// and navigation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    /// Unique identifier
    pub id: CourseId,

    /// URL slug
    pub slug: String,

    /// Course title
    pub title: String,

    /// Ordered modules
    #[serde(default)]
    pub modules: Vec<Module>,
}

/// An ordered group of lessons within a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    /// Unique identifier
    pub id: ModuleId,

    /// Module title
    pub title: String,

    /// Ordered lessons
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// Smallest content unit of a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    /// Unique identifier
    pub id: LessonId,

    /// Lesson title
    pub title: String,

    /// Kind of content
    #[serde(rename = "type")]
    pub kind: LessonType,

    /// Media or content reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_url: Option<String>,

    /// Duration in seconds, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<u64>,

    /// Progress of the current user
    #[serde(default, with = "progress_slot")]
    pub progress: Progress,
}

impl Lesson {
    /// Whether the lesson has a playback timeline worth reporting.
    pub fn is_playable(&self) -> bool {
        matches!(self.kind, LessonType::Video | LessonType::Live)
    }
}

/// Lesson content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LessonType {
    /// Recorded video
    Video,
    /// Text article
    Text,
    /// Quiz
    Quiz,
    /// Graded assignment
    Assignment,
    /// Live session
    Live,
}

impl LessonType {
    /// Upper-case tag used on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonType::Video => "VIDEO",
            LessonType::Text => "TEXT",
            LessonType::Quiz => "QUIZ",
            LessonType::Assignment => "ASSIGNMENT",
            LessonType::Live => "LIVE",
        }
    }
}

/// Per-lesson completion and watch state of the current user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Progress {
    /// Whether the lesson is completed
    pub completed: bool,

    /// Seconds watched
    pub watched_seconds: u64,

    /// Last playback position in seconds
    pub last_position: u64,

    /// When the lesson was completed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<Time>,
}

impl Progress {
    /// Mark completed. Returns false when it already was.
    pub fn mark_completed(&mut self, at: Time) -> bool {
        if self.completed {
            return false;
        }
        self.completed = true;
        self.completed_at = Some(at);
        true
    }

    /// Overwrite the watch state with a reported playback position.
    ///
    /// Rewinds are applied as-is; only the upper bound of a known duration
    /// is enforced on `last_position`.
    pub fn record_playback(&mut self, seconds: u64, duration: Option<u64>) {
        let position = match duration {
            Some(total) => seconds.min(total),
            None => seconds,
        };
        self.watched_seconds = seconds;
        self.last_position = position;
    }
}

/// The backend sends progress as an array holding at most one element for
/// the requesting user.
mod progress_slot {
    use super::Progress;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(progress: &Progress, serializer: S) -> Result<S::Ok, S::Error> {
        std::slice::from_ref(progress).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Progress, D::Error> {
        let slots = Option::<Vec<Progress>>::deserialize(deserializer)?;
        Ok(slots.and_then(|s| s.into_iter().next()).unwrap_or_default())
    }
}
