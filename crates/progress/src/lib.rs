//! Progress Tracking
//!
//! Lesson completion, course navigation and debounced playback reporting.

#![warn(missing_docs)]

pub mod tracker;
pub mod navigation;
pub mod debounce;
pub mod persistence;
pub mod reporter;
pub mod session;
mod state;

pub use tracker::{
    apply_playback, compute_progress_percent, mark_complete, snapshot, Completion,
    ModuleProgress, ProgressSnapshot,
};
pub use navigation::{NavigationController, PlayerHandle, Resume};
pub use debounce::{DebouncedAction, Debouncer};
pub use persistence::{
    Notification, NotificationLevel, Notifier, PersistenceError, ProgressPersistence,
    ProgressUpdate, WriteKind, WriteOutcome, WriteSequencer, WriteTicket,
};
pub use reporter::{PlaybackReporter, PlaybackSample, DEFAULT_REPORT_WINDOW};
pub use session::{
    CompletionOutcome, FetchTicket, LearningSession, PendingWrite, SessionConfig, SessionError,
};
