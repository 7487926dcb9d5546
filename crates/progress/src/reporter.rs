//! Debounced playback-position reporting.

use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use coursetrack_core::{CourseId, LessonId};
use tracing::debug;

use crate::debounce::{DebouncedAction, Debouncer};
use crate::persistence::{ProgressUpdate, WriteKind};
use crate::state::Shared;
use crate::tracker;

/// Default quiet period between the last playback event and the report.
pub const DEFAULT_REPORT_WINDOW: Duration = Duration::from_secs(15);

/// A raw playback-time event from the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackSample {
    /// Course the lesson belongs to
    pub course_id: CourseId,
    /// Lesson being played
    pub lesson_id: LessonId,
    /// Playback position in seconds
    pub seconds: u64,
}

/// Coalesces playback events and reports the last one of every burst.
pub struct PlaybackReporter {
    debouncer: Debouncer<PlaybackSample>,
}

impl PlaybackReporter {
    /// Spawn a reporter that runs `action` for each debounced sample.
    pub fn spawn<A: DebouncedAction<PlaybackSample>>(window: Duration, action: A) -> Self {
        Self {
            debouncer: Debouncer::spawn(window, action),
        }
    }

    pub(crate) fn for_session(window: Duration, shared: Arc<Shared>) -> Self {
        Self::spawn(window, ReportSink { shared })
    }

    /// Record a playback event.
    pub fn record(&self, sample: PlaybackSample) {
        self.debouncer.push(sample);
    }

    /// Report the pending sample now and wait for the write.
    pub async fn flush(&self) {
        self.debouncer.flush().await;
    }

    /// Drop the pending sample.
    pub fn cancel(&self) {
        self.debouncer.cancel();
    }
}

/// Applies a sample to the session's course and persists it.
struct ReportSink {
    shared: Arc<Shared>,
}

#[async_trait]
impl DebouncedAction<PlaybackSample> for ReportSink {
    async fn fire(&self, sample: PlaybackSample) {
        let (ticket, update) = {
            let mut state = self.shared.state.lock().await;
            let Some(course) = state.course.clone() else {
                debug!("No course loaded, dropping playback report for {}", sample.lesson_id);
                return;
            };
            if course.id != sample.course_id {
                debug!("Course changed, dropping playback report for {}", sample.lesson_id);
                return;
            }
            let Some(updated) = tracker::apply_playback(&course, &sample.lesson_id, sample.seconds)
            else {
                debug!("Lesson {} no longer in course, dropping playback report", sample.lesson_id);
                return;
            };
            let Some(lesson) = updated.lesson(&sample.lesson_id) else {
                return;
            };

            let update = ProgressUpdate::snapshot(&updated.id, lesson);
            let ticket = state.writes.issue(&sample.lesson_id, WriteKind::Playback);
            state.course = Some(Arc::new(updated));
            (ticket, update)
        };

        self.shared.persist(ticket, update).await;
    }
}
