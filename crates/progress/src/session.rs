//! Learning session: the course being studied, the current position and the
//! writes that keep the backend in sync.
//!
//! All local updates are applied immediately (optimistic) by replacing the
//! course value; persistence runs in the background and never rolls local
//! state back.

use std::sync::Arc;
use std::time::Duration;
use coursetrack_core::{CoreError, Course, Lesson, LessonId, Position};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::navigation::{PlayerHandle, Resume};
use crate::persistence::{
    Notifier, ProgressPersistence, ProgressUpdate, WriteKind, WriteOutcome, WriteTicket,
};
use crate::reporter::{PlaybackReporter, PlaybackSample, DEFAULT_REPORT_WINDOW};
use crate::state::{SessionState, Shared};
use crate::tracker::{self, ProgressSnapshot};

/// Configuration for a learning session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Quiet period of the playback reporter
    pub debounce_window: Duration,
    /// Where to start when a course is loaded
    pub resume: Resume,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            debounce_window: DEFAULT_REPORT_WINDOW,
            resume: Resume::Start,
        }
    }
}

/// Errors returned by session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// No course has been applied yet
    #[error("no course loaded")]
    NotLoaded,

    /// Playback reported for a lesson without a timeline (text, quiz, ...)
    #[error("lesson {0} has no playback")]
    NotPlayable(LessonId),

    /// Tree validation failed
    #[error(transparent)]
    Core(#[from] CoreError),
}

/// Token identifying one course fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

/// A persistence request running in the background.
pub struct PendingWrite {
    ticket: WriteTicket,
    handle: JoinHandle<WriteOutcome>,
}

impl PendingWrite {
    /// Ticket of the write.
    pub fn ticket(&self) -> &WriteTicket {
        &self.ticket
    }

    /// Wait for the write to resolve.
    pub async fn outcome(self) -> WriteOutcome {
        match self.handle.await {
            Ok(outcome) => outcome,
            Err(e) => WriteOutcome::Failed(e.to_string()),
        }
    }
}

/// Result of `LearningSession::mark_complete`.
pub struct CompletionOutcome {
    /// Course percentage after the call
    pub percent: f32,
    /// Whether the lesson was newly completed
    pub changed: bool,
    /// Position reached by the automatic advance, if any
    pub advanced_to: Option<Position>,
    /// Completion write, `None` when nothing changed
    pub write: Option<PendingWrite>,
}

/// A learner working through one course.
pub struct LearningSession {
    shared: Arc<Shared>,
    reporter: PlaybackReporter,
}

impl LearningSession {
    /// Create a session. Must be called inside a tokio runtime.
    pub fn new(
        persistence: Arc<dyn ProgressPersistence>,
        notifier: Arc<dyn Notifier>,
        config: SessionConfig,
    ) -> Self {
        let state = SessionState {
            resume: config.resume,
            ..SessionState::default()
        };
        let shared = Arc::new(Shared::new(state, persistence, notifier));
        let reporter = PlaybackReporter::for_session(config.debounce_window, Arc::clone(&shared));
        Self { shared, reporter }
    }

    /// Attach (or detach) the player receiving transition resets.
    pub async fn set_player(&self, player: Option<Arc<dyn PlayerHandle>>) {
        self.shared.state.lock().await.navigator.set_player(player);
    }

    /// Start a fetch. Only the newest ticket may apply its result.
    pub async fn begin_fetch(&self) -> FetchTicket {
        let mut state = self.shared.state.lock().await;
        state.fetch_generation += 1;
        FetchTicket {
            generation: state.fetch_generation,
        }
    }

    /// Replace the course with a fetched one.
    ///
    /// Returns `false` and leaves the session untouched when a newer fetch
    /// was started after `ticket`.
    pub async fn apply_fetch(&self, ticket: FetchTicket, course: Course) -> bool {
        let mut state = self.shared.state.lock().await;
        if ticket.generation != state.fetch_generation {
            debug!(
                "Discarding stale fetch #{} (latest #{})",
                ticket.generation, state.fetch_generation
            );
            return false;
        }

        let resume = state.resume;
        let position = state.navigator.reset_for(&course, resume);
        info!(
            "Loaded course {} ({} lessons), position {:?}",
            course.slug,
            course.total_lessons(),
            position.map(|p| p.to_string())
        );
        state.course = Some(Arc::new(course));
        true
    }

    /// Current course.
    pub async fn course(&self) -> Option<Arc<Course>> {
        self.shared.state.lock().await.course.clone()
    }

    /// Current position.
    pub async fn position(&self) -> Option<Position> {
        self.shared.state.lock().await.navigator.position()
    }

    /// Lesson at the current position.
    pub async fn current_lesson(&self) -> Option<Lesson> {
        let state = self.shared.state.lock().await;
        let course = state.course.as_ref()?;
        course.lesson_at(state.navigator.position()?).cloned()
    }

    /// Completion percentage of the current course, 0 when none is loaded.
    pub async fn progress_percent(&self) -> f32 {
        self.course()
            .await
            .map_or(0.0, |c| tracker::compute_progress_percent(&c))
    }

    /// Progress snapshot of the current course.
    pub async fn snapshot(&self) -> Option<ProgressSnapshot> {
        self.course().await.map(|c| tracker::snapshot(&c))
    }

    /// Move to the next lesson. `Ok(None)` when already at the last lesson.
    pub async fn next(&self) -> Result<Option<Position>, SessionError> {
        self.reporter.flush().await;
        let mut state = self.shared.state.lock().await;
        let course = state.course.clone().ok_or(SessionError::NotLoaded)?;
        Ok(state.navigator.next(&course))
    }

    /// Move to the previous lesson. `Ok(None)` when already at the first.
    pub async fn previous(&self) -> Result<Option<Position>, SessionError> {
        self.reporter.flush().await;
        let mut state = self.shared.state.lock().await;
        let course = state.course.clone().ok_or(SessionError::NotLoaded)?;
        Ok(state.navigator.previous(&course))
    }

    /// Jump to a lesson by indices.
    ///
    /// # Errors
    ///
    /// `SessionError::Core(CoreError::OutOfRange)` when the indices do not
    /// address a lesson; the position is unchanged.
    pub async fn jump_to(
        &self,
        module_index: usize,
        lesson_index: usize,
    ) -> Result<Position, SessionError> {
        self.reporter.flush().await;
        let mut state = self.shared.state.lock().await;
        let course = state.course.clone().ok_or(SessionError::NotLoaded)?;
        Ok(state.navigator.jump_to(&course, module_index, lesson_index)?)
    }

    /// Complete the current lesson and advance to the next one.
    ///
    /// Completing an already completed lesson changes nothing and sends no
    /// write. Otherwise the course is updated locally, the position advances
    /// once (unless at the last lesson) and the write is started in the
    /// background.
    pub async fn mark_complete(&self) -> Result<CompletionOutcome, SessionError> {
        self.reporter.flush().await;

        let (percent, advanced_to, ticket, update) = {
            let mut state = self.shared.state.lock().await;
            let course = state.course.clone().ok_or(SessionError::NotLoaded)?;
            let position = state.navigator.position().ok_or(CoreError::NoLessons)?;

            let completion = tracker::mark_complete(&course, position)?;
            if !completion.changed {
                debug!("Lesson at {} already completed", position);
                return Ok(CompletionOutcome {
                    percent: completion.percent,
                    changed: false,
                    advanced_to: None,
                    write: None,
                });
            }

            let updated = completion.course;
            let lesson = updated
                .lesson_at(position)
                .ok_or(CoreError::OutOfRange {
                    module_index: position.module_index,
                    lesson_index: position.lesson_index,
                })?;
            let update = ProgressUpdate::snapshot(&updated.id, lesson);
            let ticket = state.writes.issue(&lesson.id, WriteKind::Completion);

            let advanced_to = if state.navigator.is_terminal(&updated) {
                None
            } else {
                state.navigator.next(&updated)
            };
            state.course = Some(updated);
            (completion.percent, advanced_to, ticket, update)
        };

        info!(
            "Completed lesson {}, course at {:.1}%",
            ticket.lesson_id, percent
        );

        let shared = Arc::clone(&self.shared);
        let write_ticket = ticket.clone();
        let handle = tokio::spawn(async move { shared.persist(write_ticket, update).await });

        Ok(CompletionOutcome {
            percent,
            changed: true,
            advanced_to,
            write: Some(PendingWrite { ticket, handle }),
        })
    }

    /// Feed a playback-time event for the current lesson.
    ///
    /// # Errors
    ///
    /// `SessionError::NotPlayable` when the current lesson is not a video or
    /// live session.
    pub async fn record_playback(&self, seconds: u64) -> Result<(), SessionError> {
        let sample = {
            let state = self.shared.state.lock().await;
            let course = state.course.as_ref().ok_or(SessionError::NotLoaded)?;
            let position = state.navigator.position().ok_or(CoreError::NoLessons)?;
            let lesson = course.lesson_at(position).ok_or(CoreError::NoLessons)?;
            if !lesson.is_playable() {
                return Err(SessionError::NotPlayable(lesson.id.clone()));
            }
            PlaybackSample {
                course_id: course.id.clone(),
                lesson_id: lesson.id.clone(),
                seconds,
            }
        };
        self.reporter.record(sample);
        Ok(())
    }

    /// Report pending playback now.
    pub async fn flush_playback(&self) {
        self.reporter.flush().await;
    }

    /// Tear the session down, flushing pending playback first.
    pub async fn close(self) {
        self.reporter.flush().await;
        let mut state = self.shared.state.lock().await;
        state.course = None;
        state.navigator.clear();
        debug!("Learning session closed");
    }
}
