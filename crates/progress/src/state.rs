//! State shared between the session and its background writers.

use std::sync::Arc;
use coursetrack_core::Course;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::navigation::{NavigationController, Resume};
use crate::persistence::{
    Notification, Notifier, ProgressPersistence, ProgressUpdate, WriteOutcome, WriteSequencer,
    WriteTicket,
};

/// Mutable session state. Guarded by `Shared::state`; never held across a
/// collaborator call.
#[derive(Default)]
pub(crate) struct SessionState {
    /// Loaded course, replaced as a whole on every change
    pub course: Option<Arc<Course>>,
    pub navigator: NavigationController,
    pub resume: Resume,
    /// Generation of the newest fetch that was started
    pub fetch_generation: u64,
    pub writes: WriteSequencer,
}

pub(crate) struct Shared {
    pub state: Mutex<SessionState>,
    persistence: Arc<dyn ProgressPersistence>,
    notifier: Arc<dyn Notifier>,
}

impl Shared {
    pub fn new(
        state: SessionState,
        persistence: Arc<dyn ProgressPersistence>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            state: Mutex::new(state),
            persistence,
            notifier,
        }
    }

    /// Send a write and classify its response.
    ///
    /// Local state is never rolled back; only the newest write of a lesson
    /// may notify the user.
    pub async fn persist(&self, ticket: WriteTicket, update: ProgressUpdate) -> WriteOutcome {
        let result = self.persistence.save_progress(&update).await;
        let latest = self.state.lock().await.writes.is_latest(&ticket);

        match result {
            Ok(()) if latest => {
                debug!(
                    "Saved {} write #{} for lesson {}",
                    ticket.kind, ticket.generation, ticket.lesson_id
                );
                WriteOutcome::Confirmed
            }
            Ok(()) => {
                debug!(
                    "Discarding response of superseded {} write #{} for lesson {}",
                    ticket.kind, ticket.generation, ticket.lesson_id
                );
                WriteOutcome::Superseded
            }
            Err(e) if !latest => {
                warn!(
                    "Superseded {} write #{} for lesson {} failed: {}",
                    ticket.kind, ticket.generation, ticket.lesson_id, e
                );
                WriteOutcome::Superseded
            }
            Err(e) => {
                warn!(
                    "{} write #{} for lesson {} failed: {}",
                    ticket.kind, ticket.generation, ticket.lesson_id, e
                );
                self.notifier
                    .notify(Notification::error("Could not save progress", e.to_string()));
                WriteOutcome::Failed(e.to_string())
            }
        }
    }
}
