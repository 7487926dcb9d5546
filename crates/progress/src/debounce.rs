//! Trailing-edge debounce.
//!
//! A `Debouncer` owns a background task holding at most one pending value.
//! Every `push` replaces the pending value and restarts the quiet-period
//! timer; the action fires with the last value once the timer runs out.

use std::time::Duration;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, warn};

/// Action run with the last value of a burst.
#[async_trait]
pub trait DebouncedAction<T: Send + 'static>: Send + Sync + 'static {
    /// Handle the debounced value.
    async fn fire(&self, value: T);
}

enum Command<T> {
    Push(T, Instant),
    Flush(oneshot::Sender<()>),
    Cancel,
}

/// Handle to a debounce task. Dropping it cancels any pending value.
pub struct Debouncer<T> {
    tx: mpsc::UnboundedSender<Command<T>>,
    handle: JoinHandle<()>,
    window: Duration,
}

impl<T: Send + 'static> Debouncer<T> {
    /// Spawn the debounce task on the current runtime.
    pub fn spawn<A: DebouncedAction<T>>(window: Duration, action: A) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run(window, rx, action));
        Self { tx, handle, window }
    }

    /// Quiet period before the action fires.
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replace the pending value and restart the timer.
    pub fn push(&self, value: T) {
        if self.tx.send(Command::Push(value, Instant::now())).is_err() {
            warn!("Debounce task is gone, dropping value");
        }
    }

    /// Fire the pending value now, if any, and wait for the action to finish.
    pub async fn flush(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Flush(ack)).is_ok() {
            let _ = done.await;
        }
    }

    /// Drop the pending value without firing.
    pub fn cancel(&self) {
        let _ = self.tx.send(Command::Cancel);
    }
}

impl<T> Drop for Debouncer<T> {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run<T, A>(window: Duration, mut rx: mpsc::UnboundedReceiver<Command<T>>, action: A)
where
    T: Send + 'static,
    A: DebouncedAction<T>,
{
    let mut pending: Option<(T, Instant)> = None;

    loop {
        let deadline = pending.as_ref().map(|(_, deadline)| *deadline);
        let command = match deadline {
            Some(deadline) => {
                tokio::select! {
                    command = rx.recv() => command,
                    _ = sleep_until(deadline) => {
                        if let Some((value, _)) = pending.take() {
                            action.fire(value).await;
                        }
                        continue;
                    }
                }
            }
            None => rx.recv().await,
        };

        match command {
            Some(Command::Push(value, at)) => {
                pending = Some((value, at + window));
            }
            Some(Command::Flush(ack)) => {
                if let Some((value, _)) = pending.take() {
                    action.fire(value).await;
                }
                let _ = ack.send(());
            }
            Some(Command::Cancel) => {
                if pending.take().is_some() {
                    debug!("Pending debounced value cancelled");
                }
            }
            None => break,
        }
    }
}
