//! The worker thread and the handle the UI thread talks to it through.
//!
//! Messages are processed strictly in the order they were posted, one at a time, so
//! two saves can never interleave and the last one posted is the one left on disk.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use crate::domain::error::{LauncherError, Result};
use crate::worker::handler::LauncherWorker;
use crate::worker::messages::{WorkerMessage, WorkerResponse};

/// The UI thread's end of the worker.
///
/// Posting never blocks. Responses queue up until the host collects them with
/// [`try_recv`](Self::try_recv) or [`recv_timeout`](Self::recv_timeout). Dropping
/// the handle stops the thread once the queue is drained.
pub struct WorkerHandle {
    sender: Sender<WorkerMessage>,
    responses: Receiver<WorkerResponse>,
    thread: Option<JoinHandle<()>>,
}

/// Starts `worker` on a dedicated thread named `launcher-worker`.
///
/// The thread runs until it receives [`WorkerMessage::Shutdown`] or the handle is
/// dropped.
///
/// # Parameters
///
/// * `worker` - Message handler owning the storage backend
///
/// # Returns
///
/// A [`WorkerHandle`] for posting messages and collecting responses.
///
/// # Errors
///
/// Returns an error if the OS refuses to create the thread.
pub fn spawn(mut worker: LauncherWorker) -> Result<WorkerHandle> {
    let (sender, inbox) = mpsc::channel::<WorkerMessage>();
    let (outbox, responses) = mpsc::channel::<WorkerResponse>();

    let thread = std::thread::Builder::new()
        .name("launcher-worker".to_string())
        .spawn(move || {
            tracing::debug!("worker thread started");
            for message in inbox {
                let Some(response) = worker.handle_message(message) else {
                    break;
                };
                if outbox.send(response).is_err() {
                    tracing::debug!("response receiver dropped, stopping worker");
                    break;
                }
            }
            tracing::debug!("worker thread stopped");
        })?;

    Ok(WorkerHandle {
        sender,
        responses,
        thread: Some(thread),
    })
}

impl WorkerHandle {
    /// Queues a message for the worker.
    ///
    /// # Parameters
    ///
    /// * `message` - Built with one of the [`WorkerMessage`] constructors, which
    ///   capture the current trace context
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Worker`] if the worker thread has exited.
    pub fn post(&self, message: WorkerMessage) -> Result<()> {
        self.sender
            .send(message)
            .map_err(|_| LauncherError::Worker("worker thread is not running".to_string()))
    }

    /// Returns the next response if one is ready.
    #[must_use]
    pub fn try_recv(&self) -> Option<WorkerResponse> {
        self.responses.try_recv().ok()
    }

    /// Waits up to `timeout` for the next response.
    #[must_use]
    pub fn recv_timeout(&self, timeout: Duration) -> Option<WorkerResponse> {
        self.responses.recv_timeout(timeout).ok()
    }

    /// Stops the worker after it has drained everything already queued.
    ///
    /// # Errors
    ///
    /// Returns [`LauncherError::Worker`] if the worker thread panicked.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    fn stop(&mut self) -> Result<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        // a send error means the thread is already gone; join still reports panics
        let _ = self.sender.send(WorkerMessage::Shutdown);
        thread
            .join()
            .map_err(|_| LauncherError::Worker("worker thread panicked".to_string()))
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            tracing::error!(error = %e, "failed to stop worker");
        }
    }
}
