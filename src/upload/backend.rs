// src/upload/backend.rs

//! Pluggable upload backend abstraction.
//!
//! The runtime talks to an `UploadBackend` instead of a concrete upload
//! engine. This makes it easy to swap in a fake backend in tests.
//!
//! - `ChannelUploadBackend` forwards tasks over an mpsc channel to whatever
//!   engine the embedding application runs. That engine reports completion
//!   with an [`UploadReporter`].
//! - Tests can provide their own `UploadBackend` that records tasks and
//!   directly emits `UploadFinished` events.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;
use tracing::debug;

use crate::engine::AutoUpdateEvent;
use crate::errors::{AutoUpdateError, Result};
use crate::upload::UploadTask;

/// Trait abstracting how upload tasks are started.
///
/// Starting is asynchronous and must not wait for the upload itself; the
/// outcome arrives later as an `AutoUpdateEvent::UploadFinished`. An error
/// returned here means the task never started and is treated as a failed
/// upload.
pub trait UploadBackend: Send {
    fn start_upload(
        &mut self,
        task: UploadTask,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Backend that hands tasks to an external upload engine over a channel.
#[derive(Debug, Clone)]
pub struct ChannelUploadBackend {
    tx: mpsc::Sender<UploadTask>,
}

impl ChannelUploadBackend {
    /// Create a backend plus the receiving end the upload engine consumes.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<UploadTask>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl UploadBackend for ChannelUploadBackend {
    fn start_upload(
        &mut self,
        task: UploadTask,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        // Clone the sender so the future doesn't borrow `self` across `await`.
        let tx = self.tx.clone();

        Box::pin(async move {
            debug!(path = ?task.local_path, repo_id = %task.repo_id, "queueing upload task");
            tx.send(task)
                .await
                .map_err(|e| AutoUpdateError::ChannelClosed(format!("upload engine: {e}")))
        })
    }
}

/// Handle used by an upload engine to report task completion.
#[derive(Debug, Clone)]
pub struct UploadReporter {
    tx: mpsc::Sender<AutoUpdateEvent>,
}

impl UploadReporter {
    pub fn new(tx: mpsc::Sender<AutoUpdateEvent>) -> Self {
        Self { tx }
    }

    pub async fn finished(&self, task: UploadTask, success: bool) -> Result<()> {
        self.tx
            .send(AutoUpdateEvent::UploadFinished { task, success })
            .await
            .map_err(|e| AutoUpdateError::ChannelClosed(format!("runtime: {e}")))
    }
}
