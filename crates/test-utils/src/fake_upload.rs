use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use autoupdate::engine::AutoUpdateEvent;
use autoupdate::errors::{AutoUpdateError, Result};
use autoupdate::upload::{UploadBackend, UploadTask};

/// How the fake backend answers a started upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FakeUploadMode {
    /// Immediately report success.
    Succeed,
    /// Immediately report failure.
    Fail,
    /// Refuse to start the task.
    Refuse,
    /// Record the task and report nothing; the test reports completion.
    Hold,
}

/// A fake upload backend that:
/// - records which tasks were started
/// - reports `UploadFinished` according to its mode.
pub struct FakeUploadBackend {
    runtime_tx: mpsc::Sender<AutoUpdateEvent>,
    started: Arc<Mutex<Vec<UploadTask>>>,
    mode: FakeUploadMode,
}

impl FakeUploadBackend {
    pub fn new(
        runtime_tx: mpsc::Sender<AutoUpdateEvent>,
        started: Arc<Mutex<Vec<UploadTask>>>,
        mode: FakeUploadMode,
    ) -> Self {
        Self {
            runtime_tx,
            started,
            mode,
        }
    }
}

impl UploadBackend for FakeUploadBackend {
    fn start_upload(
        &mut self,
        task: UploadTask,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.runtime_tx.clone();
        let started = Arc::clone(&self.started);
        let mode = self.mode;

        Box::pin(async move {
            if mode == FakeUploadMode::Refuse {
                return Err(AutoUpdateError::Other(anyhow::anyhow!("upload engine offline")));
            }

            started.lock().unwrap().push(task.clone());

            let success = match mode {
                FakeUploadMode::Succeed => true,
                FakeUploadMode::Fail => false,
                FakeUploadMode::Hold | FakeUploadMode::Refuse => return Ok(()),
            };

            tx.send(AutoUpdateEvent::UploadFinished { task, success })
                .await
                .map_err(|e| AutoUpdateError::ChannelClosed(e.to_string()))
        })
    }
}
