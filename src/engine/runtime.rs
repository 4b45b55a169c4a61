// src/engine/runtime.rs

use std::collections::VecDeque;
use std::fmt;

use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info, warn};

use crate::engine::core::{StartupReport, WatcherCore};
use crate::engine::{AutoUpdateEvent, CoreCommand};
use crate::errors::Result;
use crate::store::{AccountResolver, CacheStore};
use crate::types::FileUpdated;
use crate::upload::UploadBackend;
use crate::watch::notifier::Notifier;

/// Drives the watcher core in response to `AutoUpdateEvent`s, and delegates
/// path registration to a `Notifier` and uploads to an `UploadBackend`.
///
/// All watch-set mutations happen inside `WatcherCore`, which this shell
/// owns exclusively; events from every source are serialised through one
/// channel.
pub struct Runtime<N: Notifier, U: UploadBackend> {
    core: WatcherCore,
    event_rx: mpsc::Receiver<AutoUpdateEvent>,
    notifier: N,
    uploads: U,
    updates_tx: broadcast::Sender<FileUpdated>,
}

impl<N: Notifier, U: UploadBackend> fmt::Debug for Runtime<N, U> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<N: Notifier, U: UploadBackend> Runtime<N, U> {
    pub fn new(
        core: WatcherCore,
        event_rx: mpsc::Receiver<AutoUpdateEvent>,
        notifier: N,
        uploads: U,
        updates_tx: broadcast::Sender<FileUpdated>,
    ) -> Self {
        Self {
            core,
            event_rx,
            notifier,
            uploads,
            updates_tx,
        }
    }

    pub fn core(&self) -> &WatcherCore {
        &self.core
    }

    /// Watch every file recorded in the cache store.
    pub async fn start(
        &mut self,
        cache: &dyn CacheStore,
        accounts: &dyn AccountResolver,
    ) -> Result<StartupReport> {
        let report = self.core.start(cache, accounts);
        self.execute_commands(report.commands.clone()).await?;
        Ok(report)
    }

    /// Main event loop.
    ///
    /// - Consumes `AutoUpdateEvent`s from `event_rx`.
    /// - Feeds them into the core.
    /// - Executes the commands returned by the core.
    ///
    /// Returns the runtime so callers can inspect the final state.
    pub async fn run(mut self) -> Result<Self> {
        info!("autoupdate runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);
            self.execute_commands(step.commands).await?;

            if !step.keep_running {
                info!("shutdown requested; stopping runtime");
                break;
            }
        }

        info!("runtime exiting");
        Ok(self)
    }

    async fn execute_commands(&mut self, commands: Vec<CoreCommand>) -> Result<()> {
        let mut pending: VecDeque<CoreCommand> = commands.into();

        while let Some(command) = pending.pop_front() {
            match command {
                CoreCommand::Watch(path) => {
                    if let Err(err) = self.notifier.watch(&path) {
                        warn!(?path, error = %err, "failed to watch path");
                        self.core.registration_failed(&path);
                    }
                }
                CoreCommand::Unwatch(path) => {
                    // The platform may already have dropped the watch when the
                    // file was replaced or deleted.
                    if let Err(err) = self.notifier.unwatch(&path) {
                        debug!(?path, error = %err, "unwatch failed");
                    }
                }
                CoreCommand::StartUpload(task) => {
                    if let Err(err) = self.uploads.start_upload(task.clone()).await {
                        warn!(path = ?task.local_path, error = %err, "failed to start upload");
                        let step = self.core.step(AutoUpdateEvent::UploadFinished {
                            task,
                            success: false,
                        });
                        pending.extend(step.commands);
                    }
                }
                CoreCommand::EmitFileUpdated(update) => {
                    if self.updates_tx.send(update).is_err() {
                        debug!("no subscribers for file updates");
                    }
                }
            }
        }

        Ok(())
    }
}
