// src/service.rs

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::AutoUpdateConfig;
use crate::engine::{AutoUpdateEvent, Runtime, WatcherCore, WatcherOptions};
use crate::errors::{AutoUpdateError, Result};
use crate::fs::{FileSystem, RealFileSystem};
use crate::store::{AccountResolver, CacheStore, RepoStatus};
use crate::types::{Account, FileUpdated};
use crate::upload::{UploadBackend, UploadReporter};
use crate::watch::filter::{build_change_filter, SpuriousChangeFilter};
use crate::watch::notifier::{Notifier, NotifyNotifier};
use crate::watch::path_utils::{CacheLayout, LocalPathResolver};

/// External collaborators the watcher depends on.
///
/// `fs`, `layout` and `change_filter` have defaults derived from the config
/// when left unset.
pub struct Collaborators {
    pub cache_store: Arc<dyn CacheStore>,
    pub accounts: Arc<dyn AccountResolver>,
    pub repo_status: Arc<dyn RepoStatus>,
    pub fs: Option<Arc<dyn FileSystem>>,
    pub layout: Option<Arc<dyn LocalPathResolver>>,
    pub change_filter: Option<Box<dyn SpuriousChangeFilter>>,
}

impl Collaborators {
    pub fn new(
        cache_store: Arc<dyn CacheStore>,
        accounts: Arc<dyn AccountResolver>,
        repo_status: Arc<dyn RepoStatus>,
    ) -> Self {
        Self {
            cache_store,
            accounts,
            repo_status,
            fs: None,
            layout: None,
            change_filter: None,
        }
    }

    pub fn with_fs(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = Some(fs);
        self
    }

    pub fn with_layout(mut self, layout: Arc<dyn LocalPathResolver>) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn with_change_filter(mut self, filter: Box<dyn SpuriousChangeFilter>) -> Self {
        self.change_filter = Some(filter);
        self
    }
}

/// Handle to a running auto-update service.
///
/// Obtained from [`spawn_service`]; call [`ServiceHandle::shutdown`] to stop
/// the event loop. Dropping the handle without shutting down leaves the loop
/// running until every event sender is gone.
#[derive(Debug)]
pub struct ServiceHandle {
    event_tx: mpsc::Sender<AutoUpdateEvent>,
    updates_tx: broadcast::Sender<FileUpdated>,
    join: JoinHandle<Result<()>>,
}

impl ServiceHandle {
    /// Sender for raw events into the runtime.
    pub fn events(&self) -> mpsc::Sender<AutoUpdateEvent> {
        self.event_tx.clone()
    }

    /// Receive a `FileUpdated` for every successful re-upload from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<FileUpdated> {
        self.updates_tx.subscribe()
    }

    /// Reporter the upload engine uses to signal completion.
    pub fn reporter(&self) -> UploadReporter {
        UploadReporter::new(self.event_tx.clone())
    }

    /// A file was downloaded into the cache; start watching it.
    pub async fn file_cached(
        &self,
        account: Account,
        repo_id: impl Into<String>,
        path_in_repo: impl Into<String>,
    ) -> Result<()> {
        self.send(AutoUpdateEvent::FileCached {
            account,
            repo_id: repo_id.into(),
            path_in_repo: path_in_repo.into(),
        })
        .await
    }

    /// The user opened a local file.
    pub async fn file_opened(&self, path: impl Into<PathBuf>) -> Result<()> {
        self.send(AutoUpdateEvent::FileOpened { path: path.into() }).await
    }

    /// Stop the event loop and wait for it to exit.
    pub async fn shutdown(self) -> Result<()> {
        if self.event_tx.send(AutoUpdateEvent::ShutdownRequested).await.is_err() {
            warn!("runtime already stopped");
        }
        self.join
            .await
            .map_err(|e| AutoUpdateError::Other(anyhow::anyhow!("runtime task failed: {e}")))?
    }

    async fn send(&self, event: AutoUpdateEvent) -> Result<()> {
        self.event_tx
            .send(event)
            .await
            .map_err(|e| AutoUpdateError::ChannelClosed(format!("runtime: {e}")))
    }
}

/// Start the auto-update service with the platform file notifier.
///
/// Must be called from within a Tokio runtime.
pub fn spawn_service<U>(
    config: &AutoUpdateConfig,
    collaborators: Collaborators,
    uploads: U,
) -> Result<ServiceHandle>
where
    U: UploadBackend + 'static,
{
    spawn_service_with_notifier(config, collaborators, NotifyNotifier::spawn, uploads)
}

/// Start the auto-update service with a custom notifier.
///
/// `make_notifier` receives the runtime event sender the notifier reports
/// `FileChanged` events on.
pub fn spawn_service_with_notifier<N, U, F>(
    config: &AutoUpdateConfig,
    collaborators: Collaborators,
    make_notifier: F,
    uploads: U,
) -> Result<ServiceHandle>
where
    N: Notifier + 'static,
    U: UploadBackend + 'static,
    F: FnOnce(mpsc::Sender<AutoUpdateEvent>) -> Result<N>,
{
    let (event_tx, event_rx) = mpsc::channel::<AutoUpdateEvent>(config.event_channel_capacity);
    let (updates_tx, _) = broadcast::channel::<FileUpdated>(config.event_channel_capacity);

    let notifier = make_notifier(event_tx.clone())?;

    let Collaborators {
        cache_store,
        accounts,
        repo_status,
        fs,
        layout,
        change_filter,
    } = collaborators;

    let fs = fs.unwrap_or_else(|| Arc::new(RealFileSystem));
    let layout =
        layout.unwrap_or_else(|| Arc::new(CacheLayout::new(config.cache_root.clone())));
    let filter = change_filter.unwrap_or_else(|| build_change_filter(config.image_open_guard));

    let core = WatcherCore::new(layout, fs, repo_status, filter, WatcherOptions::from(config));
    let mut runtime = Runtime::new(core, event_rx, notifier, uploads, updates_tx.clone());

    info!(cache_root = ?config.cache_root, "starting autoupdate service");

    let join = tokio::spawn(async move {
        runtime.start(cache_store.as_ref(), accounts.as_ref()).await?;
        runtime.run().await.map(|_| ())
    });

    Ok(ServiceHandle {
        event_tx,
        updates_tx,
        join,
    })
}
