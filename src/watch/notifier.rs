// src/watch/notifier.rs

use std::path::{Path, PathBuf};

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::engine::AutoUpdateEvent;
use crate::errors::Result;

/// Per-path registration with the OS change notification facility.
///
/// Registered paths produce `AutoUpdateEvent::FileChanged` events on the
/// runtime channel; unregistered paths produce nothing.
pub trait Notifier: Send {
    fn watch(&mut self, path: &Path) -> Result<()>;
    fn unwatch(&mut self, path: &Path) -> Result<()>;
}

/// Notifier backed by `notify`'s recommended platform watcher.
///
/// Dropping it stops all file watching.
pub struct NotifyNotifier {
    inner: RecommendedWatcher,
}

impl std::fmt::Debug for NotifyNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyNotifier").finish()
    }
}

impl NotifyNotifier {
    /// Create the platform watcher and the task forwarding its events to
    /// `runtime_tx`. Must be called from within a Tokio runtime.
    pub fn spawn(runtime_tx: mpsc::Sender<AutoUpdateEvent>) -> Result<Self> {
        // Channel from the blocking notify callback into the async world.
        let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();

        let inner = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if let Err(err) = event_tx.send(event) {
                        // We can't log via tracing reliably here, so fall back to stderr.
                        eprintln!("autoupdate: failed to forward notify event: {err}");
                    }
                }
                Err(err) => {
                    eprintln!("autoupdate: file watch error: {err}");
                }
            },
            Config::default(),
        )?;

        tokio::spawn(async move {
            while let Some(event) = event_rx.recv().await {
                debug!(?event, "received notify event");
                for path in changed_paths(event) {
                    if runtime_tx
                        .send(AutoUpdateEvent::FileChanged { path })
                        .await
                        .is_err()
                    {
                        debug!("runtime channel closed; stopping notify forwarder");
                        return;
                    }
                }
            }
            debug!("notify forwarder finished");
        });

        info!("file change notifier started");
        Ok(Self { inner })
    }
}

impl Notifier for NotifyNotifier {
    fn watch(&mut self, path: &Path) -> Result<()> {
        self.inner.watch(path, RecursiveMode::NonRecursive)?;
        Ok(())
    }

    fn unwatch(&mut self, path: &Path) -> Result<()> {
        self.inner.unwatch(path)?;
        Ok(())
    }
}

/// Paths of an event that count as "this file changed".
///
/// Pure access events (open/close without write) are dropped here; the
/// platforms that misreport opens as modifications are handled by the
/// spurious-change filter instead.
pub fn changed_paths(event: Event) -> Vec<PathBuf> {
    match event.kind {
        EventKind::Access(_) => Vec::new(),
        _ => event.paths,
    }
}
