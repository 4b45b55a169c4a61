use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use autoupdate::errors::{AutoUpdateError, Result};
use autoupdate::watch::Notifier;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotifierCall {
    Watch(PathBuf),
    Unwatch(PathBuf),
}

/// Notifier that records every call and tracks which paths are registered.
///
/// Clones share state, so tests keep one handle for assertions.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    calls: Arc<Mutex<Vec<NotifierCall>>>,
    registered: Arc<Mutex<HashSet<PathBuf>>>,
    refuse: Arc<Mutex<HashSet<PathBuf>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `watch` fail for `path`.
    pub fn refuse(&self, path: impl Into<PathBuf>) {
        self.refuse.lock().unwrap().insert(path.into());
    }

    pub fn calls(&self) -> Vec<NotifierCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn is_registered(&self, path: impl AsRef<Path>) -> bool {
        self.registered.lock().unwrap().contains(path.as_ref())
    }

    pub fn watch_count(&self, path: impl AsRef<Path>) -> usize {
        let path = path.as_ref();
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, NotifierCall::Watch(p) if p == path))
            .count()
    }
}

impl Notifier for RecordingNotifier {
    fn watch(&mut self, path: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(NotifierCall::Watch(path.to_path_buf()));
        if self.refuse.lock().unwrap().contains(path) {
            return Err(AutoUpdateError::Other(anyhow::anyhow!("refused {:?}", path)));
        }
        self.registered.lock().unwrap().insert(path.to_path_buf());
        Ok(())
    }

    fn unwatch(&mut self, path: &Path) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(NotifierCall::Unwatch(path.to_path_buf()));
        if self.registered.lock().unwrap().remove(path) {
            Ok(())
        } else {
            Err(AutoUpdateError::Other(anyhow::anyhow!("not watched: {:?}", path)))
        }
    }
}
