// src/engine/watch_set.rs

use std::collections::hash_map::Iter;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use crate::types::WatchedFileInfo;

/// Watched paths and their notifier registration state.
///
/// Every entry is expected to be registered, except while its change is
/// being reconciled or uploaded. Registration is tracked here, mirroring the
/// commands the core issues, so that state can be inspected without a
/// notifier.
#[derive(Debug, Default)]
pub struct WatchSet {
    entries: HashMap<PathBuf, WatchedFileInfo>,
    registered: HashSet<PathBuf>,
}

impl WatchSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn get(&self, path: &Path) -> Option<&WatchedFileInfo> {
        self.entries.get(path)
    }

    pub fn get_mut(&mut self, path: &Path) -> Option<&mut WatchedFileInfo> {
        self.entries.get_mut(path)
    }

    pub fn insert(&mut self, path: PathBuf, info: WatchedFileInfo) {
        self.entries.insert(path, info);
    }

    /// Remove the entry along with its registration flag.
    pub fn remove(&mut self, path: &Path) -> Option<WatchedFileInfo> {
        self.registered.remove(path);
        self.entries.remove(path)
    }

    pub fn is_registered(&self, path: &Path) -> bool {
        self.registered.contains(path)
    }

    pub fn mark_registered(&mut self, path: &Path) {
        self.registered.insert(path.to_path_buf());
    }

    pub fn mark_unregistered(&mut self, path: &Path) {
        self.registered.remove(path);
    }

    pub fn iter(&self) -> Iter<'_, PathBuf, WatchedFileInfo> {
        self.entries.iter()
    }
}
