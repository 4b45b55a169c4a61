// src/store/file.rs

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::store::CacheStore;
use crate::types::CacheEntry;

/// Relative path (from the cache root) to the cache index.
///
/// The effective path on disk is `<root>/.autoupdate/cached-files.toml`.
pub const CACHE_INDEX_PATH: &str = ".autoupdate/cached-files.toml";

#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheIndex {
    #[serde(default)]
    file: Vec<CacheEntry>,
}

/// Cache store persisted as a TOML list of `[[file]]` tables.
#[derive(Debug)]
pub struct TomlCacheStore {
    path: PathBuf,
    // Serialises read-modify-write cycles from `record` / `forget`.
    write_lock: Mutex<()>,
}

impl TomlCacheStore {
    /// Store rooted at `cache_root`, using [`CACHE_INDEX_PATH`].
    pub fn new(cache_root: impl AsRef<Path>) -> Self {
        Self::at_path(cache_root.as_ref().join(CACHE_INDEX_PATH))
    }

    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Add an entry, replacing any previous entry for the same
    /// `(repo_id, path_in_repo)`.
    pub fn record(&self, entry: CacheEntry) -> Result<()> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut index = load_index(&self.path)?;
        index
            .file
            .retain(|e| !(e.repo_id == entry.repo_id && e.path_in_repo == entry.path_in_repo));
        info!(repo_id = %entry.repo_id, path_in_repo = %entry.path_in_repo, "recorded cached file");
        index.file.push(entry);
        save_index(&self.path, &index)
    }

    /// Drop the entry for `(repo_id, path_in_repo)`. Returns whether one
    /// existed.
    pub fn forget(&self, repo_id: &str, path_in_repo: &str) -> Result<bool> {
        let _guard = self.write_lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut index = load_index(&self.path)?;
        let before = index.file.len();
        index
            .file
            .retain(|e| !(e.repo_id == repo_id && e.path_in_repo == path_in_repo));
        if index.file.len() == before {
            return Ok(false);
        }
        save_index(&self.path, &index)?;
        Ok(true)
    }
}

impl CacheStore for TomlCacheStore {
    fn list_all_cached_files(&self) -> Result<Vec<CacheEntry>> {
        let index = load_index(&self.path)?;
        debug!(count = index.file.len(), path = ?self.path, "loaded cache index");
        Ok(index.file)
    }
}

fn load_index(path: &Path) -> Result<CacheIndex> {
    if !path.exists() {
        return Ok(CacheIndex::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading cache index at {:?}", path))?;
    let index: CacheIndex = toml::from_str(&contents)
        .with_context(|| format!("parsing cache index at {:?}", path))?;
    Ok(index)
}

fn save_index(path: &Path, index: &CacheIndex) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating cache index directory at {:?}", parent))?;
    }

    let contents = toml::to_string(index).context("serializing cache index")?;
    fs::write(path, contents).with_context(|| format!("writing cache index at {:?}", path))?;
    Ok(())
}
