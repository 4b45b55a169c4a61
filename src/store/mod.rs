// src/store/mod.rs

//! Read-side contracts the watcher needs from the rest of the application:
//! - which files are cached ([`CacheStore`]),
//! - which accounts still exist ([`AccountResolver`]),
//! - whether a repo is synced as a whole ([`RepoStatus`]).
//!
//! Each trait comes with a simple in-memory implementation; the cache store
//! additionally has a TOML-file-backed one in [`file`].

pub mod file;

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use anyhow::Result;
use tracing::debug;

use crate::types::{Account, CacheEntry};

pub use file::{TomlCacheStore, CACHE_INDEX_PATH};

/// Persistent record of previously downloaded files.
pub trait CacheStore: Send + Sync {
    fn list_all_cached_files(&self) -> Result<Vec<CacheEntry>>;
}

pub trait AccountResolver: Send + Sync {
    fn find_account(&self, signature: &str) -> Option<Account>;
}

pub trait RepoStatus: Send + Sync {
    /// True when every file of the repo already has an up-to-date local
    /// copy maintained by the whole-repo sync.
    fn is_repo_fully_local(&self, repo_id: &str) -> bool;
}

/// Cache entries held in memory only.
#[derive(Debug, Default)]
pub struct MemoryCacheStore {
    entries: RwLock<Vec<CacheEntry>>,
}

impl MemoryCacheStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(entries: Vec<CacheEntry>) -> Self {
        Self {
            entries: RwLock::new(entries),
        }
    }

    pub fn push(&self, entry: CacheEntry) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.push(entry);
    }
}

impl CacheStore for MemoryCacheStore {
    fn list_all_cached_files(&self) -> Result<Vec<CacheEntry>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.clone())
    }
}

/// Accounts known to the application, keyed by signature.
#[derive(Debug, Default)]
pub struct AccountRegistry {
    accounts: RwLock<HashMap<String, Account>>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, account: Account) {
        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        debug!(signature = %account.signature, "registered account");
        accounts.insert(account.signature.clone(), account);
    }

    pub fn remove(&self, signature: &str) -> Option<Account> {
        let mut accounts = self.accounts.write().unwrap_or_else(|e| e.into_inner());
        accounts.remove(signature)
    }
}

impl AccountResolver for AccountRegistry {
    fn find_account(&self, signature: &str) -> Option<Account> {
        let accounts = self.accounts.read().unwrap_or_else(|e| e.into_inner());
        accounts.get(signature).cloned()
    }
}

/// Set of repo ids that are currently synced as a whole.
#[derive(Debug, Default)]
pub struct LocalRepoSet {
    repos: RwLock<HashSet<String>>,
}

impl LocalRepoSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_local(&self, repo_id: impl Into<String>) {
        let mut repos = self.repos.write().unwrap_or_else(|e| e.into_inner());
        repos.insert(repo_id.into());
    }

    pub fn unmark(&self, repo_id: &str) {
        let mut repos = self.repos.write().unwrap_or_else(|e| e.into_inner());
        repos.remove(repo_id);
    }
}

impl RepoStatus for LocalRepoSet {
    fn is_repo_fully_local(&self, repo_id: &str) -> bool {
        let repos = self.repos.read().unwrap_or_else(|e| e.into_inner());
        repos.contains(repo_id)
    }
}
