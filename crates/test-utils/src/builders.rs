#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use autoupdate::engine::{WatcherCore, WatcherOptions};
use autoupdate::fs::mock::MockFileSystem;
use autoupdate::store::LocalRepoSet;
use autoupdate::types::{Account, CacheEntry};
use autoupdate::watch::{CacheLayout, LocalPathResolver, NoopFilter, SpuriousChangeFilter};

pub const CACHE_ROOT: &str = "/cache";

pub fn account(name: &str) -> Account {
    Account::new("https://files.example.com", name)
}

pub fn cache_entry(account: &Account, repo_id: &str, path_in_repo: &str) -> CacheEntry {
    CacheEntry {
        account_sig: account.signature.clone(),
        repo_id: repo_id.to_string(),
        path_in_repo: path_in_repo.to_string(),
    }
}

/// Local path of `(repo_id, path_in_repo)` under [`CACHE_ROOT`].
pub fn local_path(repo_id: &str, path_in_repo: &str) -> PathBuf {
    CacheLayout::new(CACHE_ROOT).local_cache_path(repo_id, path_in_repo)
}

/// Builder for `WatcherCore` backed by mocks.
///
/// The mock filesystem and repo set are shared, so tests can keep
/// mutating them after `build()`.
pub struct CoreBuilder {
    pub fs: MockFileSystem,
    pub repos: Arc<LocalRepoSet>,
    filter: Box<dyn SpuriousChangeFilter>,
    options: WatcherOptions,
}

impl CoreBuilder {
    pub fn new() -> Self {
        Self {
            fs: MockFileSystem::new(),
            repos: Arc::new(LocalRepoSet::new()),
            filter: Box::new(NoopFilter),
            options: WatcherOptions::default(),
        }
    }

    pub fn with_file(self, repo_id: &str, path_in_repo: &str) -> Self {
        self.fs.add_file(local_path(repo_id, path_in_repo));
        self
    }

    pub fn with_filter(mut self, filter: Box<dyn SpuriousChangeFilter>) -> Self {
        self.filter = filter;
        self
    }

    pub fn rearm_after_skip(mut self, val: bool) -> Self {
        self.options.rearm_after_skip = val;
        self
    }

    pub fn skip_missing_accounts(mut self, val: bool) -> Self {
        self.options.skip_missing_accounts = val;
        self
    }

    pub fn build(self) -> (WatcherCore, MockFileSystem, Arc<LocalRepoSet>) {
        let core = WatcherCore::new(
            Arc::new(CacheLayout::new(CACHE_ROOT)),
            Arc::new(self.fs.clone()),
            self.repos.clone(),
            self.filter,
            self.options,
        );
        (core, self.fs, self.repos)
    }
}

impl Default for CoreBuilder {
    fn default() -> Self {
        Self::new()
    }
}
