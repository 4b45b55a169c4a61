// src/engine/core.rs

//! Synchronous core state machine.
//!
//! The core consumes [`AutoUpdateEvent`]s and produces:
//! - an updated watch set
//! - a list of commands describing what the IO shell should do next
//!   (register/unregister paths, start uploads, publish updates)
//!
//! It has no channels and no Tokio types. Its collaborators (filesystem,
//! repo status, change filter) are trait objects so the whole state machine
//! can be driven from plain unit tests.

use std::path::Path;
use std::sync::Arc;

use tracing::{info, warn};

use crate::engine::event_handlers::{
    handle_file_changed, handle_file_opened, handle_upload_finished, handle_watch_cached_file,
    CoreCommand, CoreStep,
};
use crate::engine::watch_set::WatchSet;
use crate::engine::{AutoUpdateEvent, ChangeOutcome, WatcherOptions};
use crate::fs::FileSystem;
use crate::store::{AccountResolver, CacheStore, RepoStatus};
use crate::types::{Account, WatchedFileInfo};
use crate::watch::filter::SpuriousChangeFilter;
use crate::watch::path_utils::LocalPathResolver;

/// Result of the startup enumeration.
#[derive(Debug, Clone, Default)]
pub struct StartupReport {
    /// Commands to execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Entries now watched.
    pub watched: usize,
    /// Entries whose local file was gone.
    pub missing_files: usize,
    /// Entries whose account was gone.
    pub missing_accounts: usize,
    /// Whether enumeration stopped early at a missing account.
    pub aborted: bool,
}

pub struct WatcherCore {
    set: WatchSet,
    layout: Arc<dyn LocalPathResolver>,
    fs: Arc<dyn FileSystem>,
    repo_status: Arc<dyn RepoStatus>,
    filter: Box<dyn SpuriousChangeFilter>,
    options: WatcherOptions,
}

impl std::fmt::Debug for WatcherCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherCore")
            .field("set", &self.set)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl WatcherCore {
    pub fn new(
        layout: Arc<dyn LocalPathResolver>,
        fs: Arc<dyn FileSystem>,
        repo_status: Arc<dyn RepoStatus>,
        filter: Box<dyn SpuriousChangeFilter>,
        options: WatcherOptions,
    ) -> Self {
        Self {
            set: WatchSet::new(),
            layout,
            fs,
            repo_status,
            filter,
            options,
        }
    }

    pub fn watch_set(&self) -> &WatchSet {
        &self.set
    }

    pub fn info(&self, path: &Path) -> Option<&WatchedFileInfo> {
        self.set.get(path)
    }

    pub fn is_registered(&self, path: &Path) -> bool {
        self.set.is_registered(path)
    }

    /// Watch every file recorded in the cache store.
    ///
    /// A store that cannot be read yields an empty report. A missing account
    /// stops the enumeration unless `skip_missing_accounts` is set.
    pub fn start(&mut self, cache: &dyn CacheStore, accounts: &dyn AccountResolver) -> StartupReport {
        let mut report = StartupReport::default();

        let entries = match cache.list_all_cached_files() {
            Ok(entries) => entries,
            Err(err) => {
                warn!(error = %err, "failed to list cached files; nothing to watch");
                return report;
            }
        };

        for entry in entries {
            let Some(account) = accounts.find_account(&entry.account_sig) else {
                report.missing_accounts += 1;
                if self.options.skip_missing_accounts {
                    warn!(path_in_repo = %entry.path_in_repo, "account of cached file was deleted; skipping");
                    continue;
                }
                warn!(
                    path_in_repo = %entry.path_in_repo,
                    "account of cached file was deleted; stopping startup enumeration"
                );
                report.aborted = true;
                break;
            };

            let step = self.watch_cached_file(account, entry.repo_id, entry.path_in_repo);
            match step.outcome {
                Some(ChangeOutcome::Watched) => report.watched += 1,
                Some(ChangeOutcome::StaleReference) => report.missing_files += 1,
                _ => {}
            }
            report.commands.extend(step.commands);
        }

        info!(
            watched = report.watched,
            missing_files = report.missing_files,
            missing_accounts = report.missing_accounts,
            "startup enumeration done"
        );
        report
    }

    pub fn watch_cached_file(
        &mut self,
        account: Account,
        repo_id: impl Into<String>,
        path_in_repo: impl Into<String>,
    ) -> CoreStep {
        handle_watch_cached_file(
            &mut self.set,
            self.layout.as_ref(),
            self.fs.as_ref(),
            account,
            repo_id.into(),
            path_in_repo.into(),
        )
    }

    /// The notifier refused to register `path`; drop it so the watch set
    /// only holds paths that can actually fire.
    pub fn registration_failed(&mut self, path: &Path) {
        if self.set.remove(path).is_some() {
            warn!(?path, "could not register path with notifier; dropping watch");
        }
    }

    /// Handle a single event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: AutoUpdateEvent) -> CoreStep {
        match event {
            AutoUpdateEvent::FileCached {
                account,
                repo_id,
                path_in_repo,
            } => self.watch_cached_file(account, repo_id, path_in_repo),
            AutoUpdateEvent::FileChanged { path } => handle_file_changed(
                &mut self.set,
                self.fs.as_ref(),
                self.repo_status.as_ref(),
                &*self.filter,
                &self.options,
                path,
            ),
            AutoUpdateEvent::FileOpened { path } => handle_file_opened(&mut *self.filter, &path),
            AutoUpdateEvent::UploadFinished { task, success } => {
                handle_upload_finished(&mut self.set, task, success)
            }
            AutoUpdateEvent::ShutdownRequested => CoreStep {
                commands: Vec::new(),
                outcome: None,
                keep_running: false,
            },
        }
    }
}
