// src/engine/mod.rs

//! Auto-update engine.
//!
//! This module ties together:
//! - the watch set (local path -> remote coordinates + upload state)
//! - the change filter and repo status checks
//! - the main runtime event loop that reacts to:
//!   - newly cached files
//!   - file change notifications
//!   - file open observations
//!   - upload completion
//!   - shutdown requests
//!
//! The synchronous core state machine lives in [`core`]; the async/IO shell
//! is implemented in [`runtime`].

use std::path::PathBuf;

use crate::types::Account;
use crate::upload::UploadTask;

/// Events flowing into the runtime from the notifier, the upload engine and
/// the embedding application.
#[derive(Debug, Clone)]
pub enum AutoUpdateEvent {
    /// A remote file was downloaded into the cache and should be watched.
    FileCached {
        account: Account,
        repo_id: String,
        path_in_repo: String,
    },
    /// The notifier reported a change on a registered path.
    FileChanged { path: PathBuf },
    /// The user opened a local file (fed to the change filter).
    FileOpened { path: PathBuf },
    /// An upload started by the watcher completed.
    UploadFinished { task: UploadTask, success: bool },
    /// Graceful shutdown requested.
    ShutdownRequested,
}

/// What processing a single event did to the affected path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// The path is (still) in the watch set and registered.
    Watched,
    /// Nothing to do: unknown path, or an upload is already in flight.
    Ignored,
    /// The local file (or its account) is gone; the path was dropped.
    StaleReference,
    /// The change was a side effect of opening an image.
    NoiseSignal,
    /// The repo is synced as a whole; nothing to upload.
    AlreadySynced,
    /// An upload task was started for the path.
    UploadStarted,
    /// The upload succeeded and the path is watched again.
    Updated,
    /// The upload failed; the path was dropped from the watch set.
    UploadFailure,
}

/// Core behaviour switches, usually derived from `AutoUpdateConfig`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WatcherOptions {
    /// Re-register a path after a noise or already-synced event.
    pub rearm_after_skip: bool,
    /// Skip cache entries whose account is gone instead of stopping startup.
    pub skip_missing_accounts: bool,
}

impl From<&crate::config::AutoUpdateConfig> for WatcherOptions {
    fn from(cfg: &crate::config::AutoUpdateConfig) -> Self {
        Self {
            rearm_after_skip: cfg.rearm_after_skip,
            skip_missing_accounts: cfg.skip_missing_accounts,
        }
    }
}

pub mod core;
pub mod event_handlers;
pub mod runtime;
pub mod watch_set;

pub use self::core::{StartupReport, WatcherCore};
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
pub use watch_set::WatchSet;
