// src/engine/event_handlers.rs

//! Event handling logic for the core state machine.
//!
//! Per watched path:
//!
//! ```text
//! Unwatched --watch_cached_file--> Watched --change--> Reconciling
//! Reconciling --file gone--> Removed
//! Reconciling --noise / already synced--> (left unregistered, or re-armed)
//! Reconciling --otherwise--> Uploading
//! Uploading --success--> Watched
//! Uploading --failure--> Removed
//! ```

use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::engine::watch_set::WatchSet;
use crate::engine::{ChangeOutcome, WatcherOptions};
use crate::fs::FileSystem;
use crate::store::RepoStatus;
use crate::types::{Account, FileUpdated, WatchedFileInfo};
use crate::upload::UploadTask;
use crate::watch::filter::SpuriousChangeFilter;
use crate::watch::path_utils::{base_name_of, parent_of, LocalPathResolver};

/// Command produced by the core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Register the path with the notifier.
    Watch(PathBuf),
    /// Unregister the path from the notifier.
    Unwatch(PathBuf),
    /// Hand the task to the upload backend.
    StartUpload(UploadTask),
    /// Publish a successful re-upload.
    EmitFileUpdated(FileUpdated),
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Effect on the affected path, if the event concerned one.
    pub outcome: Option<ChangeOutcome>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    pub(crate) fn new(commands: Vec<CoreCommand>, outcome: ChangeOutcome) -> Self {
        Self {
            commands,
            outcome: Some(outcome),
            keep_running: true,
        }
    }

    pub(crate) fn idle() -> Self {
        Self {
            commands: Vec::new(),
            outcome: None,
            keep_running: true,
        }
    }
}

/// Start watching the cached copy of `(repo_id, path_in_repo)`.
///
/// - Missing local file: nothing is recorded.
/// - New path: inserted and registered.
/// - Known path: info refreshed; registered again only if it is not
///   registered and has no upload in flight.
pub fn handle_watch_cached_file(
    set: &mut WatchSet,
    layout: &dyn LocalPathResolver,
    fs: &dyn FileSystem,
    account: Account,
    repo_id: String,
    path_in_repo: String,
) -> CoreStep {
    let local_path = layout.local_cache_path(&repo_id, &path_in_repo);

    if !fs.exists(&local_path) {
        info!(path = ?local_path, "cached file does not exist anymore");
        return CoreStep::new(Vec::new(), ChangeOutcome::StaleReference);
    }

    let mut commands = Vec::new();

    match set.get_mut(&local_path) {
        Some(info) => {
            info.account = account;
            info.repo_id = repo_id;
            info.path_in_repo = path_in_repo;
            if info.uploading {
                debug!(path = ?local_path, "upload in flight; watch resumes when it finishes");
                return CoreStep::new(commands, ChangeOutcome::Ignored);
            }
        }
        None => {
            set.insert(
                local_path.clone(),
                WatchedFileInfo::new(account, repo_id, path_in_repo),
            );
        }
    }

    if !set.is_registered(&local_path) {
        info!(path = ?local_path, "watch local file");
        set.mark_registered(&local_path);
        commands.push(CoreCommand::Watch(local_path));
    }

    CoreStep::new(commands, ChangeOutcome::Watched)
}

/// Handle a change notification for `path`.
pub fn handle_file_changed(
    set: &mut WatchSet,
    fs: &dyn FileSystem,
    repo_status: &dyn RepoStatus,
    filter: &dyn SpuriousChangeFilter,
    options: &WatcherOptions,
    path: PathBuf,
) -> CoreStep {
    info!(?path, "detected file change");

    let Some(info) = set.get(&path) else {
        debug!(?path, "change for a path outside the watch set");
        return CoreStep::new(Vec::new(), ChangeOutcome::Ignored);
    };
    if info.uploading {
        // Queued before the unregistration took effect.
        debug!(?path, "change while uploading; ignored");
        return CoreStep::new(Vec::new(), ChangeOutcome::Ignored);
    }
    let repo_id = info.repo_id.clone();

    let mut commands = Vec::new();
    if set.is_registered(&path) {
        set.mark_unregistered(&path);
        commands.push(CoreCommand::Unwatch(path.clone()));
    }

    if !fs.exists(&path) {
        info!(?path, "watched file no longer exists; removing watch");
        set.remove(&path);
        return CoreStep::new(commands, ChangeOutcome::StaleReference);
    }

    if filter.is_spurious(&path) {
        info!(?path, "false change signal after image open");
        rearm_if_configured(set, options, &path, &mut commands);
        return CoreStep::new(commands, ChangeOutcome::NoiseSignal);
    }

    if repo_status.is_repo_fully_local(&repo_id) {
        info!(?path, repo_id = %repo_id, "repo already synced locally; no need to update");
        rearm_if_configured(set, options, &path, &mut commands);
        return CoreStep::new(commands, ChangeOutcome::AlreadySynced);
    }

    let Some(info) = set.get_mut(&path) else {
        return CoreStep::new(commands, ChangeOutcome::Ignored);
    };

    let task = UploadTask::new(
        info.account.clone(),
        info.repo_id.clone(),
        parent_of(&info.path_in_repo),
        path.clone(),
        base_name_of(&path),
        true,
    );
    info!(
        ?path,
        repo_id = %info.repo_id,
        path_in_repo = %info.path_in_repo,
        "starting auto update upload"
    );
    info.uploading = true;
    commands.push(CoreCommand::StartUpload(task));

    CoreStep::new(commands, ChangeOutcome::UploadStarted)
}

/// Handle completion of an upload started by [`handle_file_changed`].
pub fn handle_upload_finished(set: &mut WatchSet, task: UploadTask, success: bool) -> CoreStep {
    let local_path = task.local_file_path().to_path_buf();

    if !success {
        warn!(path = ?local_path, "failed to auto update; dropping watch");
        set.remove(&local_path);
        return CoreStep::new(Vec::new(), ChangeOutcome::UploadFailure);
    }

    let mut commands = vec![CoreCommand::EmitFileUpdated(FileUpdated {
        repo_id: task.repo_id().to_string(),
        path_in_repo: task.path_in_repo(),
    })];

    match set.get_mut(&local_path) {
        Some(info) => {
            info.uploading = false;
            if !set.is_registered(&local_path) {
                set.mark_registered(&local_path);
                commands.push(CoreCommand::Watch(local_path.clone()));
            }
        }
        None => {
            warn!(path = ?local_path, "upload finished for a path no longer watched");
        }
    }

    info!(path = ?local_path, "auto update finished");
    CoreStep::new(commands, ChangeOutcome::Updated)
}

/// Forward a file open to the change filter.
pub fn handle_file_opened(filter: &mut dyn SpuriousChangeFilter, path: &Path) -> CoreStep {
    filter.file_opened(path);
    CoreStep::idle()
}

fn rearm_if_configured(
    set: &mut WatchSet,
    options: &WatcherOptions,
    path: &Path,
    commands: &mut Vec<CoreCommand>,
) {
    if options.rearm_after_skip {
        set.mark_registered(path);
        commands.push(CoreCommand::Watch(path.to_path_buf()));
    }
}
