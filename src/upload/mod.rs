// src/upload/mod.rs

//! Upload layer.
//!
//! The watcher never talks to the network itself. It builds an
//! [`UploadTask`] describing "put this local file at that remote place" and
//! hands it to an [`UploadBackend`]. Whoever performs the upload reports the
//! outcome back through an [`UploadReporter`], which turns it into an
//! `UploadFinished` event on the runtime channel.

pub mod backend;

use std::path::{Path, PathBuf};

use crate::types::Account;
use crate::watch::path_utils::join_repo_path;

pub use backend::{ChannelUploadBackend, UploadBackend, UploadReporter};

/// A single re-upload of a cached file to its remote location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub account: Account,
    pub repo_id: String,
    /// Remote directory the file is uploaded into.
    pub parent_dir: String,
    pub local_path: PathBuf,
    /// Remote file name.
    pub file_name: String,
    /// Replace the existing remote file instead of creating a renamed copy.
    pub overwrite: bool,
}

impl UploadTask {
    pub fn new(
        account: Account,
        repo_id: impl Into<String>,
        parent_dir: impl Into<String>,
        local_path: impl Into<PathBuf>,
        file_name: impl Into<String>,
        overwrite: bool,
    ) -> Self {
        Self {
            account,
            repo_id: repo_id.into(),
            parent_dir: parent_dir.into(),
            local_path: local_path.into(),
            file_name: file_name.into(),
            overwrite,
        }
    }

    pub fn local_file_path(&self) -> &Path {
        &self.local_path
    }

    pub fn repo_id(&self) -> &str {
        &self.repo_id
    }

    /// Remote path of the uploaded file.
    pub fn path_in_repo(&self) -> String {
        join_repo_path(&self.parent_dir, &self.file_name)
    }
}
