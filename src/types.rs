use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Identity owning a cached file.
///
/// The core never looks inside an account; it only carries it from the
/// account resolver into upload tasks. The `signature` is what cache entries
/// store to refer back to the account.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Account {
    pub server: String,
    pub username: String,
    pub signature: String,
}

impl Account {
    pub fn new(server: impl Into<String>, username: impl Into<String>) -> Self {
        let server = server.into();
        let username = username.into();
        let signature = account_signature(&server, &username);
        Self {
            server,
            username,
            signature,
        }
    }
}

/// Stable short digest identifying a `(server, username)` pair.
pub fn account_signature(server: &str, username: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(server.trim_end_matches('/').as_bytes());
    hasher.update(b"\t");
    hasher.update(username.as_bytes());
    let hex = hasher.finalize().to_hex();
    hex.as_str()[..16].to_string()
}

/// One previously downloaded file, as recorded by the cache store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub account_sig: String,
    pub repo_id: String,
    pub path_in_repo: String,
}

/// Per-path state kept in the watch set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchedFileInfo {
    pub account: Account,
    pub repo_id: String,
    pub path_in_repo: String,
    /// True while a re-upload started by the watcher is in flight.
    pub uploading: bool,
}

impl WatchedFileInfo {
    pub fn new(account: Account, repo_id: impl Into<String>, path_in_repo: impl Into<String>) -> Self {
        Self {
            account,
            repo_id: repo_id.into(),
            path_in_repo: path_in_repo.into(),
            uploading: false,
        }
    }
}

/// Emitted once per successful re-upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpdated {
    pub repo_id: String,
    pub path_in_repo: String,
}

/// Whether the recent-image-open guard is consulted before acting on a
/// change event.
///
/// - `Auto`: only on macOS, where opening an image in the system viewer
///   touches the file and makes the watcher fire.
/// - `Enabled` / `Disabled`: force either way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageOpenGuardMode {
    Auto,
    Enabled,
    Disabled,
}

impl Default for ImageOpenGuardMode {
    fn default() -> Self {
        ImageOpenGuardMode::Auto
    }
}

impl ImageOpenGuardMode {
    pub fn is_active(self) -> bool {
        match self {
            ImageOpenGuardMode::Auto => cfg!(target_os = "macos"),
            ImageOpenGuardMode::Enabled => true,
            ImageOpenGuardMode::Disabled => false,
        }
    }
}

impl FromStr for ImageOpenGuardMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(ImageOpenGuardMode::Auto),
            "enabled" => Ok(ImageOpenGuardMode::Enabled),
            "disabled" => Ok(ImageOpenGuardMode::Disabled),
            other => Err(format!(
                "invalid image_open_guard: {other} (expected \"auto\", \"enabled\" or \"disabled\")"
            )),
        }
    }
}
