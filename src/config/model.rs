// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::types::ImageOpenGuardMode;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// cache_root = "/home/me/.local/share/files/file-cache"
/// rearm_after_skip = false
/// skip_missing_accounts = false
/// image_open_guard = "auto"
/// event_channel_capacity = 64
/// ```
///
/// Only `cache_root` is required.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAutoUpdateConfig {
    /// Directory under which cached files live, laid out as
    /// `<cache_root>/<repo_id>/<path_in_repo>`.
    pub cache_root: PathBuf,

    /// Re-register a path with the notifier after a change event was
    /// discarded (recent image open, or repo already fully local).
    ///
    /// Off by default: the path then stays unwatched until it is cached
    /// again.
    #[serde(default)]
    pub rearm_after_skip: bool,

    /// Skip only the affected entry when a cached file's account no longer
    /// exists at startup. Off by default, which stops the whole startup
    /// enumeration at the first missing account.
    #[serde(default)]
    pub skip_missing_accounts: bool,

    #[serde(default)]
    pub image_open_guard: ImageOpenGuardMode,

    /// Capacity of the runtime event channel.
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

fn default_event_channel_capacity() -> usize {
    64
}

impl RawAutoUpdateConfig {
    pub fn new(cache_root: impl Into<PathBuf>) -> Self {
        Self {
            cache_root: cache_root.into(),
            rearm_after_skip: false,
            skip_missing_accounts: false,
            image_open_guard: ImageOpenGuardMode::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

/// Validated configuration.
///
/// Obtain one through `TryFrom<RawAutoUpdateConfig>` or
/// [`crate::config::load_and_validate`].
#[derive(Debug, Clone)]
pub struct AutoUpdateConfig {
    pub cache_root: PathBuf,
    pub rearm_after_skip: bool,
    pub skip_missing_accounts: bool,
    pub image_open_guard: ImageOpenGuardMode,
    pub event_channel_capacity: usize,
}

impl AutoUpdateConfig {
    pub(crate) fn new_unchecked(raw: RawAutoUpdateConfig) -> Self {
        Self {
            cache_root: raw.cache_root,
            rearm_after_skip: raw.rearm_after_skip,
            skip_missing_accounts: raw.skip_missing_accounts,
            image_open_guard: raw.image_open_guard,
            event_channel_capacity: raw.event_channel_capacity,
        }
    }
}
