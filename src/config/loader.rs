// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{AutoUpdateConfig, RawAutoUpdateConfig};
use crate::errors::Result;

/// Environment variable overriding [`default_config_path`].
pub const CONFIG_ENV_VAR: &str = "AUTOUPDATE_CONFIG";

/// Load a configuration file and return the raw, unvalidated config.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawAutoUpdateConfig> {
    let contents = fs::read_to_string(path.as_ref())?;
    let config: RawAutoUpdateConfig = toml::from_str(&contents)?;
    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// This is the recommended entry point for embedding applications.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<AutoUpdateConfig> {
    let raw_config = load_from_path(&path)?;
    let config = AutoUpdateConfig::try_from(raw_config)?;
    Ok(config)
}

/// `autoupdate.toml` in the current directory, unless `AUTOUPDATE_CONFIG`
/// points elsewhere.
pub fn default_config_path() -> PathBuf {
    match std::env::var_os(CONFIG_ENV_VAR) {
        Some(p) if !p.is_empty() => PathBuf::from(p),
        _ => PathBuf::from("autoupdate.toml"),
    }
}
