// src/config/validate.rs

use crate::config::model::{AutoUpdateConfig, RawAutoUpdateConfig};
use crate::errors::{AutoUpdateError, Result};

impl TryFrom<RawAutoUpdateConfig> for AutoUpdateConfig {
    type Error = AutoUpdateError;

    fn try_from(raw: RawAutoUpdateConfig) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(AutoUpdateConfig::new_unchecked(raw))
    }
}

fn validate_raw_config(cfg: &RawAutoUpdateConfig) -> Result<()> {
    if cfg.cache_root.as_os_str().is_empty() {
        return Err(AutoUpdateError::ConfigError(
            "cache_root must not be empty".to_string(),
        ));
    }

    if cfg.event_channel_capacity == 0 {
        return Err(AutoUpdateError::ConfigError(
            "event_channel_capacity must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}
