// tests/config_loading.rs

use std::io::Write;
use std::path::PathBuf;

use tempfile::NamedTempFile;
use autoupdate::config::{load_and_validate, AutoUpdateConfig, RawAutoUpdateConfig};
use autoupdate::engine::WatcherOptions;
use autoupdate::errors::AutoUpdateError;
use autoupdate::types::ImageOpenGuardMode;

#[test]
fn minimal_config_uses_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, r#"cache_root = "/var/cache/files""#).unwrap();

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.cache_root, PathBuf::from("/var/cache/files"));
    assert!(!cfg.rearm_after_skip);
    assert!(!cfg.skip_missing_accounts);
    assert_eq!(cfg.image_open_guard, ImageOpenGuardMode::Auto);
    assert_eq!(cfg.event_channel_capacity, 64);
}

#[test]
fn full_config_is_parsed() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
cache_root = "/tmp/cache"
rearm_after_skip = true
skip_missing_accounts = true
image_open_guard = "disabled"
event_channel_capacity = 8
"#
    )
    .unwrap();

    let cfg = load_and_validate(file.path()).unwrap();
    let options = WatcherOptions::from(&cfg);

    assert!(options.rearm_after_skip);
    assert!(options.skip_missing_accounts);
    assert_eq!(cfg.image_open_guard, ImageOpenGuardMode::Disabled);
    assert_eq!(cfg.event_channel_capacity, 8);
}

#[test]
fn zero_channel_capacity_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
cache_root = "/tmp/cache"
event_channel_capacity = 0
"#
    )
    .unwrap();

    match load_and_validate(file.path()) {
        Err(AutoUpdateError::ConfigError(msg)) => assert!(msg.contains("event_channel_capacity")),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}

#[test]
fn empty_cache_root_is_rejected() {
    let result = AutoUpdateConfig::try_from(RawAutoUpdateConfig::new(""));
    assert!(matches!(result, Err(AutoUpdateError::ConfigError(_))));
}

#[test]
fn unknown_guard_mode_is_a_toml_error() {
    let mut file = NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
cache_root = "/tmp/cache"
image_open_guard = "sometimes"
"#
    )
    .unwrap();

    assert!(matches!(
        load_and_validate(file.path()),
        Err(AutoUpdateError::TomlError(_))
    ));
}

#[test]
fn missing_file_is_an_io_error() {
    assert!(matches!(
        load_and_validate("/definitely/not/here/autoupdate.toml"),
        Err(AutoUpdateError::IoError(_))
    ));
}

#[test]
fn guard_mode_from_str() {
    assert_eq!("Enabled".parse::<ImageOpenGuardMode>(), Ok(ImageOpenGuardMode::Enabled));
    assert!("maybe".parse::<ImageOpenGuardMode>().is_err());
}
