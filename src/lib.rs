// src/lib.rs

//! Re-uploads locally modified copies of cached remote files.
//!
//! The crate wires together:
//! - a watch set of cached files, populated from the cache store at startup
//!   and whenever a file gets cached
//! - a platform file notifier (`notify`) reporting changes on those files
//! - a spurious-change filter for image files that were merely opened
//! - an upload backend that writes a changed file back to its repo
//!
//! Use [`spawn_service`] to run it; the returned [`ServiceHandle`] publishes
//! a [`types::FileUpdated`] for every successful re-upload.

pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod service;
pub mod store;
pub mod types;
pub mod upload;
pub mod watch;

pub use service::{spawn_service, spawn_service_with_notifier, Collaborators, ServiceHandle};
