// src/watch/mod.rs

//! File watching and change filtering.
//!
//! This module is responsible for:
//! - Registering individual cached files with a cross-platform filesystem
//!   watcher (`notify`) and turning its events into `FileChanged` events.
//! - Mapping remote coordinates onto local cache paths.
//! - Filtering change events that are side effects of opening a file.
//!
//! It does **not** know about uploads or the watch set; that lives in the
//! engine.

pub mod filter;
pub mod guard;
pub mod mime;
pub mod notifier;
pub mod path_utils;

pub use filter::{build_change_filter, NoopFilter, SpuriousChangeFilter};
pub use guard::{Clock, RecentOpenGuard, SystemClock, RECENT_OPEN_WINDOW_MS};
pub use mime::{ExtensionMimeSniffer, MimeSniffer};
pub use notifier::{Notifier, NotifyNotifier};
pub use path_utils::{base_name_of, parent_of, CacheLayout, LocalPathResolver};
