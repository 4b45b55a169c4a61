// src/watch/guard.rs

use std::collections::HashMap;
use std::fmt::Debug;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, info};

use crate::watch::filter::SpuriousChangeFilter;
use crate::watch::mime::{ExtensionMimeSniffer, MimeSniffer};

/// How long an image open masks change events for that file.
pub const RECENT_OPEN_WINDOW_MS: i64 = 10_000;

/// Millisecond wall clock.
pub trait Clock: Send + Sync + Debug {
    fn now_millis(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Remembers which image files were opened in the last
/// [`RECENT_OPEN_WINDOW_MS`] milliseconds.
#[derive(Debug)]
pub struct RecentOpenGuard {
    images: HashMap<PathBuf, i64>,
    clock: Arc<dyn Clock>,
    sniffer: Box<dyn MimeSniffer>,
}

impl Default for RecentOpenGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RecentOpenGuard {
    pub fn new() -> Self {
        Self::with_parts(Arc::new(SystemClock), Box::new(ExtensionMimeSniffer))
    }

    pub fn with_parts(clock: Arc<dyn Clock>, sniffer: Box<dyn MimeSniffer>) -> Self {
        Self {
            images: HashMap::new(),
            clock,
            sniffer,
        }
    }

    /// Record an open of `path`. Non-image files are ignored.
    pub fn file_opened(&mut self, path: &Path) {
        let mime = self.sniffer.mime_type_of(path);
        if !mime.starts_with("image") {
            return;
        }

        let now = self.clock.now_millis();
        self.images.retain(|_, ts| now < *ts + RECENT_OPEN_WINDOW_MS);
        info!(?path, %mime, "recorded image open");
        self.images.insert(path.to_path_buf(), now);
    }

    pub fn is_recent_opened_image(&self, path: &Path) -> bool {
        let Some(ts) = self.images.get(path) else {
            return false;
        };
        if self.clock.now_millis() < ts + RECENT_OPEN_WINDOW_MS {
            debug!(?path, "change event within image open window");
            true
        } else {
            false
        }
    }

    /// Number of stored entries, expired ones included.
    pub fn tracked_len(&self) -> usize {
        self.images.len()
    }
}

impl SpuriousChangeFilter for RecentOpenGuard {
    fn file_opened(&mut self, path: &Path) {
        RecentOpenGuard::file_opened(self, path);
    }

    fn is_spurious(&self, path: &Path) -> bool {
        self.is_recent_opened_image(path)
    }
}
