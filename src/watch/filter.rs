// src/watch/filter.rs

//! Spurious-change filtering.
//!
//! Some platforms report a change on a file that was merely opened (the
//! macOS image preview is the known offender). The watcher consults a
//! [`SpuriousChangeFilter`] before acting on a change event, and forwards
//! file-open observations to it.

use std::path::Path;

use crate::types::ImageOpenGuardMode;
use crate::watch::guard::RecentOpenGuard;

pub trait SpuriousChangeFilter: Send {
    /// Record that `path` was opened by the user.
    fn file_opened(&mut self, path: &Path);

    /// Whether a change event for `path` should be treated as noise.
    fn is_spurious(&self, path: &Path) -> bool;
}

/// Filter for platforms without the false-change problem.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopFilter;

impl SpuriousChangeFilter for NoopFilter {
    fn file_opened(&mut self, _path: &Path) {}

    fn is_spurious(&self, _path: &Path) -> bool {
        false
    }
}

/// Pick the filter for the configured mode.
pub fn build_change_filter(mode: ImageOpenGuardMode) -> Box<dyn SpuriousChangeFilter> {
    if mode.is_active() {
        Box::new(RecentOpenGuard::new())
    } else {
        Box::new(NoopFilter)
    }
}
