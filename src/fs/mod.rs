// src/fs/mod.rs

use std::fmt::Debug;
use std::path::Path;

pub mod mock;

/// The slice of the filesystem the watcher needs: "is the cached copy still
/// there?".
pub trait FileSystem: Send + Sync + Debug {
    fn exists(&self, path: &Path) -> bool;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}
