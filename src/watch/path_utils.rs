// src/watch/path_utils.rs

//! Path helpers: mapping remote `(repo_id, path_in_repo)` coordinates onto
//! the local cache directory, and splitting remote paths.
//!
//! Remote paths always use `/` as separator and are rooted at `/`.

use std::path::{Component, Path, PathBuf};

/// Derives the local cache path of a remote file.
///
/// Implementations must be pure: the same coordinates always map to the
/// same local path, across restarts.
pub trait LocalPathResolver: Send + Sync {
    fn local_cache_path(&self, repo_id: &str, path_in_repo: &str) -> PathBuf;
}

/// Default cache layout: `<root>/<repo_id>/<path_in_repo>`.
#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl LocalPathResolver for CacheLayout {
    fn local_cache_path(&self, repo_id: &str, path_in_repo: &str) -> PathBuf {
        let mut path = self.root.join(repo_id);
        // Only plain segments; `..` must not let a remote path escape the
        // cache directory.
        for segment in path_in_repo.split('/') {
            if matches!(Path::new(segment).components().next(), Some(Component::Normal(_))) {
                path.push(segment);
            }
        }
        path
    }
}

/// Parent directory of a remote path.
///
/// `"/docs/x.txt"` -> `"/docs"`, `"/x.txt"` -> `"/"`.
pub fn parent_of(path_in_repo: &str) -> String {
    let trimmed = path_in_repo.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => trimmed[..idx].to_string(),
    }
}

/// Final component of a local path, or an empty string when there is none.
pub fn base_name_of(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Join a remote directory and a file name.
pub fn join_repo_path(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}
