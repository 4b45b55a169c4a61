// src/watch/mime.rs

use std::fmt::Debug;
use std::path::Path;

/// Resolves the content type of a file.
pub trait MimeSniffer: Send + Sync + Debug {
    fn mime_type_of(&self, path: &Path) -> String;
}

/// Guesses from the file extension; unknown extensions map to
/// `application/octet-stream`.
#[derive(Debug, Clone, Default)]
pub struct ExtensionMimeSniffer;

impl MimeSniffer for ExtensionMimeSniffer {
    fn mime_type_of(&self, path: &Path) -> String {
        mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }
}
