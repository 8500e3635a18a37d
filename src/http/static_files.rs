//! Mapping request paths onto the document root.

use std::path::{Path, PathBuf};

/// What `lstat` says about a resolved path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    pub path: PathBuf,
    pub exists: bool,
    pub is_regular: bool,
    pub size: u64,
}

impl FileInfo {
    /// Symbolic links are not followed, so a link never counts as a regular file.
    pub async fn stat(path: PathBuf) -> Self {
        match tokio::fs::symlink_metadata(&path).await {
            Ok(meta) => Self {
                exists: true,
                is_regular: meta.file_type().is_file(),
                size: meta.len(),
                path,
            },
            Err(_) => Self {
                path,
                exists: false,
                is_regular: false,
                size: 0,
            },
        }
    }

    pub fn is_servable(&self) -> bool {
        self.exists && self.is_regular
    }
}

/// Joins `request_path` onto `root`.
///
/// The query string and fragment are dropped, `.` and empty segments are
/// skipped. Returns `None` if any segment is `..`.
pub fn resolve_path(root: &Path, request_path: &str) -> Option<PathBuf> {
    let path = request_path
        .split(['?', '#'])
        .next()
        .unwrap_or(request_path);

    let mut resolved = root.to_path_buf();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => return None,
            name => resolved.push(name),
        }
    }

    Some(resolved)
}
