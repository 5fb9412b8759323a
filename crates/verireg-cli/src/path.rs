//! Journal path validation.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Extension every journal path must carry.
pub const JOURNAL_EXTENSION: &str = "vrj";

#[derive(Error, Debug)]
pub enum PathError {
    #[error("path is empty")]
    Empty,
    #[error("path contains a NUL byte")]
    Nul,
    #[error("expected a .vrj file")]
    Extension,
    #[error("no such file: {0}")]
    Missing(String),
    #[error("already exists: {0}")]
    Exists(String),
    #[error("not a regular file: {0}")]
    NotAFile(String),
}

/// Checks a user-supplied journal path.
///
/// `must_exist` selects between commands that read an existing registry and
/// `init`, which refuses to overwrite one.
pub fn validate_journal_path(raw: &str, must_exist: bool) -> Result<PathBuf, PathError> {
    if raw.trim().is_empty() {
        return Err(PathError::Empty);
    }
    if raw.contains('\0') {
        return Err(PathError::Nul);
    }
    let path = PathBuf::from(raw);
    if path.extension().and_then(|e| e.to_str()) != Some(JOURNAL_EXTENSION) {
        return Err(PathError::Extension);
    }

    match (path.exists(), must_exist) {
        (false, true) => Err(PathError::Missing(sanitize_path_for_error(&path))),
        (true, false) => Err(PathError::Exists(sanitize_path_for_error(&path))),
        (true, true) if !path.is_file() => Err(PathError::NotAFile(sanitize_path_for_error(&path))),
        _ => Ok(path),
    }
}

/// File name only, so error output does not leak directory layout.
pub fn sanitize_path_for_error(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "<journal>".to_string())
}
