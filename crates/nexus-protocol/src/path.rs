//! Remote path validation.
//!
//! Paths are validated on the client before any network call, so malformed
//! or root-escaping paths are rejected with zero side effects.

use crate::error::{NexusError, Result};

/// Validate a remote filesystem path.
///
/// Accepted paths are absolute, use `/` separators, and contain no `.` / `..`
/// segments, empty segments, or NUL bytes.
///
/// # Example
///
/// ```
/// use nexus_protocol::validate_path;
///
/// assert!(validate_path("/workspace/notes.txt").is_ok());
/// assert!(validate_path("../etc/passwd").is_err());
/// ```
pub fn validate_path(path: &str) -> Result<()> {
    let reject = |reason: &str| {
        Err(NexusError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        })
    };

    if path.is_empty() {
        return reject("path is empty");
    }
    if path.contains('\0') {
        return reject("path contains a NUL byte");
    }
    if !path.starts_with('/') {
        return reject("path must be absolute");
    }
    for segment in path[1..].split('/') {
        match segment {
            "" if path == "/" => {}
            "" => return reject("path contains an empty segment"),
            "." | ".." => return reject("path escapes the remote root"),
            _ => {}
        }
    }

    Ok(())
}
