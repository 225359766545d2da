//! Error taxonomy for the Nexus client.
//!
//! Every failure crossing the public API boundary is one of these variants.
//! Raw transport or serialization errors are classified into the taxonomy by
//! the transport core and never leak unwrapped.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NexusError {
    /// Path failed client-side validation. Raised before any network call.
    #[error("invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Server reports the resource absent.
    #[error("file not found: {path}")]
    FileNotFound { path: String },

    /// Server reports an authorization failure.
    #[error("permission denied: {path}")]
    PermissionDenied { path: String },

    /// Malformed request argument or response shape. Raised locally.
    #[error("validation failed for {field}: {reason}")]
    Validation { field: String, reason: String },

    /// The server does not implement the requested method. A permanent
    /// capability mismatch, never retried.
    #[error("server does not support method '{method}'")]
    UnsupportedMethod { method: String },

    /// Optimistic-write precondition failed: the resource's current version
    /// token no longer matches the one the caller read.
    #[error("write conflict: expected etag '{expected_etag}', current etag '{current_etag}'")]
    Conflict {
        expected_etag: String,
        current_etag: String,
    },

    /// The server could not be reached after the retry budget was exhausted.
    /// Carries the last underlying cause.
    #[error("connection failed: {reason}")]
    Connection { reason: String },

    /// The per-call deadline was exceeded.
    #[error("request timed out after {elapsed:?} (limit {limit:?})")]
    Timeout { elapsed: Duration, limit: Duration },
}

impl NexusError {
    /// Whether the transport core may retry a call that failed with this
    /// error. Only transport-origin and deadline-origin failures qualify;
    /// application errors are final on the first response.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            NexusError::Connection { .. } | NexusError::Timeout { .. }
        )
    }

    /// Shorthand for a response-shape validation failure.
    pub fn invalid_response(reason: impl Into<String>) -> Self {
        NexusError::Validation {
            field: "response".into(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, NexusError>;
