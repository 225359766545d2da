//! JSON-RPC 2.0 envelope types.
//!
//! # Error Codes
//!
//! Standard JSON-RPC 2.0 codes:
//! - `-32700`: Parse error
//! - `-32600`: Invalid request
//! - `-32601`: Method not found
//! - `-32602`: Invalid params
//! - `-32603`: Internal error
//! - `-32000` to `-32099`: Server error
//!
//! Nexus application codes (carried back with structured `data`):
//! - `-32010`: file not found (`data.path`)
//! - `-32011`: permission denied (`data.path`)
//! - `-32012`: write conflict (`data.expected_etag`, `data.current_etag`)

use crate::error::{NexusError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Per-request correlation token.
pub type RequestId = u64;

static REQUEST_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// JSON-RPC 2.0 request.
///
/// Immutable once built; the transport serializes it exactly once and reuses
/// the bytes across retry attempts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,
    /// Name of the method to invoke
    pub method: String,
    /// Parameter mapping. Credentials never appear here.
    pub params: Value,
    /// Correlation token for matching responses to requests
    pub id: RequestId,
}

impl JsonRpcRequest {
    /// Build a request with a fresh correlation token.
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        JsonRpcRequest {
            jsonrpc: "2.0".into(),
            method: method.into(),
            params,
            id: generate_request_id(),
        }
    }
}

/// JSON-RPC 2.0 response. Exactly one of `result`/`error` is present;
/// [`JsonRpcResponse::into_result`] enforces that.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub result: Option<Value>,
    pub error: Option<JsonRpcError>,
    pub id: RequestId,
}

/// JSON-RPC 2.0 error object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    pub data: Option<Value>,
}

// Standard JSON-RPC 2.0 error codes
pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Nexus application error codes
pub const FILE_NOT_FOUND: i32 = -32010;
pub const PERMISSION_DENIED: i32 = -32011;
pub const CONFLICT: i32 = -32012;

impl JsonRpcError {
    pub fn method_not_found() -> Self {
        Self {
            code: METHOD_NOT_FOUND,
            message: "Method not found".into(),
            data: None,
        }
    }

    pub fn invalid_params(msg: &str) -> Self {
        Self {
            code: INVALID_PARAMS,
            message: msg.into(),
            data: None,
        }
    }

    pub fn internal_error(msg: &str) -> Self {
        Self {
            code: INTERNAL_ERROR,
            message: msg.into(),
            data: None,
        }
    }

    pub fn file_not_found(path: &str) -> Self {
        Self {
            code: FILE_NOT_FOUND,
            message: format!("File not found: {path}"),
            data: Some(serde_json::json!({ "path": path })),
        }
    }

    pub fn permission_denied(path: &str) -> Self {
        Self {
            code: PERMISSION_DENIED,
            message: format!("Permission denied: {path}"),
            data: Some(serde_json::json!({ "path": path })),
        }
    }

    pub fn conflict(expected_etag: &str, current_etag: &str) -> Self {
        Self {
            code: CONFLICT,
            message: "Write conflict".into(),
            data: Some(serde_json::json!({
                "expected_etag": expected_etag,
                "current_etag": current_etag,
            })),
        }
    }
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            result: Some(result),
            error: None,
            id,
        }
    }

    pub fn error(id: RequestId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            result: None,
            error: Some(error),
            id,
        }
    }

    /// Split the response into its success value or its error object,
    /// rejecting envelopes that carry both or neither.
    pub fn into_result(self) -> Result<std::result::Result<Value, JsonRpcError>> {
        match (self.result, self.error) {
            (Some(value), None) => Ok(Ok(value)),
            (None, Some(err)) => Ok(Err(err)),
            (Some(_), Some(_)) => Err(NexusError::invalid_response(
                "response carries both result and error",
            )),
            (None, None) => Err(NexusError::invalid_response(
                "response carries neither result nor error",
            )),
        }
    }
}

fn generate_request_id() -> RequestId {
    let timestamp = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);

    // Counter in the low bits keeps ids unique even within one nanosecond.
    let counter = REQUEST_ID_COUNTER.fetch_add(1, Ordering::SeqCst);

    (timestamp & 0xFFFFFFFF00000000) | (counter & 0xFFFFFFFF)
}
