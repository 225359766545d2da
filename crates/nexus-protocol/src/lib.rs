//! Nexus Protocol Types
//!
//! This crate provides the wire protocol and shared type definitions for the
//! Nexus RPC client:
//!
//! - **[`jsonrpc`]** - JSON-RPC 2.0 envelope (request, response, error object)
//!   and the server's error-code conventions
//! - **[`error`]** - the closed [`NexusError`] taxonomy every public failure
//!   maps into
//! - **[`path`]** - remote path validation, applied before any network call
//! - **[`types`]** - typed results for file, sandbox, memory, and skills
//!   operations
//!
//! # Wire Protocol
//!
//! Requests are JSON-RPC 2.0 over HTTP POST:
//! `{"jsonrpc": "2.0", "method": "...", "params": {...}, "id": ...}`.
//! Responses carry exactly one of `result` or `error{code, message, data}`.
//!
//! # Example
//!
//! ```
//! use nexus_protocol::{JsonRpcRequest, JsonRpcResponse};
//! use serde_json::json;
//!
//! let request = JsonRpcRequest::new("stat", json!({"path": "/workspace/a.txt"}));
//! let response = JsonRpcResponse::success(request.id, json!({"size": 5}));
//! assert!(response.error.is_none());
//! ```

pub mod error;
pub mod jsonrpc;
pub mod path;
pub mod types;

pub use error::{NexusError, Result};
pub use jsonrpc::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
pub use path::validate_path;
pub use types::{
    FileEntry, FileStat, GrepMatch, GrepResult, MemoryRecord, SandboxInfo, SandboxLanguage,
    SandboxOutput, SandboxState, Skill, SkillCatalog, SkillTier, WriteResult,
};
