//! Request shaping and result decoding for every RPC method.
//!
//! Both the async and blocking clients build their params maps and decode
//! their results through this module, so the two variants serialize
//! byte-identical wire requests for the same logical call. All argument
//! validation happens here, before any network attempt.

use base64::prelude::*;
use nexus_protocol::{validate_path, NexusError, Result};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

/// Upper bound on memory query/search page sizes.
pub(crate) const MAX_LIMIT: u32 = 1000;
/// Upper bound on sandbox execution timeouts, in seconds.
pub(crate) const MAX_SANDBOX_TIMEOUT_SECS: u64 = 600;

/// Wire method names, shared by both client variants.
pub(crate) mod methods {
    pub const READ: &str = "read";
    pub const WRITE: &str = "write";
    pub const DELETE: &str = "delete";
    pub const EXISTS: &str = "exists";
    pub const STAT: &str = "stat";
    pub const GET_ETAG: &str = "get_etag";
    pub const LIST: &str = "list";
    pub const GLOB: &str = "glob";
    pub const GREP: &str = "grep";

    pub const SANDBOX_CREATE: &str = "sandbox_create";
    pub const SANDBOX_RUN: &str = "sandbox_run";
    pub const SANDBOX_STATUS: &str = "sandbox_status";
    pub const SANDBOX_TERMINATE: &str = "sandbox_terminate";

    pub const MEMORY_STORE: &str = "store_memory";
    pub const MEMORY_QUERY: &str = "query_memories";
    pub const MEMORY_SEARCH: &str = "search_memories";
    pub const MEMORY_LIST: &str = "list_memories";
    pub const MEMORY_RETRIEVE: &str = "retrieve_memory";

    pub const SKILLS_LIST: &str = "skills_list";
    pub const SKILLS_INFO: &str = "skills_info";
    pub const SKILLS_SEARCH: &str = "skills_search";
}

fn invalid(field: &str, reason: impl Into<String>) -> NexusError {
    NexusError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

fn require_non_empty(field: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(invalid(field, "must not be empty"));
    }
    Ok(())
}

fn validate_limit(limit: u32) -> Result<()> {
    if limit == 0 || limit > MAX_LIMIT {
        return Err(invalid("limit", format!("must be in 1..={MAX_LIMIT}")));
    }
    Ok(())
}

/// Per-method params builders. Key order here is the wire order.
pub(crate) mod params {
    use super::*;
    use nexus_protocol::SandboxLanguage;

    pub fn path_only(path: &str) -> Result<Value> {
        validate_path(path)?;
        Ok(json!({ "path": path }))
    }

    pub fn write(path: &str, content: &[u8], if_match: Option<&str>) -> Result<Value> {
        validate_path(path)?;
        let mut params = json!({
            "path": path,
            "content": BASE64_STANDARD.encode(content),
        });
        if let Some(etag) = if_match {
            require_non_empty("if_match", etag)?;
            params["if_match"] = json!(etag);
        }
        Ok(params)
    }

    pub fn list(path: &str, recursive: bool, details: bool) -> Result<Value> {
        validate_path(path)?;
        Ok(json!({ "path": path, "recursive": recursive, "details": details }))
    }

    pub fn glob(pattern: &str, path: &str) -> Result<Value> {
        require_non_empty("pattern", pattern)?;
        validate_path(path)?;
        Ok(json!({ "pattern": pattern, "path": path }))
    }

    pub fn grep(pattern: &str, path: &str, file_pattern: Option<&str>) -> Result<Value> {
        require_non_empty("pattern", pattern)?;
        validate_path(path)?;
        let mut params = json!({ "pattern": pattern, "path": path });
        if let Some(fp) = file_pattern {
            require_non_empty("file_pattern", fp)?;
            params["file_pattern"] = json!(fp);
        }
        Ok(params)
    }

    pub fn sandbox_create(language: SandboxLanguage) -> Result<Value> {
        Ok(json!({ "language": language }))
    }

    pub fn sandbox_run(sandbox_id: &str, code: &str, timeout_secs: u64) -> Result<Value> {
        require_non_empty("sandbox_id", sandbox_id)?;
        require_non_empty("code", code)?;
        if timeout_secs == 0 || timeout_secs > MAX_SANDBOX_TIMEOUT_SECS {
            return Err(invalid(
                "timeout_secs",
                format!("must be in 1..={MAX_SANDBOX_TIMEOUT_SECS}"),
            ));
        }
        Ok(json!({ "sandbox_id": sandbox_id, "code": code, "timeout": timeout_secs }))
    }

    pub fn sandbox_id(sandbox_id: &str) -> Result<Value> {
        require_non_empty("sandbox_id", sandbox_id)?;
        Ok(json!({ "sandbox_id": sandbox_id }))
    }

    pub fn memory_store(content: &str, metadata: Option<Value>) -> Result<Value> {
        require_non_empty("content", content)?;
        let mut params = json!({ "content": content });
        if let Some(metadata) = metadata {
            if !metadata.is_object() {
                return Err(invalid("metadata", "must be a JSON object"));
            }
            params["metadata"] = metadata;
        }
        Ok(params)
    }

    pub fn limit_only(limit: u32) -> Result<Value> {
        validate_limit(limit)?;
        Ok(json!({ "limit": limit }))
    }

    pub fn query(query: &str, limit: u32) -> Result<Value> {
        validate_limit(limit)?;
        Ok(json!({ "query": query, "limit": limit }))
    }

    pub fn memory_retrieve(namespace: &str, key: &str) -> Result<Value> {
        require_non_empty("namespace", namespace)?;
        require_non_empty("key", key)?;
        Ok(json!({ "namespace": namespace, "key": key }))
    }

    pub fn skill_name(name: &str) -> Result<Value> {
        require_non_empty("name", name)?;
        Ok(json!({ "name": name }))
    }

    pub fn empty() -> Result<Value> {
        Ok(json!({}))
    }
}

/// Typed result decoding. A shape mismatch is a validation failure, never a
/// silent coercion.
pub(crate) mod decode {
    use super::*;

    pub fn typed<T: DeserializeOwned>(method: &str, value: Value) -> Result<T> {
        serde_json::from_value(value).map_err(|e| {
            invalid(
                "response",
                format!("unexpected result shape for '{method}': {e}"),
            )
        })
    }

    /// Decode a `read` result: `{"content": "<base64>"}`.
    pub fn file_content(value: Value) -> Result<Vec<u8>> {
        let encoded = value
            .get("content")
            .and_then(Value::as_str)
            .ok_or_else(|| invalid("response", "read result is missing 'content'"))?;
        BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| invalid("response", format!("content is not valid base64: {e}")))
    }

    /// Decode an `{"etag": ...}` result to the bare token.
    pub fn etag(value: Value) -> Result<String> {
        value
            .get("etag")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| invalid("response", "result is missing 'etag'"))
    }

    /// Decode a single boolean result field, e.g. `{"exists": true}`.
    pub fn bool_field(value: Value, field: &str) -> Result<bool> {
        value
            .get(field)
            .and_then(Value::as_bool)
            .ok_or_else(|| invalid("response", format!("result is missing '{field}'")))
    }

    /// Decode a `store_memory` result: `{"memory_id": ...}`.
    pub fn memory_id(value: Value) -> Result<String> {
        value
            .get("memory_id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| invalid("response", "result is missing 'memory_id'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nexus_protocol::SandboxLanguage;

    #[test]
    fn test_write_params_key_names() {
        let params = params::write("/a.txt", b"hello", Some("v1")).unwrap();
        assert_eq!(params["path"], "/a.txt");
        assert_eq!(params["content"], BASE64_STANDARD.encode(b"hello"));
        assert_eq!(params["if_match"], "v1");
    }

    #[test]
    fn test_write_params_omit_if_match() {
        let params = params::write("/a.txt", b"hello", None).unwrap();
        assert!(params.get("if_match").is_none());
    }

    #[test]
    fn test_write_rejects_empty_if_match() {
        let err = params::write("/a.txt", b"x", Some("")).unwrap_err();
        assert!(matches!(err, NexusError::Validation { .. }));
    }

    #[test]
    fn test_path_validation_rejects_traversal() {
        let err = params::path_only("../etc/passwd").unwrap_err();
        assert!(matches!(err, NexusError::InvalidPath { .. }));
    }

    #[test]
    fn test_params_serialize_identically_per_call() {
        // The wire-identical guarantee both client variants rely on.
        let a = params::write("/a.txt", b"data", Some("v3")).unwrap();
        let b = params::write("/a.txt", b"data", Some("v3")).unwrap();
        assert_eq!(
            serde_json::to_vec(&a).unwrap(),
            serde_json::to_vec(&b).unwrap()
        );
    }

    #[test]
    fn test_sandbox_run_bounds() {
        assert!(params::sandbox_run("sb-1", "print(1)", 0).is_err());
        assert!(params::sandbox_run("sb-1", "print(1)", 601).is_err());
        assert!(params::sandbox_run("sb-1", "print(1)", 600).is_ok());
        assert!(params::sandbox_run("", "print(1)", 10).is_err());
        assert!(params::sandbox_run("sb-1", "", 10).is_err());
    }

    #[test]
    fn test_sandbox_create_language_wire_value() {
        let params = params::sandbox_create(SandboxLanguage::Python).unwrap();
        assert_eq!(params["language"], "python");
    }

    #[test]
    fn test_limit_bounds() {
        assert!(params::limit_only(0).is_err());
        assert!(params::limit_only(1001).is_err());
        assert!(params::limit_only(1000).is_ok());
    }

    #[test]
    fn test_memory_store_rejects_non_object_metadata() {
        let err = params::memory_store("note", Some(serde_json::json!([1, 2]))).unwrap_err();
        assert!(matches!(err, NexusError::Validation { .. }));
    }

    #[test]
    fn test_decode_file_content_round_trip() {
        let content = b"Hello from nexus-client!";
        let value = serde_json::json!({ "content": BASE64_STANDARD.encode(content) });
        assert_eq!(decode::file_content(value).unwrap(), content);
    }

    #[test]
    fn test_decode_file_content_rejects_bad_base64() {
        let value = serde_json::json!({ "content": "not base64!!" });
        assert!(decode::file_content(value).is_err());
    }

    #[test]
    fn test_decode_typed_shape_mismatch() {
        let value = serde_json::json!({ "unexpected": true });
        let result: Result<nexus_protocol::WriteResult> = decode::typed("write", value);
        assert!(matches!(result, Err(NexusError::Validation { .. })));
    }
}
