//! Async RPC transport core.
//!
//! One chokepoint turns every facade call into an authenticated HTTP POST
//! with timeout enforcement, retry-with-backoff on transient failure, and
//! classification of every failure into the [`NexusError`] taxonomy.
//!
//! The transport owns the pooled HTTP connection and the credentials.
//! Facades hold a shared reference and never carry failure logic of their
//! own. A call suspends only the issuing task; concurrent calls on the same
//! transport share the pool with no ordering guarantees among completions.

use crate::config::ClientConfig;
use crate::retry::RetryPolicy;
use nexus_protocol::{jsonrpc, JsonRpcError, JsonRpcRequest, JsonRpcResponse, NexusError, Result};
use reqwest::{header, StatusCode};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Classify a JSON-RPC error object into the taxonomy.
///
/// `-32601`, and `-32602` with an "Unknown method" message, signal a
/// permanent server capability gap and are surfaced distinctly. Application
/// codes map one-to-one. `-32603` and the generic server-error block are
/// transient and retryable.
pub(crate) fn classify_rpc_error(method: &str, error: JsonRpcError) -> NexusError {
    let data_str = |key: &str| -> String {
        error
            .data
            .as_ref()
            .and_then(|d| d.get(key))
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    match error.code {
        jsonrpc::METHOD_NOT_FOUND => NexusError::UnsupportedMethod {
            method: method.to_string(),
        },
        jsonrpc::INVALID_PARAMS if error.message.contains("Unknown method") => {
            NexusError::UnsupportedMethod {
                method: method.to_string(),
            }
        }
        jsonrpc::PARSE_ERROR | jsonrpc::INVALID_REQUEST | jsonrpc::INVALID_PARAMS => {
            NexusError::Validation {
                field: "request".into(),
                reason: error.message,
            }
        }
        jsonrpc::FILE_NOT_FOUND => NexusError::FileNotFound {
            path: data_str("path"),
        },
        jsonrpc::PERMISSION_DENIED => NexusError::PermissionDenied {
            path: data_str("path"),
        },
        jsonrpc::CONFLICT => NexusError::Conflict {
            expected_etag: data_str("expected_etag"),
            current_etag: data_str("current_etag"),
        },
        jsonrpc::INTERNAL_ERROR => NexusError::Connection {
            reason: format!("server error {}: {}", error.code, error.message),
        },
        code if (-32099..=-32000).contains(&code) => NexusError::Connection {
            reason: format!("server error {}: {}", code, error.message),
        },
        code => NexusError::Validation {
            field: "response".into(),
            reason: format!("unrecognized error code {}: {}", code, error.message),
        },
    }
}

/// Classify a non-2xx HTTP status.
pub(crate) fn classify_http_status(status: StatusCode) -> NexusError {
    match status.as_u16() {
        401 | 403 => NexusError::PermissionDenied {
            path: String::new(),
        },
        408 | 429 => NexusError::Connection {
            reason: format!("HTTP {status}"),
        },
        code if code >= 500 => NexusError::Connection {
            reason: format!("HTTP {status}"),
        },
        _ => NexusError::Validation {
            field: "response".into(),
            reason: format!("unexpected HTTP status {status}"),
        },
    }
}

/// Classify a transport-level send/receive failure.
pub(crate) fn classify_transport_error(
    error: &reqwest::Error,
    elapsed: Duration,
    limit: Duration,
) -> NexusError {
    if error.is_timeout() {
        return NexusError::Timeout { elapsed, limit };
    }
    let reason = match std::error::Error::source(error) {
        Some(source) => format!("{error}: {source}"),
        None => error.to_string(),
    };
    NexusError::Connection { reason }
}

/// Decode the HTTP response body into the call's result value.
pub(crate) fn decode_response(method: &str, body: &[u8]) -> Result<Value> {
    let parsed: JsonRpcResponse = serde_json::from_slice(body)
        .map_err(|e| NexusError::invalid_response(format!("malformed JSON-RPC response: {e}")))?;
    match parsed.into_result()? {
        Ok(value) => Ok(value),
        Err(rpc_error) => Err(classify_rpc_error(method, rpc_error)),
    }
}

pub(crate) fn encode_request(method: &str, params: Value) -> Result<Vec<u8>> {
    let request = JsonRpcRequest::new(method, params);
    serde_json::to_vec(&request).map_err(|e| NexusError::Validation {
        field: "params".into(),
        reason: format!("failed to serialize request: {e}"),
    })
}

/// Async RPC transport over a pooled HTTP client.
pub struct RpcTransport {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl RpcTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| NexusError::Connection {
                reason: format!("failed to initialize HTTP client: {e}"),
            })?;
        Ok(Self {
            http,
            endpoint: config.rpc_endpoint(),
            api_key: config.api_key.clone(),
            timeout: config.timeout,
            retry: config.retry.clone(),
        })
    }

    /// Call an idempotent method. Transport failures and timeouts are both
    /// retried under the policy.
    pub async fn call(&self, method: &str, params: Value) -> Result<Value> {
        self.dispatch(method, params, true).await
    }

    /// Call a method with non-replayable side effects. A timed-out attempt is
    /// ambiguous (the request may have been applied server-side), so it
    /// surfaces immediately instead of being retried; failures that occur
    /// before the request reached the server are still retried.
    pub async fn call_guarded(&self, method: &str, params: Value) -> Result<Value> {
        self.dispatch(method, params, false).await
    }

    async fn dispatch(&self, method: &str, params: Value, replayable: bool) -> Result<Value> {
        let body = encode_request(method, params)?;
        let mut last_error = None;

        for attempt in 1..=self.retry.max_attempts() {
            if attempt > 1 {
                let delay = self.retry.delay_for(attempt - 1);
                tracing::debug!(
                    method,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    "retrying rpc call"
                );
                tokio::time::sleep(delay).await;
            }

            match self.send_once(method, &body).await {
                Ok(value) => return Ok(value),
                Err(error) => {
                    let timed_out = matches!(error, NexusError::Timeout { .. });
                    if !error.is_retryable() || (timed_out && !replayable) {
                        return Err(error);
                    }
                    tracing::warn!(method, attempt, error = %error, "rpc attempt failed");
                    last_error = Some(error);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| NexusError::Connection {
            reason: "retry budget exhausted".into(),
        }))
    }

    async fn send_once(&self, method: &str, body: &[u8]) -> Result<Value> {
        let started = Instant::now();
        let mut request = self
            .http
            .post(&self.endpoint)
            .header(header::CONTENT_TYPE, "application/json")
            .body(body.to_vec());
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_transport_error(&e, started.elapsed(), self.timeout))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .await
            .map_err(|e| classify_transport_error(&e, started.elapsed(), self.timeout))?;

        if !status.is_success() {
            return Err(classify_http_status(status));
        }
        decode_response(method, &bytes)
    }
}
