//! Blocking client variant.
//!
//! Same wire behavior as the async client, built on a dedicated blocking
//! HTTP pool. Request shaping, decoding, and failure classification are the
//! shared code paths, so a given logical call serializes the same bytes from
//! either variant. The two pool types are never mixed.
//!
//! Must not be used from within an async runtime; calls park the current
//! thread.

use crate::config::ClientConfig;
use crate::retry::RetryPolicy;
use crate::shape::{decode, methods, params};
use crate::transport::{classify_http_status, classify_transport_error, decode_response, encode_request};
use nexus_protocol::{
    FileEntry, FileStat, GrepResult, MemoryRecord, NexusError, Result, SandboxInfo,
    SandboxLanguage, SandboxOutput, Skill, SkillCatalog, WriteResult,
};
use reqwest::header;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Blocking RPC transport over a pooled blocking HTTP client.
pub(crate) struct RpcTransport {
    http: reqwest::blocking::Client,
    endpoint: String,
    api_key: Option<String>,
    timeout: Duration,
    retry: RetryPolicy,
}

impl RpcTransport {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let http = reqwest::blocking::Client::builder()
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

    pub fn call(&self, method: &str, params: Value) -> Result<Value> {
        self.dispatch(method, params, true)
    }

    pub fn call_guarded(&self, method: &str, params: Value) -> Result<Value> {
        self.dispatch(method, params, false)
    }

    fn dispatch(&self, method: &str, params: Value, replayable: bool) -> Result<Value> {
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
                std::thread::sleep(delay);
            }

            match self.send_once(method, &body) {
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

    fn send_once(&self, method: &str, body: &[u8]) -> Result<Value> {
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
            .map_err(|e| classify_transport_error(&e, started.elapsed(), self.timeout))?;
        let status = response.status();
        let bytes = response
            .bytes()
            .map_err(|e| classify_transport_error(&e, started.elapsed(), self.timeout))?;

        if !status.is_success() {
            return Err(classify_http_status(status));
        }
        decode_response(method, &bytes)
    }
}

/// Blocking client for a remote Nexus server.
///
/// Clones share one blocking HTTP pool.
///
/// ```no_run
/// # fn demo() -> nexus_client::Result<()> {
/// let client = nexus_client::blocking::NexusClient::connect("http://localhost:8080", None)?;
/// let entries = client.list("/workspace", false)?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct NexusClient {
    transport: Arc<RpcTransport>,
}

impl NexusClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self {
            transport: Arc::new(RpcTransport::new(&config)?),
        })
    }

    pub fn connect(server_url: impl Into<String>, api_key: Option<&str>) -> Result<Self> {
        let mut config = ClientConfig::new(server_url);
        if let Some(key) = api_key {
            config = config.with_api_key(key);
        }
        Self::new(config)
    }

    /// Consume this handle. The connection pool is released once the last
    /// clone is gone; dropping has the same effect.
    pub fn close(self) {}

    pub fn read(&self, path: &str) -> Result<Vec<u8>> {
        let value = self.transport.call(methods::READ, params::path_only(path)?)?;
        decode::file_content(value)
    }

    pub fn write(&self, path: &str, content: &[u8]) -> Result<WriteResult> {
        let value = self
            .transport
            .call_guarded(methods::WRITE, params::write(path, content, None)?)?;
        decode::typed(methods::WRITE, value)
    }

    pub fn write_if_match(
        &self,
        path: &str,
        content: &[u8],
        if_match: &str,
    ) -> Result<WriteResult> {
        let value = self
            .transport
            .call_guarded(methods::WRITE, params::write(path, content, Some(if_match))?)?;
        decode::typed(methods::WRITE, value)
    }

    pub fn delete(&self, path: &str) -> Result<()> {
        self.transport
            .call_guarded(methods::DELETE, params::path_only(path)?)?;
        Ok(())
    }

    pub fn exists(&self, path: &str) -> Result<bool> {
        let value = self
            .transport
            .call(methods::EXISTS, params::path_only(path)?)?;
        decode::bool_field(value, "exists")
    }

    pub fn stat(&self, path: &str) -> Result<FileStat> {
        let value = self.transport.call(methods::STAT, params::path_only(path)?)?;
        decode::typed(methods::STAT, value)
    }

    pub fn get_etag(&self, path: &str) -> Result<String> {
        let value = self
            .transport
            .call(methods::GET_ETAG, params::path_only(path)?)?;
        decode::etag(value)
    }

    pub fn list(&self, path: &str, recursive: bool) -> Result<Vec<String>> {
        let value = self
            .transport
            .call(methods::LIST, params::list(path, recursive, false)?)?;
        decode::typed(methods::LIST, value)
    }

    pub fn list_detailed(&self, path: &str, recursive: bool) -> Result<Vec<FileEntry>> {
        let value = self
            .transport
            .call(methods::LIST, params::list(path, recursive, true)?)?;
        decode::typed(methods::LIST, value)
    }

    pub fn glob(&self, pattern: &str, path: &str) -> Result<Vec<String>> {
        let value = self
            .transport
            .call(methods::GLOB, params::glob(pattern, path)?)?;
        decode::typed(methods::GLOB, value)
    }

    pub fn grep(
        &self,
        pattern: &str,
        path: &str,
        file_pattern: Option<&str>,
    ) -> Result<Vec<GrepResult>> {
        let value = self
            .transport
            .call(methods::GREP, params::grep(pattern, path, file_pattern)?)?;
        decode::typed(methods::GREP, value)
    }

    pub fn skills_list(&self) -> Result<SkillCatalog> {
        self.skills().list()
    }

    pub fn call_rpc(&self, method: &str, rpc_params: Value) -> Result<Value> {
        self.transport.call(method, rpc_params)
    }

    pub fn memory(&self) -> RemoteMemory<'_> {
        RemoteMemory {
            transport: &self.transport,
        }
    }

    pub fn skills(&self) -> RemoteSkills<'_> {
        RemoteSkills {
            transport: &self.transport,
        }
    }

    pub fn sandbox(&self) -> RemoteSandbox<'_> {
        RemoteSandbox {
            transport: &self.transport,
        }
    }
}

impl std::fmt::Debug for NexusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NexusClient").finish_non_exhaustive()
    }
}

/// Blocking memory operations handle.
pub struct RemoteMemory<'a> {
    transport: &'a RpcTransport,
}

impl RemoteMemory<'_> {
    pub fn store(&self, content: &str, metadata: Option<Value>) -> Result<String> {
        let value = self
            .transport
            .call_guarded(methods::MEMORY_STORE, params::memory_store(content, metadata)?)?;
        decode::memory_id(value)
    }

    pub fn query(&self, limit: u32) -> Result<Vec<MemoryRecord>> {
        let value = self
            .transport
            .call(methods::MEMORY_QUERY, params::limit_only(limit)?)?;
        decode::typed(methods::MEMORY_QUERY, value)
    }

    pub fn search(&self, query: &str, limit: u32) -> Result<Vec<MemoryRecord>> {
        let value = self
            .transport
            .call(methods::MEMORY_SEARCH, params::query(query, limit)?)?;
        decode::typed(methods::MEMORY_SEARCH, value)
    }

    pub fn list(&self, limit: u32) -> Result<Vec<MemoryRecord>> {
        let value = self
            .transport
            .call(methods::MEMORY_LIST, params::limit_only(limit)?)?;
        decode::typed(methods::MEMORY_LIST, value)
    }

    pub fn retrieve(&self, namespace: &str, key: &str) -> Result<MemoryRecord> {
        let value = self
            .transport
            .call(methods::MEMORY_RETRIEVE, params::memory_retrieve(namespace, key)?)?;
        decode::typed(methods::MEMORY_RETRIEVE, value)
    }
}

/// Blocking skill catalog handle.
pub struct RemoteSkills<'a> {
    transport: &'a RpcTransport,
}

impl RemoteSkills<'_> {
    pub fn list(&self) -> Result<SkillCatalog> {
        let value = self.transport.call(methods::SKILLS_LIST, params::empty()?)?;
        decode::typed(methods::SKILLS_LIST, value)
    }

    pub fn info(&self, name: &str) -> Result<Skill> {
        let value = self
            .transport
            .call(methods::SKILLS_INFO, params::skill_name(name)?)?;
        decode::typed(methods::SKILLS_INFO, value)
    }

    pub fn search(&self, query: &str, limit: u32) -> Result<SkillCatalog> {
        let value = self
            .transport
            .call(methods::SKILLS_SEARCH, params::query(query, limit)?)?;
        decode::typed(methods::SKILLS_SEARCH, value)
    }
}

/// Blocking sandbox lifecycle handle.
pub struct RemoteSandbox<'a> {
    transport: &'a RpcTransport,
}

impl RemoteSandbox<'_> {
    pub fn create(&self, language: SandboxLanguage) -> Result<SandboxInfo> {
        let value = self
            .transport
            .call_guarded(methods::SANDBOX_CREATE, params::sandbox_create(language)?)?;
        decode::typed(methods::SANDBOX_CREATE, value)
    }

    pub fn run(&self, sandbox_id: &str, code: &str, timeout_secs: u64) -> Result<SandboxOutput> {
        let value = self.transport.call_guarded(
            methods::SANDBOX_RUN,
            params::sandbox_run(sandbox_id, code, timeout_secs)?,
        )?;
        decode::typed(methods::SANDBOX_RUN, value)
    }

    pub fn status(&self, sandbox_id: &str) -> Result<SandboxInfo> {
        let value = self
            .transport
            .call(methods::SANDBOX_STATUS, params::sandbox_id(sandbox_id)?)?;
        decode::typed(methods::SANDBOX_STATUS, value)
    }

    pub fn terminate(&self, sandbox_id: &str) -> Result<()> {
        self.transport
            .call_guarded(methods::SANDBOX_TERMINATE, params::sandbox_id(sandbox_id)?)?;
        Ok(())
    }
}
