//! Async client facade.

use crate::config::ClientConfig;
use crate::memory::RemoteMemory;
use crate::sandbox::RemoteSandbox;
use crate::shape::{decode, methods, params};
use crate::skills::RemoteSkills;
use crate::transport::RpcTransport;
use nexus_protocol::{FileEntry, FileStat, GrepResult, Result, SkillCatalog, WriteResult};
use serde_json::Value;
use std::sync::Arc;

/// Async client for a remote Nexus server.
///
/// Cloning is cheap and all clones share one HTTP connection pool. Dropping
/// the last clone releases the pool; there is no shutdown handshake with the
/// server.
///
/// ```no_run
/// # async fn demo() -> nexus_client::Result<()> {
/// let client = nexus_client::NexusClient::connect("http://localhost:8080", Some("key"))?;
/// let bytes = client.read("/workspace/notes.txt").await?;
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

    /// Shorthand for building a client with default timeouts and retry.
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

    /// Read a file's full contents.
    pub async fn read(&self, path: &str) -> Result<Vec<u8>> {
        let value = self
            .transport
            .call(methods::READ, params::path_only(path)?)
            .await?;
        decode::file_content(value)
    }

    /// Write a file unconditionally, creating it if absent.
    pub async fn write(&self, path: &str, content: &[u8]) -> Result<WriteResult> {
        let value = self
            .transport
            .call_guarded(methods::WRITE, params::write(path, content, None)?)
            .await?;
        decode::typed(methods::WRITE, value)
    }

    /// Write a file only if its current etag matches `if_match`.
    ///
    /// A stale etag fails with [`NexusError::Conflict`] carrying both the
    /// expected and current tokens, and the remote file is left unmodified.
    ///
    /// [`NexusError::Conflict`]: nexus_protocol::NexusError::Conflict
    pub async fn write_if_match(
        &self,
        path: &str,
        content: &[u8],
        if_match: &str,
    ) -> Result<WriteResult> {
        let value = self
            .transport
            .call_guarded(methods::WRITE, params::write(path, content, Some(if_match))?)
            .await?;
        decode::typed(methods::WRITE, value)
    }

    /// Delete a file.
    pub async fn delete(&self, path: &str) -> Result<()> {
        self.transport
            .call_guarded(methods::DELETE, params::path_only(path)?)
            .await?;
        Ok(())
    }

    /// Check whether a file exists. Absent paths answer `false`, never an
    /// error.
    pub async fn exists(&self, path: &str) -> Result<bool> {
        let value = self
            .transport
            .call(methods::EXISTS, params::path_only(path)?)
            .await?;
        decode::bool_field(value, "exists")
    }

    /// Fetch size, etag, and modification time for a file.
    pub async fn stat(&self, path: &str) -> Result<FileStat> {
        let value = self
            .transport
            .call(methods::STAT, params::path_only(path)?)
            .await?;
        decode::typed(methods::STAT, value)
    }

    /// Fetch just the current etag for a file.
    pub async fn get_etag(&self, path: &str) -> Result<String> {
        let value = self
            .transport
            .call(methods::GET_ETAG, params::path_only(path)?)
            .await?;
        decode::etag(value)
    }

    /// List entry paths under a directory.
    pub async fn list(&self, path: &str, recursive: bool) -> Result<Vec<String>> {
        let value = self
            .transport
            .call(methods::LIST, params::list(path, recursive, false)?)
            .await?;
        decode::typed(methods::LIST, value)
    }

    /// List entries under a directory with per-entry metadata.
    pub async fn list_detailed(&self, path: &str, recursive: bool) -> Result<Vec<FileEntry>> {
        let value = self
            .transport
            .call(methods::LIST, params::list(path, recursive, true)?)
            .await?;
        decode::typed(methods::LIST, value)
    }

    /// Find paths under `path` matching a glob pattern.
    pub async fn glob(&self, pattern: &str, path: &str) -> Result<Vec<String>> {
        let value = self
            .transport
            .call(methods::GLOB, params::glob(pattern, path)?)
            .await?;
        decode::typed(methods::GLOB, value)
    }

    /// Search file contents under `path` for a regex pattern.
    pub async fn grep(
        &self,
        pattern: &str,
        path: &str,
        file_pattern: Option<&str>,
    ) -> Result<Vec<GrepResult>> {
        let value = self
            .transport
            .call(methods::GREP, params::grep(pattern, path, file_pattern)?)
            .await?;
        decode::typed(methods::GREP, value)
    }

    /// List available skills.
    pub async fn skills_list(&self) -> Result<SkillCatalog> {
        self.skills().list().await
    }

    /// Escape hatch: invoke a server method by name with raw params.
    ///
    /// The call follows the idempotent retry rules; methods with
    /// non-replayable side effects should go through the typed facade.
    pub async fn call_rpc(&self, method: &str, rpc_params: Value) -> Result<Value> {
        self.transport.call(method, rpc_params).await
    }

    /// Handle for memory operations.
    pub fn memory(&self) -> RemoteMemory<'_> {
        RemoteMemory::new(&self.transport)
    }

    /// Handle for skill catalog operations.
    pub fn skills(&self) -> RemoteSkills<'_> {
        RemoteSkills::new(&self.transport)
    }

    /// Handle for sandbox lifecycle operations.
    pub fn sandbox(&self) -> RemoteSandbox<'_> {
        RemoteSandbox::new(&self.transport)
    }
}

impl std::fmt::Debug for NexusClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NexusClient").finish_non_exhaustive()
    }
}
