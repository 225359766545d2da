//! Memory operations handle.

use crate::shape::{decode, methods, params};
use crate::transport::RpcTransport;
use nexus_protocol::{MemoryRecord, Result};
use serde_json::Value;

/// Handle for the server's memory store, borrowed from a client.
///
/// ```no_run
/// # async fn demo(client: nexus_client::NexusClient) -> nexus_client::Result<()> {
/// let id = client.memory().store("observed a flaky test", None).await?;
/// let recent = client.memory().query(10).await?;
/// # Ok(())
/// # }
/// ```
pub struct RemoteMemory<'a> {
    transport: &'a RpcTransport,
}

impl<'a> RemoteMemory<'a> {
    pub(crate) fn new(transport: &'a RpcTransport) -> Self {
        Self { transport }
    }

    /// Store a memory record, returning its server-assigned id.
    pub async fn store(&self, content: &str, metadata: Option<Value>) -> Result<String> {
        let value = self
            .transport
            .call_guarded(methods::MEMORY_STORE, params::memory_store(content, metadata)?)
            .await?;
        decode::memory_id(value)
    }

    /// Fetch the most recent records, newest first.
    pub async fn query(&self, limit: u32) -> Result<Vec<MemoryRecord>> {
        let value = self
            .transport
            .call(methods::MEMORY_QUERY, params::limit_only(limit)?)
            .await?;
        decode::typed(methods::MEMORY_QUERY, value)
    }

    /// Full-text search over stored records.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<MemoryRecord>> {
        let value = self
            .transport
            .call(methods::MEMORY_SEARCH, params::query(query, limit)?)
            .await?;
        decode::typed(methods::MEMORY_SEARCH, value)
    }

    /// List stored records, up to `limit`.
    pub async fn list(&self, limit: u32) -> Result<Vec<MemoryRecord>> {
        let value = self
            .transport
            .call(methods::MEMORY_LIST, params::limit_only(limit)?)
            .await?;
        decode::typed(methods::MEMORY_LIST, value)
    }

    /// Retrieve a single record by namespace and key.
    pub async fn retrieve(&self, namespace: &str, key: &str) -> Result<MemoryRecord> {
        let value = self
            .transport
            .call(methods::MEMORY_RETRIEVE, params::memory_retrieve(namespace, key)?)
            .await?;
        decode::typed(methods::MEMORY_RETRIEVE, value)
    }
}
