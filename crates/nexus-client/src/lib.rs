//! Client library for Nexus RPC servers.
//!
//! Exposes remote filesystem, sandbox, memory, and skill operations over
//! JSON-RPC 2.0 on HTTP, with bearer-token auth, per-request timeouts, and
//! retry with capped exponential backoff. Async by default; a blocking
//! variant with the same surface lives in [`blocking`].
//!
//! ```no_run
//! use nexus_client::{ClientConfig, NexusClient, RetryPolicy};
//! use std::time::Duration;
//!
//! # async fn demo() -> nexus_client::Result<()> {
//! let config = ClientConfig::new("http://localhost:8080")
//!     .with_api_key("secret")
//!     .with_timeout(Duration::from_secs(10))
//!     .with_retry(RetryPolicy::default());
//! let client = NexusClient::new(config)?;
//!
//! let receipt = client.write("/workspace/plan.md", b"step one").await?;
//! let updated = client
//!     .write_if_match("/workspace/plan.md", b"step two", &receipt.etag)
//!     .await?;
//! assert_ne!(receipt.etag, updated.etag);
//! # Ok(())
//! # }
//! ```

pub mod blocking;
mod client;
mod config;
mod memory;
mod retry;
mod sandbox;
mod shape;
mod skills;
mod transport;

pub use client::NexusClient;
pub use config::ClientConfig;
pub use memory::RemoteMemory;
pub use retry::RetryPolicy;
pub use sandbox::RemoteSandbox;
pub use skills::RemoteSkills;

pub use nexus_protocol::{
    FileEntry, FileStat, GrepMatch, GrepResult, MemoryRecord, NexusError, Result, SandboxInfo,
    SandboxLanguage, SandboxOutput, SandboxState, Skill, SkillCatalog, SkillTier, WriteResult,
};
