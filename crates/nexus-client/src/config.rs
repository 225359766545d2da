//! Client configuration.

use crate::retry::RetryPolicy;
use nexus_protocol::{NexusError, Result};
use std::fmt;
use std::time::Duration;

/// Configuration for a Nexus client instance.
///
/// Holds the server URL and credentials for the lifetime of the client.
/// The API key is sent as an `Authorization: Bearer` header and is never
/// logged in cleartext; both `Debug` and `Display` redact it.
///
/// # Example
///
/// ```
/// use nexus_client::{ClientConfig, RetryPolicy};
/// use std::time::Duration;
///
/// let config = ClientConfig::new("https://nexus.example.com")
///     .with_api_key("nxk-secret")
///     .with_timeout(Duration::from_secs(10));
/// assert!(!format!("{config:?}").contains("nxk-secret"));
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    pub(crate) server_url: String,
    pub(crate) api_key: Option<String>,
    pub(crate) timeout: Duration,
    pub(crate) connect_timeout: Duration,
    pub(crate) retry: RetryPolicy,
}

impl ClientConfig {
    /// Create a configuration with defaults: 30s request timeout, 5s connect
    /// timeout, and the default retry policy.
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            api_key: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Per-call deadline. Exceeding it surfaces a timeout error.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if !self.server_url.starts_with("http://") && !self.server_url.starts_with("https://") {
            return Err(NexusError::Validation {
                field: "server_url".into(),
                reason: format!("'{}' must start with http:// or https://", self.server_url),
            });
        }
        if self.timeout.is_zero() {
            return Err(NexusError::Validation {
                field: "timeout".into(),
                reason: "must be non-zero".into(),
            });
        }
        Ok(())
    }

    /// The RPC endpoint requests are POSTed to.
    pub(crate) fn rpc_endpoint(&self) -> String {
        format!("{}/rpc", self.server_url.trim_end_matches('/'))
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("server_url", &self.server_url)
            .field(
                "api_key",
                &self.api_key.as_ref().map(|_| "ApiKey(*****)"),
            )
            .field("timeout", &self.timeout)
            .field("connect_timeout", &self.connect_timeout)
            .field("retry", &self.retry)
            .finish()
    }
}

impl fmt::Display for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.api_key {
            Some(_) => write!(f, "{} (ApiKey(*****))", self.server_url),
            None => write!(f, "{} (anonymous)", self.server_url),
        }
    }
}
