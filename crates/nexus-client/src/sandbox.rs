//! Sandbox lifecycle handle.

use crate::shape::{decode, methods, params};
use crate::transport::RpcTransport;
use nexus_protocol::{Result, SandboxInfo, SandboxLanguage, SandboxOutput};

/// Handle for remote code-execution sandboxes.
///
/// Creation, execution, and termination have non-replayable side effects and
/// follow the guarded retry rules; status polls are idempotent.
pub struct RemoteSandbox<'a> {
    transport: &'a RpcTransport,
}

impl<'a> RemoteSandbox<'a> {
    pub(crate) fn new(transport: &'a RpcTransport) -> Self {
        Self { transport }
    }

    /// Provision a new sandbox for the given language.
    pub async fn create(&self, language: SandboxLanguage) -> Result<SandboxInfo> {
        let value = self
            .transport
            .call_guarded(methods::SANDBOX_CREATE, params::sandbox_create(language)?)
            .await?;
        decode::typed(methods::SANDBOX_CREATE, value)
    }

    /// Run a code snippet in an existing sandbox.
    ///
    /// `timeout_secs` bounds server-side execution and is independent of the
    /// client's own request timeout.
    pub async fn run(
        &self,
        sandbox_id: &str,
        code: &str,
        timeout_secs: u64,
    ) -> Result<SandboxOutput> {
        let value = self
            .transport
            .call_guarded(
                methods::SANDBOX_RUN,
                params::sandbox_run(sandbox_id, code, timeout_secs)?,
            )
            .await?;
        decode::typed(methods::SANDBOX_RUN, value)
    }

    /// Poll a sandbox's current state.
    pub async fn status(&self, sandbox_id: &str) -> Result<SandboxInfo> {
        let value = self
            .transport
            .call(methods::SANDBOX_STATUS, params::sandbox_id(sandbox_id)?)
            .await?;
        decode::typed(methods::SANDBOX_STATUS, value)
    }

    /// Tear down a sandbox. Terminating an already-stopped sandbox succeeds.
    pub async fn terminate(&self, sandbox_id: &str) -> Result<()> {
        self.transport
            .call_guarded(methods::SANDBOX_TERMINATE, params::sandbox_id(sandbox_id)?)
            .await?;
        Ok(())
    }
}
