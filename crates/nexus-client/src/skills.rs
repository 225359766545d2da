//! Skill catalog handle.

use crate::shape::{decode, methods, params};
use crate::transport::RpcTransport;
use nexus_protocol::{Result, Skill, SkillCatalog};

/// Read-only handle for the server's skill catalog.
pub struct RemoteSkills<'a> {
    transport: &'a RpcTransport,
}

impl<'a> RemoteSkills<'a> {
    pub(crate) fn new(transport: &'a RpcTransport) -> Self {
        Self { transport }
    }

    /// List every skill the server exposes.
    pub async fn list(&self) -> Result<SkillCatalog> {
        let value = self
            .transport
            .call(methods::SKILLS_LIST, params::empty()?)
            .await?;
        decode::typed(methods::SKILLS_LIST, value)
    }

    /// Fetch one skill by name.
    pub async fn info(&self, name: &str) -> Result<Skill> {
        let value = self
            .transport
            .call(methods::SKILLS_INFO, params::skill_name(name)?)
            .await?;
        decode::typed(methods::SKILLS_INFO, value)
    }

    /// Search the catalog by free-text query.
    pub async fn search(&self, query: &str, limit: u32) -> Result<SkillCatalog> {
        let value = self
            .transport
            .call(methods::SKILLS_SEARCH, params::query(query, limit)?)
            .await?;
        decode::typed(methods::SKILLS_SEARCH, value)
    }
}
