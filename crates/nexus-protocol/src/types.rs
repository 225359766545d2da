//! Typed results and parameter enums for the Nexus method surface.
//!
//! These mirror the server's JSON shapes one-to-one; the transport decodes
//! into them with serde and reports any mismatch as a validation failure
//! rather than coercing.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of a successful write.
///
/// `etag` is an opaque version token: it is stable across reads of an
/// unchanged file and changes on every successful write.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WriteResult {
    pub etag: String,
    pub version: u64,
    pub modified_at: String,
    pub size: u64,
}

/// File metadata returned by `stat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileStat {
    pub size: u64,
    pub etag: String,
    pub modified_at: String,
}

/// Directory entry returned by a detailed listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileEntry {
    pub path: String,
    pub size: u64,
    pub etag: Option<String>,
    pub modified_at: Option<String>,
    #[serde(default)]
    pub is_dir: bool,
}

/// One matching file reported by `grep`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrepResult {
    pub path: String,
    pub matches: Vec<GrepMatch>,
}

/// One matching line within a file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GrepMatch {
    pub line: u64,
    pub text: String,
}

/// Language a sandbox executes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SandboxLanguage {
    Python,
    Javascript,
    Bash,
}

/// Lifecycle state of a sandbox.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SandboxState {
    Pending,
    Running,
    Stopped,
    Failed,
}

/// Sandbox identity and lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SandboxInfo {
    pub sandbox_id: String,
    pub state: SandboxState,
}

/// Output of a sandbox execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SandboxOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
    /// Wall-clock execution time in seconds.
    pub execution_time: f64,
}

/// A stored memory record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    pub memory_id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: Option<Value>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Ownership tier of a skill.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SkillTier {
    Agent,
    Tenant,
    System,
}

/// A skill exposed by the server's skills index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Skill {
    pub name: String,
    pub description: String,
    pub tier: SkillTier,
    #[serde(default)]
    pub version: Option<String>,
}

/// A page of skills plus the server-reported total.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SkillCatalog {
    pub skills: Vec<Skill>,
    pub count: usize,
}
