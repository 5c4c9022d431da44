//! Resolved configuration with provenance
//!
//! Pairs the effective config with the literal project file that produced
//! it and an audit record of the resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::Path;
use ws_protocol::{CommitContext, ConfigOrigin, ProjectConfig, WorkspaceConfig};

use super::source::ResolvedSource;

/// Audit record for one resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    /// Unique id of this resolution
    pub resolution_id: String,

    pub origin: ConfigOrigin,

    /// Repository clone URL
    pub repository: String,

    pub revision: String,

    /// SHA-256 of the text the config was built from (None for default)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_digest: Option<String>,

    pub resolved_at: DateTime<Utc>,
}

impl Provenance {
    pub(crate) fn new(commit: &CommitContext, source: &ResolvedSource) -> Self {
        Self {
            resolution_id: uuid::Uuid::new_v4().to_string(),
            origin: source.origin(),
            repository: commit.repository.clone_url.clone(),
            revision: commit.revision.clone(),
            source_digest: source
                .literal_text()
                .map(|text| hex::encode(Sha256::digest(text.as_bytes()))),
            resolved_at: Utc::now(),
        }
    }
}

/// Output of a successful resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedConfig {
    pub config: WorkspaceConfig,

    /// Literal project file, present only for additional-content and repo origins
    #[serde(skip_serializing_if = "Option::is_none")]
    pub project_config: Option<ProjectConfig>,

    pub provenance: Provenance,
}

impl ResolvedConfig {
    pub fn origin(&self) -> ConfigOrigin {
        self.provenance.origin
    }

    /// Split into the effective config and the optional project file
    pub fn into_parts(self) -> (WorkspaceConfig, Option<ProjectConfig>) {
        (self.config, self.project_config)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write to file
    pub fn write_to_file(&self, path: &Path) -> io::Result<()> {
        let json = self.to_json().map_err(|e| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("JSON serialization failed: {}", e),
            )
        })?;
        fs::write(path, json)
    }
}
