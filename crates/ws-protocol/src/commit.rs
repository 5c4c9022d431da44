//! Commit context: the snapshot a workspace is created from.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::CONFIG_FILE_NAME;

/// Repository reference
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Repository {
    /// Source host (e.g. "github.com"), used to pick the host integration
    pub host: String,

    /// Owner or namespace
    pub owner: String,

    /// Repository name
    pub name: String,

    /// Clone URL, carried in diagnostics
    pub clone_url: String,
}

impl Repository {
    /// Build a repository reference with the conventional https clone URL
    pub fn new(host: impl Into<String>, owner: impl Into<String>, name: impl Into<String>) -> Self {
        let host = host.into();
        let owner = owner.into();
        let name = name.into();
        let clone_url = format!("https://{}/{}/{}.git", host, owner, name);
        Self {
            host,
            owner,
            name,
            clone_url,
        }
    }
}

/// A repository at a specific revision, optionally carrying unpushed file content.
///
/// Immutable for the duration of a resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitContext {
    pub repository: Repository,

    pub revision: String,

    /// Literal file content attached to the request, keyed by path
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub additional_files: BTreeMap<String, String>,

    /// Skip every literal source and use the default config
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub force_default_config: bool,
}

impl CommitContext {
    pub fn new(repository: Repository, revision: impl Into<String>) -> Self {
        Self {
            repository,
            revision: revision.into(),
            additional_files: BTreeMap::new(),
            force_default_config: false,
        }
    }

    /// Attach an additional file
    pub fn with_additional_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.additional_files.insert(path.into(), content.into());
        self
    }

    /// Request the default config regardless of repository content
    pub fn with_default_config(mut self) -> Self {
        self.force_default_config = true;
        self
    }

    /// Non-empty attached content for the canonical configuration file
    pub fn additional_config(&self) -> Option<&str> {
        self.additional_files
            .get(CONFIG_FILE_NAME)
            .map(String::as_str)
            .filter(|content| !content.is_empty())
    }
}
