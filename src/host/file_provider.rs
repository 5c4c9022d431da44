//! File provider contract

use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use ws_protocol::{CommitContext, User};

/// Fetches the canonical config file for a commit.
#[async_trait]
pub trait FileProvider: Send + Sync {
    /// Content of the config file at the commit's revision.
    ///
    /// `Ok(None)` means the file does not exist; that is not an error.
    async fn get_config_file_content(
        &self,
        commit: &CommitContext,
        user: &User,
    ) -> Result<Option<String>, ProviderError>;
}

/// Collaborator failures
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("I/O error reading {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("{service} request failed: {message}")]
    Request { service: String, message: String },
}

impl ProviderError {
    pub fn request(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Request {
            service: service.into(),
            message: message.into(),
        }
    }
}
