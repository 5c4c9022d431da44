//! Local checkout file provider

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use ws_protocol::{CommitContext, User, CONFIG_FILE_NAME};

use super::{FileProvider, ProviderError};

/// Serves the config file from a checkout on the local disk.
///
/// The working tree is read as-is; the commit's revision is only logged.
#[derive(Debug, Clone)]
pub struct LocalCheckoutFileProvider {
    root: PathBuf,
}

impl LocalCheckoutFileProvider {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl FileProvider for LocalCheckoutFileProvider {
    async fn get_config_file_content(
        &self,
        commit: &CommitContext,
        _user: &User,
    ) -> Result<Option<String>, ProviderError> {
        let path = self.root.join(CONFIG_FILE_NAME);
        tracing::debug!(path = %path.display(), revision = %commit.revision, "reading config from local checkout");

        match tokio::fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(ProviderError::Io { path, source }),
        }
    }
}
