//! Configuration inference
//!
//! Guesses a configuration for repositories that carry no config file.

mod local;

pub use local::{InferenceRule, LocalInference};

use async_trait::async_trait;
use ws_protocol::{CommitContext, User};

use crate::host::ProviderError;

/// Guesses configuration text for a commit.
#[async_trait]
pub trait ConfigInference: Send + Sync {
    /// Guessed configuration text, or `Ok(None)` when nothing can be inferred.
    async fn guess_configuration(
        &self,
        user: &User,
        commit: &CommitContext,
    ) -> Result<Option<String>, ProviderError>;
}

/// Never guesses anything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoInference;

#[async_trait]
impl ConfigInference for NoInference {
    async fn guess_configuration(
        &self,
        _user: &User,
        _commit: &CommitContext,
    ) -> Result<Option<String>, ProviderError> {
        Ok(None)
    }
}
