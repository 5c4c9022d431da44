//! Mock collaborators

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use ws_config_parser::{ConfigParser, ParseResult};
use ws_protocol::{CommitContext, User};

use super::failure::{Collaborator, FailureConfig, FailureInjector};
use crate::host::{FileProvider, ProviderError};
use crate::inference::ConfigInference;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Apply an injected failure: sleep for its delay, then fail if it carries a message
async fn apply_failure(failure: Option<FailureConfig>, service: &str) -> Result<(), ProviderError> {
    let Some(failure) = failure else {
        return Ok(());
    };
    if let Some(delay) = failure.delay {
        tokio::time::sleep(delay).await;
    }
    match failure.error_message {
        Some(message) => Err(ProviderError::request(service, message)),
        None => Ok(()),
    }
}

/// Canned-response double shared by the async mocks
#[derive(Debug, Default)]
struct Canned {
    response: Option<String>,
    calls: usize,
    failures: FailureInjector,
}

/// Mock repository file provider
#[derive(Debug, Clone, Default)]
pub struct MockFileProvider {
    state: Arc<Mutex<Canned>>,
}

impl MockFileProvider {
    /// A provider for a repository without a config file
    pub fn new() -> Self {
        Self::default()
    }

    /// A provider returning `content` for every commit
    pub fn with_content(content: impl Into<String>) -> Self {
        let provider = Self::new();
        provider.set_content(Some(content.into()));
        provider
    }

    pub fn set_content(&self, content: Option<String>) {
        lock(&self.state).response = content;
    }

    pub fn inject_failure(&self, config: FailureConfig) {
        lock(&self.state).failures.inject(Collaborator::FileProvider, config);
    }

    pub fn call_count(&self) -> usize {
        lock(&self.state).calls
    }
}

#[async_trait]
impl FileProvider for MockFileProvider {
    async fn get_config_file_content(
        &self,
        _commit: &CommitContext,
        _user: &User,
    ) -> Result<Option<String>, ProviderError> {
        let (failure, response) = {
            let mut state = lock(&self.state);
            state.calls += 1;
            (state.failures.check(Collaborator::FileProvider), state.response.clone())
        };
        apply_failure(failure, "file provider").await?;
        Ok(response)
    }
}

/// Mock configuration inference service
#[derive(Debug, Clone, Default)]
pub struct MockInference {
    state: Arc<Mutex<Canned>>,
}

impl MockInference {
    /// An inference service that never guesses
    pub fn new() -> Self {
        Self::default()
    }

    /// An inference service guessing `text` for every commit
    pub fn with_guess(text: impl Into<String>) -> Self {
        let inference = Self::new();
        lock(&inference.state).response = Some(text.into());
        inference
    }

    pub fn inject_failure(&self, config: FailureConfig) {
        lock(&self.state).failures.inject(Collaborator::Inference, config);
    }

    pub fn call_count(&self) -> usize {
        lock(&self.state).calls
    }
}

#[async_trait]
impl ConfigInference for MockInference {
    async fn guess_configuration(
        &self,
        _user: &User,
        _commit: &CommitContext,
    ) -> Result<Option<String>, ProviderError> {
        let (failure, response) = {
            let mut state = lock(&self.state);
            state.calls += 1;
            (state.failures.check(Collaborator::Inference), state.response.clone())
        };
        apply_failure(failure, "inference").await?;
        Ok(response)
    }
}

/// Mock parser returning a fixed result
#[derive(Debug, Clone, Default)]
pub struct MockParser {
    result: ParseResult,
    seen: Arc<Mutex<Vec<String>>>,
}

impl MockParser {
    pub fn returning(result: ParseResult) -> Self {
        Self {
            result,
            seen: Arc::default(),
        }
    }

    /// A parser that reports `errors` for any text
    pub fn failing(errors: Vec<String>) -> Self {
        Self::returning(ParseResult::invalid(errors))
    }

    /// Every text passed to `parse`, in call order
    pub fn seen(&self) -> Vec<String> {
        lock(&self.seen).clone()
    }
}

impl ConfigParser for MockParser {
    fn parse(&self, text: &str) -> ParseResult {
        lock(&self.seen).push(text.to_string());
        self.result.clone()
    }
}
