//! Failure injection for collaborator doubles

use std::collections::HashMap;
use std::time::Duration;

/// Collaborators that support failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    FileProvider,
    Inference,
}

/// Failure configuration for a collaborator
#[derive(Debug, Clone, Default)]
pub struct FailureConfig {
    /// Error message to fail with (None = only delay)
    pub error_message: Option<String>,
    /// Delay to add before responding
    pub delay: Option<Duration>,
    /// Number of times to fail before succeeding (None = always fail)
    pub fail_count: Option<u32>,
}

impl FailureConfig {
    /// Create a config that fails with `message`
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Default::default()
        }
    }

    /// Create a config that just adds delay
    pub fn delay(duration: Duration) -> Self {
        Self {
            delay: Some(duration),
            ..Default::default()
        }
    }

    /// Set the number of times to fail before succeeding
    pub fn with_fail_count(mut self, count: u32) -> Self {
        self.fail_count = Some(count);
        self
    }
}

/// Per-collaborator failure injector
#[derive(Debug, Default)]
pub struct FailureInjector {
    configs: HashMap<Collaborator, FailureConfig>,
    call_counts: HashMap<Collaborator, u32>,
}

impl FailureInjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn inject(&mut self, collaborator: Collaborator, config: FailureConfig) {
        self.configs.insert(collaborator, config);
        self.call_counts.insert(collaborator, 0);
    }

    pub fn inject_error(&mut self, collaborator: Collaborator, message: impl Into<String>) {
        self.inject(collaborator, FailureConfig::error(message));
    }

    /// The failure to apply to this call, if any
    pub fn check(&mut self, collaborator: Collaborator) -> Option<FailureConfig> {
        let config = self.configs.get(&collaborator)?;
        let count = self.call_counts.entry(collaborator).or_insert(0);
        *count += 1;

        match config.fail_count {
            Some(limit) if *count > limit => None,
            _ => Some(config.clone()),
        }
    }
}
