//! Parse result type.

use serde::{Deserialize, Serialize};
use ws_protocol::WorkspaceConfig;

/// Outcome of parsing configuration text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    /// Parsed config; empty when validation failed.
    pub config: WorkspaceConfig,

    /// Validation errors in document order. `None` means the text is valid.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<Vec<String>>,
}

impl ParseResult {
    /// Successful parse.
    pub fn valid(config: WorkspaceConfig) -> Self {
        Self {
            config,
            validation_errors: None,
        }
    }

    /// Failed parse. An empty error list is still treated as a failure.
    pub fn invalid(errors: Vec<String>) -> Self {
        Self {
            config: WorkspaceConfig::default(),
            validation_errors: Some(errors),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.validation_errors.is_none()
    }
}
