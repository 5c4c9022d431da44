//! Resolution errors

use ws_protocol::{ErrorCode, ResolveFailure};

use crate::host::ProviderError;
use crate::sandbox::SandboxViolation;

/// The config text exists but failed structural validation.
///
/// This is a user misconfiguration, not a system fault.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid gitpod.yml: {}", .validation_errors.join(","))]
pub struct InvalidConfigError {
    /// Validation messages, in the order the parser reported them
    pub validation_errors: Vec<String>,
}

impl InvalidConfigError {
    /// Tag callers use to recognise this error once serialized
    pub const ERROR_TYPE: &'static str = "invalidGitpodYML";

    pub fn new(validation_errors: Vec<String>) -> Self {
        Self { validation_errors }
    }
}

/// Errors from [`ConfigResolver::resolve`](super::ConfigResolver::resolve)
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error(transparent)]
    InvalidConfig(#[from] InvalidConfigError),

    #[error(transparent)]
    SandboxViolation(#[from] SandboxViolation),

    #[error("Cannot fetch config for host: {host}")]
    NoHostIntegration { host: String },

    #[error(transparent)]
    Collaborator(#[from] ProviderError),

    #[error("Config resolution was cancelled")]
    Cancelled,
}

impl ResolveError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidConfig(_) => ErrorCode::InvalidConfig,
            Self::SandboxViolation(_) => ErrorCode::SandboxViolation,
            Self::NoHostIntegration { .. } => ErrorCode::NoHostIntegration,
            Self::Collaborator(_) => ErrorCode::CollaboratorFailed,
            Self::Cancelled => ErrorCode::Cancelled,
        }
    }

    /// Serializable form for surfacing to the end user
    pub fn to_failure(&self) -> ResolveFailure {
        let message = self.to_string();
        match self {
            Self::InvalidConfig(e) => ResolveFailure::with_data(
                self.code(),
                message,
                serde_json::json!({
                    "error_type": InvalidConfigError::ERROR_TYPE,
                    "validation_errors": e.validation_errors,
                }),
            ),
            Self::SandboxViolation(v) => ResolveFailure::with_data(
                self.code(),
                message,
                serde_json::json!({
                    "field": v.field.to_string(),
                    "normalized": v.normalized,
                }),
            ),
            Self::NoHostIntegration { host } => {
                ResolveFailure::with_data(self.code(), message, serde_json::json!({ "host": host }))
            }
            Self::Collaborator(_) | Self::Cancelled => ResolveFailure::new(self.code(), message),
        }
    }
}
