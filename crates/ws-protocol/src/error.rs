//! Stable error codes for failed resolutions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Error codes surfaced to callers of the resolver.
///
/// These codes are stable and used for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// The configuration file exists but failed structural validation.
    InvalidConfig,
    /// A configured location escapes the sandbox root.
    SandboxViolation,
    /// No integration is registered for the commit's source host.
    NoHostIntegration,
    /// A collaborator call failed.
    CollaboratorFailed,
    /// The caller cancelled the resolution.
    Cancelled,
}

impl ErrorCode {
    /// Whether the failure was caused by the user's own configuration
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::InvalidConfig | Self::SandboxViolation)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig => write!(f, "INVALID_CONFIG"),
            Self::SandboxViolation => write!(f, "SANDBOX_VIOLATION"),
            Self::NoHostIntegration => write!(f, "NO_HOST_INTEGRATION"),
            Self::CollaboratorFailed => write!(f, "COLLABORATOR_FAILED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// Serializable description of a failed resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolveFailure {
    pub code: ErrorCode,
    /// Human-readable, single-line error message.
    pub message: String,
    /// Optional machine-readable details (validation errors, offending field).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ResolveFailure {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn with_data(code: ErrorCode, message: impl Into<String>, data: serde_json::Value) -> Self {
        Self {
            code,
            message: message.into(),
            data: Some(data),
        }
    }
}

impl fmt::Display for ResolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ResolveFailure {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_serialization_matches_display() {
        for code in [
            ErrorCode::InvalidConfig,
            ErrorCode::SandboxViolation,
            ErrorCode::NoHostIntegration,
            ErrorCode::CollaboratorFailed,
            ErrorCode::Cancelled,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, code.to_string());
        }
    }

    #[test]
    fn test_user_errors() {
        assert!(ErrorCode::InvalidConfig.is_user_error());
        assert!(ErrorCode::SandboxViolation.is_user_error());
        assert!(!ErrorCode::NoHostIntegration.is_user_error());
    }

    #[test]
    fn test_failure_display() {
        let failure = ResolveFailure::with_data(
            ErrorCode::InvalidConfig,
            "Invalid gitpod.yml: unknown key: foo",
            serde_json::json!({ "validation_errors": ["unknown key: foo"] }),
        );
        assert_eq!(failure.to_string(), "INVALID_CONFIG: Invalid gitpod.yml: unknown key: foo");
    }
}
