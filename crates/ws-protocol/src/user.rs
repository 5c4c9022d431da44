//! User identity and permanent feature flags.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Where a permanent feature flag takes effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagScope {
    /// Copied onto every workspace the user creates
    Workspace,
    /// Only affects the user's own session context
    User,
}

/// A single permanent feature flag
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermanentFeatureFlag {
    pub name: String,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    pub scope: FlagScope,
}

fn default_enabled() -> bool {
    true
}

impl PermanentFeatureFlag {
    pub fn workspace(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            scope: FlagScope::Workspace,
        }
    }

    pub fn user(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enabled: true,
            scope: FlagScope::User,
        }
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Whether this flag must be attached to the user's workspaces
    pub fn is_workspace_persisted(&self) -> bool {
        self.enabled && self.scope == FlagScope::Workspace
    }
}

/// User feature flag settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    #[serde(default)]
    pub permanent: Vec<PermanentFeatureFlag>,
}

impl FeatureFlags {
    /// Names of the flags that must be copied onto a workspace
    pub fn workspace_persisted(&self) -> BTreeSet<String> {
        self.permanent
            .iter()
            .filter(|flag| flag.is_workspace_persisted())
            .map(|flag| flag.name.clone())
            .collect()
    }
}

/// The user a workspace is created for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_flags: Option<FeatureFlags>,
}

impl User {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            feature_flags: None,
        }
    }

    pub fn with_flags(mut self, flags: Vec<PermanentFeatureFlag>) -> Self {
        self.feature_flags = Some(FeatureFlags { permanent: flags });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_persisted_filter() {
        let flags = FeatureFlags {
            permanent: vec![
                PermanentFeatureFlag::workspace("full_workspace_backup"),
                PermanentFeatureFlag::user("admin_dashboard"),
                PermanentFeatureFlag::workspace("persistent_volume_claim").disabled(),
            ],
        };

        let persisted = flags.workspace_persisted();
        assert_eq!(persisted.len(), 1);
        assert!(persisted.contains("full_workspace_backup"));
    }

    #[test]
    fn test_enabled_defaults_to_true() {
        let flag: PermanentFeatureFlag =
            serde_json::from_str(r#"{"name": "fixed_resources", "scope": "workspace"}"#).unwrap();
        assert!(flag.enabled);
        assert!(flag.is_workspace_persisted());
    }

    #[test]
    fn test_user_without_flags() {
        let user: User = serde_json::from_str(r#"{"id": "u-1"}"#).unwrap();
        assert_eq!(user.id, "u-1");
        assert!(user.feature_flags.is_none());
    }
}
