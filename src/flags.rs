//! Feature Flag Merger
//!
//! Workspace flags are always recomputed from the user at resolution time.
//! Whatever `_featureFlags` the config text carried is discarded.

use ws_protocol::{FeatureFlags, User, WorkspaceConfig};

/// Replace the config's feature flags with the user's workspace-persisted ones.
///
/// The field is omitted when the user has none.
pub fn merge_feature_flags(config: WorkspaceConfig, user: &User) -> WorkspaceConfig {
    let persisted = user
        .feature_flags
        .as_ref()
        .map(FeatureFlags::workspace_persisted)
        .unwrap_or_default();

    if !persisted.is_empty() {
        tracing::debug!(user_id = %user.id, flags = ?persisted, "attaching workspace feature flags");
    }

    config.with_feature_flags(persisted)
}
