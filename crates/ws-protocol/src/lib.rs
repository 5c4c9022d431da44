//! Workspace configuration data model
//!
//! Types shared between the resolver, the parser and downstream
//! environment-provisioning callers.

pub mod commit;
pub mod error;
pub mod user;
pub mod workspace;

pub use commit::{CommitContext, Repository};
pub use error::{ErrorCode, ResolveFailure};
pub use user::{FeatureFlags, FlagScope, PermanentFeatureFlag, User};
pub use workspace::{ConfigOrigin, ImageConfig, ProjectConfig, VsCodeConfig, WorkspaceConfig};

/// Canonical configuration filename looked up in repositories and content maps.
pub const CONFIG_FILE_NAME: &str = ".gitpod.yml";

/// Root under which every workspace-relative location must stay.
pub const SANDBOX_ROOT: &str = "/workspace";
