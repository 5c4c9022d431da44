//! Deployment-wide settings
//!
//! Read-only inputs shared by every resolution, merged from three layers:
//! 1. Built-in defaults
//! 2. Deployment file (TOML)
//! 3. CLI overrides

mod defaults;
mod deployment;
mod merge;

pub use defaults::{BuiltinDefaults, DEFAULT_WORKSPACE_IMAGE};
pub use deployment::{DeploymentSettings, SettingsError, SettingsOrigin, SettingsSource};
pub use merge::{deep_merge, merge_layers};
