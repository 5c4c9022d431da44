//! Workspace Config Resolution
//!
//! Determines the effective workspace configuration for a user and a
//! repository commit. Candidate sources are tried in a strict precedence
//! order, the result is validated against the sandbox root, and the user's
//! workspace-persisted feature flags are merged in.

pub mod default_config;
pub mod flags;
pub mod host;
pub mod inference;
pub mod mock;
pub mod resolver;
pub mod sandbox;
pub mod settings;

pub use default_config::{DefaultConfigFactory, InvalidImageError};
pub use flags::merge_feature_flags;
pub use host::{FileProvider, HostContextProvider, HostServices, LocalCheckoutFileProvider, ProviderError};
pub use inference::{ConfigInference, LocalInference, NoInference};
pub use resolver::{
    ConfigResolver, InvalidConfigError, Provenance, ResolveError, ResolvedConfig, ResolvedSource,
};
pub use sandbox::{LocationField, SandboxGuard, SandboxViolation};
pub use settings::{DeploymentSettings, SettingsError};

pub use ws_config_parser::{ConfigParser, ParseResult, YamlConfigParser};
pub use ws_protocol::{
    CommitContext, ConfigOrigin, ErrorCode, FeatureFlags, FlagScope, PermanentFeatureFlag, ProjectConfig,
    Repository, ResolveFailure, User, WorkspaceConfig, CONFIG_FILE_NAME, SANDBOX_ROOT,
};
