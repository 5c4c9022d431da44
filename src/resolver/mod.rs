//! Config Resolver
//!
//! Determines the effective workspace config for a user and commit. Sources
//! are tried in strict precedence, first match wins:
//! 1. Content attached to the commit context
//! 2. The config file in the repository at the commit's revision
//! 3. A configuration guessed by the inference service
//! 4. The deployment default config
//!
//! Fallback happens only when a step yields no text; a failing lookup or an
//! invalid file stops the resolution.

mod error;
mod resolved;
mod source;

pub use error::{InvalidConfigError, ResolveError};
pub use resolved::{Provenance, ResolvedConfig};
pub use source::ResolvedSource;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::field;
use ws_config_parser::ConfigParser;
use ws_protocol::{CommitContext, ConfigOrigin, User, WorkspaceConfig};

use crate::default_config::DefaultConfigFactory;
use crate::flags::merge_feature_flags;
use crate::host::HostContextProvider;
use crate::inference::{ConfigInference, NoInference};
use crate::sandbox::SandboxGuard;
use crate::settings::{DeploymentSettings, SettingsError};

/// Resolves workspace configs. Holds only read-only collaborators, so one
/// instance can serve many concurrent resolutions.
pub struct ConfigResolver {
    parser: Arc<dyn ConfigParser>,
    hosts: HostContextProvider,
    inference: Arc<dyn ConfigInference>,
    defaults: DefaultConfigFactory,
    guard: SandboxGuard,
}

impl ConfigResolver {
    pub fn new(
        parser: Arc<dyn ConfigParser>,
        hosts: HostContextProvider,
        inference: Arc<dyn ConfigInference>,
        defaults: DefaultConfigFactory,
    ) -> Self {
        Self {
            parser,
            hosts,
            inference,
            defaults,
            guard: SandboxGuard::new(),
        }
    }

    /// Build a resolver from deployment settings.
    ///
    /// Inference is replaced by [`NoInference`] when the settings disable it.
    pub fn from_settings(
        settings: &DeploymentSettings,
        parser: Arc<dyn ConfigParser>,
        hosts: HostContextProvider,
        inference: Arc<dyn ConfigInference>,
    ) -> Result<Self, SettingsError> {
        let inference: Arc<dyn ConfigInference> = if settings.inference_enabled {
            inference
        } else {
            Arc::new(NoInference)
        };
        Ok(Self::new(parser, hosts, inference, settings.default_config_factory()?))
    }

    /// A fresh default config, without going through resolution
    pub fn default_config(&self) -> WorkspaceConfig {
        self.defaults.build()
    }

    /// Resolve the effective config for `user` at `commit`
    #[tracing::instrument(
        name = "fetch_config",
        skip_all,
        fields(
            user_id = %user.id,
            repo = %commit.repository.clone_url,
            revision = %commit.revision,
            origin = field::Empty,
            error = field::Empty,
        )
    )]
    pub async fn resolve(&self, user: &User, commit: &CommitContext) -> Result<ResolvedConfig, ResolveError> {
        let result = self.resolve_inner(user, commit).await;

        let span = tracing::Span::current();
        match &result {
            Ok(resolved) => {
                span.record("origin", field::display(resolved.origin()));
            }
            Err(e) => {
                span.record("error", field::display(e));
            }
        }
        result
    }

    /// Like [`resolve`](Self::resolve), aborting when `cancel` fires.
    ///
    /// A cancelled resolution returns no config at all.
    pub async fn resolve_with_cancellation(
        &self,
        user: &User,
        commit: &CommitContext,
        cancel: &CancellationToken,
    ) -> Result<ResolvedConfig, ResolveError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ResolveError::Cancelled),
            result = self.resolve(user, commit) => result,
        }
    }

    async fn resolve_inner(&self, user: &User, commit: &CommitContext) -> Result<ResolvedConfig, ResolveError> {
        let source = if commit.force_default_config {
            ResolvedSource::Default
        } else {
            self.find_source(user, commit).await?
        };

        let config = match source.literal_text() {
            Some(text) => self.build_from_text(user, commit, source.origin(), text)?,
            None => {
                tracing::debug!(
                    user_id = %user.id,
                    repo_clone_url = %commit.repository.clone_url,
                    revision = %commit.revision,
                    "config string undefined, using default config"
                );
                self.defaults.build().with_origin(ConfigOrigin::Default)
            }
        };

        Ok(ResolvedConfig {
            project_config: source.project_config(),
            provenance: Provenance::new(commit, &source),
            config,
        })
    }

    /// Walk the sources in precedence order
    async fn find_source(&self, user: &User, commit: &CommitContext) -> Result<ResolvedSource, ResolveError> {
        if let Some(text) = commit.additional_config() {
            return Ok(ResolvedSource::AdditionalContent(text.to_string()));
        }

        let host = &commit.repository.host;
        let services = self
            .hosts
            .get(host)
            .ok_or_else(|| ResolveError::NoHostIntegration { host: host.clone() })?;

        let repo_text = services.file_provider.get_config_file_content(commit, user).await?;
        if let Some(text) = non_empty(repo_text) {
            return Ok(ResolvedSource::Repo(text));
        }

        let guessed = self.inference.guess_configuration(user, commit).await?;
        if let Some(text) = non_empty(guessed) {
            return Ok(ResolvedSource::Derived(text));
        }

        Ok(ResolvedSource::Default)
    }

    /// Parse literal text and run it through the normalization steps
    fn build_from_text(
        &self,
        user: &User,
        commit: &CommitContext,
        origin: ConfigOrigin,
        text: &str,
    ) -> Result<WorkspaceConfig, ResolveError> {
        let parsed = self.parser.parse(text);
        if let Some(validation_errors) = parsed.validation_errors {
            let err = InvalidConfigError::new(validation_errors);
            tracing::info!(
                user_id = %user.id,
                repo_clone_url = %commit.repository.clone_url,
                revision = %commit.revision,
                config_text = text,
                %origin,
                "{}",
                err
            );
            return Err(err.into());
        }

        let config = parsed
            .config
            .with_origin(origin)
            .with_image_fallback(self.defaults.workspace_image());

        self.guard.check_config(&config, &user.id)?;

        Ok(merge_feature_flags(config, user))
    }
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|text| !text.is_empty())
}
