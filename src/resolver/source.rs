//! Which step produced the configuration, with the text it consumed.

use ws_protocol::{ConfigOrigin, ProjectConfig};

/// Outcome of the source-precedence search
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedSource {
    /// No source yielded text
    Default,
    /// Content attached to the commit context
    AdditionalContent(String),
    /// The config file in the repository
    Repo(String),
    /// Text guessed by the inference service
    Derived(String),
}

impl ResolvedSource {
    pub fn origin(&self) -> ConfigOrigin {
        match self {
            Self::Default => ConfigOrigin::Default,
            Self::AdditionalContent(_) => ConfigOrigin::AdditionalContent,
            Self::Repo(_) => ConfigOrigin::Repo,
            Self::Derived(_) => ConfigOrigin::Derived,
        }
    }

    /// Text the config is built from, if any
    pub fn literal_text(&self) -> Option<&str> {
        match self {
            Self::Default => None,
            Self::AdditionalContent(text) | Self::Repo(text) | Self::Derived(text) => Some(text),
        }
    }

    /// The project file echoed back to callers.
    ///
    /// Guessed text is not a project file, so `Derived` yields none.
    pub fn project_config(&self) -> Option<ProjectConfig> {
        match self {
            Self::AdditionalContent(text) | Self::Repo(text) => Some(ProjectConfig::new(text.clone())),
            Self::Default | Self::Derived(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_config_per_origin() {
        let text = "image: foo".to_string();

        assert_eq!(ResolvedSource::Default.project_config(), None);
        assert_eq!(ResolvedSource::Derived(text.clone()).project_config(), None);
        assert_eq!(
            ResolvedSource::Repo(text.clone()).project_config().unwrap().content(),
            Some("image: foo")
        );
        assert_eq!(
            ResolvedSource::AdditionalContent(text).project_config().unwrap().content(),
            Some("image: foo")
        );
    }

    #[test]
    fn test_origin_and_text() {
        let source = ResolvedSource::Derived("tasks: []".to_string());
        assert_eq!(source.origin(), ConfigOrigin::Derived);
        assert_eq!(source.literal_text(), Some("tasks: []"));
        assert_eq!(ResolvedSource::Default.literal_text(), None);
    }
}
