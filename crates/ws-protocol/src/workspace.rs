//! The effective workspace configuration and its provenance tag.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::CONFIG_FILE_NAME;

/// Which resolution step produced a configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigOrigin {
    Default,
    AdditionalContent,
    Repo,
    Derived,
}

impl fmt::Display for ConfigOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "default"),
            Self::AdditionalContent => write!(f, "additional-content"),
            Self::Repo => write!(f, "repo"),
            Self::Derived => write!(f, "derived"),
        }
    }
}

/// Base image: either a reference or a Dockerfile to build
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageConfig {
    Reference(String),
    File {
        file: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        context: Option<String>,
    },
}

impl ImageConfig {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Reference(reference) => reference.trim().is_empty(),
            Self::File { file, .. } => file.trim().is_empty(),
        }
    }
}

impl From<&str> for ImageConfig {
    fn from(reference: &str) -> Self {
        Self::Reference(reference.to_string())
    }
}

/// Editor settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VsCodeConfig {
    /// Extension identifiers, in declaration order
    #[serde(default, deserialize_with = "null_as_default")]
    pub extensions: Vec<String>,
}

/// Effective workspace configuration
///
/// Field names on the wire follow the `.gitpod.yml` format. Keys this
/// crate does not interpret are carried through in `other`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ports: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<Value>>,

    /// Checkout directory, relative to the sandbox root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checkout_location: Option<String>,

    /// Workspace (IDE root) directory, relative to the sandbox root
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_location: Option<String>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub vscode: VsCodeConfig,

    #[serde(rename = "_origin", default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<ConfigOrigin>,

    /// Workspace-persisted feature flags copied from the user
    #[serde(rename = "_featureFlags", default, skip_serializing_if = "Option::is_none")]
    pub feature_flags: Option<BTreeSet<String>>,

    /// Per-workspace IDE secret
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ide_credentials: Option<String>,

    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

impl WorkspaceConfig {
    /// Stamp the provenance tag
    pub fn with_origin(mut self, origin: ConfigOrigin) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Fill `image` when it is absent or empty
    pub fn with_image_fallback(mut self, default_image: &str) -> Self {
        if self.image.as_ref().map_or(true, ImageConfig::is_empty) {
            self.image = Some(ImageConfig::from(default_image));
        }
        self
    }

    /// Replace the feature flags; an empty set removes the field
    pub fn with_feature_flags(mut self, flags: BTreeSet<String>) -> Self {
        self.feature_flags = if flags.is_empty() { None } else { Some(flags) };
        self
    }

    /// Image reference string, if the image is given by reference
    pub fn image_reference(&self) -> Option<&str> {
        match &self.image {
            Some(ImageConfig::Reference(reference)) => Some(reference),
            _ => None,
        }
    }
}

/// Literal project file content that produced a configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectConfig(BTreeMap<String, String>);

impl ProjectConfig {
    /// Map the canonical configuration filename to `content`
    pub fn new(content: impl Into<String>) -> Self {
        let mut files = BTreeMap::new();
        files.insert(CONFIG_FILE_NAME.to_string(), content.into());
        Self(files)
    }

    /// Literal content of the canonical configuration file
    pub fn content(&self) -> Option<&str> {
        self.0.get(CONFIG_FILE_NAME).map(String::as_str)
    }

    pub fn files(&self) -> &BTreeMap<String, String> {
        &self.0
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
