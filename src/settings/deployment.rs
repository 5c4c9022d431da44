//! Merged deployment settings with provenance
//!
//! Captures the effective deployment settings plus where each layer came
//! from, so a resolution can be traced back to the defaults it used.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use super::defaults::BuiltinDefaults;
use super::merge::merge_layers;
use crate::default_config::{is_image_reference, DefaultConfigFactory};

/// Origin of a settings layer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum SettingsOrigin {
    Builtin,
    File,
    Cli,
}

/// A contributing settings layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsSource {
    pub origin: SettingsOrigin,

    /// File path (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// SHA-256 digest of raw file bytes (None for builtin/cli)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
}

/// Effective deployment settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentSettings {
    /// Image used when a project does not name one
    pub workspace_image: String,

    /// Whether configuration inference is consulted
    pub inference_enabled: bool,

    /// The merged settings object
    pub merged: Value,

    /// Contributing layers in precedence order
    pub sources: Vec<SettingsSource>,
}

/// Settings errors
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse settings: {0}")]
    Parse(String),

    #[error("Missing setting: {0}")]
    Missing(&'static str),

    #[error("Default workspace image {0:?} is not a valid image reference")]
    InvalidDefaultImage(String),
}

impl DeploymentSettings {
    /// Built-in defaults only
    pub fn builtin() -> Result<Self, SettingsError> {
        Self::build(None, None)
    }

    /// Build settings from the layers
    pub fn build(file_path: Option<&Path>, cli_overrides: Option<Value>) -> Result<Self, SettingsError> {
        let mut layers = vec![BuiltinDefaults::default().to_value()];
        let mut sources = vec![SettingsSource {
            origin: SettingsOrigin::Builtin,
            path: None,
            digest: None,
        }];

        if let Some(path) = file_path {
            let (value, digest) = Self::load_toml_file(path)?;
            layers.push(value);
            sources.push(SettingsSource {
                origin: SettingsOrigin::File,
                path: Some(path.to_string_lossy().to_string()),
                digest: Some(digest),
            });
        }

        if let Some(cli) = cli_overrides {
            layers.push(cli);
            sources.push(SettingsSource {
                origin: SettingsOrigin::Cli,
                path: None,
                digest: None,
            });
        }

        let merged = merge_layers(layers);

        let workspace_image = merged
            .pointer("/workspace_defaults/workspace_image")
            .and_then(Value::as_str)
            .ok_or(SettingsError::Missing("workspace_defaults.workspace_image"))?
            .to_string();
        if !is_image_reference(&workspace_image) {
            return Err(SettingsError::InvalidDefaultImage(workspace_image));
        }

        let inference_enabled = merged
            .pointer("/inference/enabled")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        Ok(Self {
            workspace_image,
            inference_enabled,
            merged,
            sources,
        })
    }

    /// Default config factory for this deployment
    pub fn default_config_factory(&self) -> Result<DefaultConfigFactory, SettingsError> {
        DefaultConfigFactory::new(self.workspace_image.clone())
            .map_err(|e| SettingsError::InvalidDefaultImage(e.0))
    }

    /// Load and parse a TOML file, returning the value and digest
    fn load_toml_file(path: &Path) -> Result<(Value, String), SettingsError> {
        let bytes = fs::read(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let digest = hex::encode(Sha256::digest(&bytes));

        let contents = String::from_utf8(bytes)
            .map_err(|e| SettingsError::Parse(format!("Invalid UTF-8: {}", e)))?;

        let table: toml::Value = toml::from_str(&contents)
            .map_err(|e| SettingsError::Parse(format!("TOML parse error: {}", e)))?;

        let value = serde_json::to_value(table)
            .map_err(|e| SettingsError::Parse(format!("TOML conversion error: {}", e)))?;

        Ok((value, digest))
    }
}
