//! Built-in deployment defaults (layer 1)

use serde::{Deserialize, Serialize};

/// Image used when neither the deployment nor the project names one
pub const DEFAULT_WORKSPACE_IMAGE: &str = "gitpod/workspace-full:latest";

/// Built-in default settings values
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltinDefaults {
    /// Default workspace image (default: "gitpod/workspace-full:latest")
    pub workspace_image: String,

    /// Whether configuration inference runs when a repo has no config file (default: true)
    pub inference_enabled: bool,
}

impl Default for BuiltinDefaults {
    fn default() -> Self {
        Self {
            workspace_image: DEFAULT_WORKSPACE_IMAGE.to_string(),
            inference_enabled: true,
        }
    }
}

impl BuiltinDefaults {
    /// Convert to JSON Value for merging
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "workspace_defaults": {
                "workspace_image": self.workspace_image
            },
            "inference": {
                "enabled": self.inference_enabled
            }
        })
    }
}
