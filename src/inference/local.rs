//! Marker-file inference over a local checkout
//!
//! Looks at the top level of the checkout and emits an init task for each
//! recognised build system, in rule order.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use globset::{Glob, GlobSet, GlobSetBuilder};
use walkdir::WalkDir;
use ws_protocol::{CommitContext, User};

use super::ConfigInference;
use crate::host::ProviderError;

/// A marker file pattern and the task it implies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRule {
    pub pattern: &'static str,
    pub init: &'static str,
    pub command: Option<&'static str>,
}

const RULES: &[InferenceRule] = &[
    InferenceRule {
        pattern: "yarn.lock",
        init: "yarn install",
        command: Some("yarn start"),
    },
    InferenceRule {
        pattern: "package.json",
        init: "npm install",
        command: Some("npm start"),
    },
    InferenceRule {
        pattern: "Cargo.toml",
        init: "cargo build",
        command: None,
    },
    InferenceRule {
        pattern: "go.mod",
        init: "go get && go build ./... && go test ./...",
        command: Some("go run ."),
    },
    InferenceRule {
        pattern: "requirements.txt",
        init: "pip install -r requirements.txt",
        command: None,
    },
    InferenceRule {
        pattern: "pom.xml",
        init: "mvn install -DskipTests=false",
        command: None,
    },
    InferenceRule {
        pattern: "gradlew",
        init: "./gradlew build",
        command: None,
    },
    InferenceRule {
        pattern: "build.gradle*",
        init: "gradle build",
        command: None,
    },
    InferenceRule {
        pattern: "*.csproj",
        init: "dotnet build",
        command: None,
    },
    InferenceRule {
        pattern: "Makefile",
        init: "make",
        command: None,
    },
];

/// Rules that shadow a later rule when both match
const SHADOWS: &[(&str, &str)] = &[("yarn.lock", "package.json"), ("gradlew", "build.gradle*")];

/// Infers tasks from marker files in a local checkout
#[derive(Debug, Clone)]
pub struct LocalInference {
    root: PathBuf,
}

impl LocalInference {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Rules matching the top-level entries of `root`, in rule order
    pub fn matching_rules(root: &Path) -> Result<Vec<&'static InferenceRule>, ProviderError> {
        let mut builder = GlobSetBuilder::new();
        for rule in RULES {
            let glob = Glob::new(rule.pattern)
                .map_err(|e| ProviderError::request("inference", e.to_string()))?;
            builder.add(glob);
        }
        let set: GlobSet = builder
            .build()
            .map_err(|e| ProviderError::request("inference", e.to_string()))?;

        let mut matched = vec![false; RULES.len()];
        for entry in WalkDir::new(root).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| ProviderError::Io {
                path: root.to_path_buf(),
                source: e.into(),
            })?;
            for index in set.matches(entry.file_name()) {
                matched[index] = true;
            }
        }

        for (winner, loser) in SHADOWS {
            let position = |pattern: &str| RULES.iter().position(|r| r.pattern == pattern);
            if let (Some(w), Some(l)) = (position(winner), position(loser)) {
                if matched[w] {
                    matched[l] = false;
                }
            }
        }

        Ok(RULES
            .iter()
            .zip(matched)
            .filter_map(|(rule, hit)| hit.then_some(rule))
            .collect())
    }

    /// Render matched rules as configuration text
    pub fn render(rules: &[&InferenceRule]) -> Option<String> {
        if rules.is_empty() {
            return None;
        }

        let mut text = String::from("tasks:\n");
        for rule in rules {
            text.push_str(&format!("  - init: {}\n", quote(rule.init)));
            if let Some(command) = rule.command {
                text.push_str(&format!("    command: {}\n", quote(command)));
            }
        }
        Some(text)
    }
}

fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

#[async_trait]
impl ConfigInference for LocalInference {
    async fn guess_configuration(
        &self,
        user: &User,
        commit: &CommitContext,
    ) -> Result<Option<String>, ProviderError> {
        let root = self.root.clone();
        let rules = tokio::task::spawn_blocking(move || Self::matching_rules(&root))
            .await
            .map_err(|e| ProviderError::request("inference", e.to_string()))??;

        tracing::debug!(
            user_id = %user.id,
            repo = %commit.repository.clone_url,
            matched = rules.len(),
            "inferred configuration from marker files"
        );

        Ok(Self::render(&rules))
    }
}
