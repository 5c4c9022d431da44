//! YAML parser.
//!
//! Validates the top-level key set and the types of the fields the resolver
//! inspects. Everything else is carried through untouched.

use serde_yaml::Value;
use ws_protocol::WorkspaceConfig;

use crate::{ConfigParser, ParseResult};

/// Top-level keys accepted in a configuration file.
pub const KNOWN_KEYS: &[&str] = &[
    "image",
    "ports",
    "tasks",
    "checkoutLocation",
    "workspaceLocation",
    "vscode",
    "jetbrains",
    "gitConfig",
    "github",
    "coreDump",
    "additionalRepositories",
    "mainConfiguration",
    "workspaceClass",
    "experimentalNetwork",
    "env",
    "_origin",
    "_featureFlags",
];

/// Parser for YAML configuration text.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlConfigParser;

impl YamlConfigParser {
    pub fn new() -> Self {
        Self
    }

    fn check_keys(mapping: &serde_yaml::Mapping) -> Vec<String> {
        let mut errors = Vec::new();
        for key in mapping.keys() {
            match key.as_str() {
                Some(name) if KNOWN_KEYS.contains(&name) => {}
                Some(name) => errors.push(format!("unknown key: {}", name)),
                None => errors.push(format!("non-string key: {}", describe(key))),
            }
        }
        errors
    }

    /// A Dockerfile image must name its file; an empty one is not a missing image.
    fn check_image(mapping: &serde_yaml::Mapping) -> Option<String> {
        let file = mapping.get("image")?.get("file")?;
        match file.as_str() {
            Some(path) if path.trim().is_empty() => Some("image.file must not be empty".to_string()),
            _ => None,
        }
    }
}

impl ConfigParser for YamlConfigParser {
    fn parse(&self, text: &str) -> ParseResult {
        let document: Value = match serde_yaml::from_str(text) {
            Ok(value) => value,
            Err(e) => return ParseResult::invalid(vec![format!("YAML syntax error: {}", e)]),
        };

        let key_errors = match &document {
            Value::Null => return ParseResult::valid(WorkspaceConfig::default()),
            Value::Mapping(mapping) => {
                let mut errors = Self::check_keys(mapping);
                errors.extend(Self::check_image(mapping));
                errors
            }
            other => {
                return ParseResult::invalid(vec![format!(
                    "configuration must be a mapping, got {}",
                    describe(other)
                )])
            }
        };
        if !key_errors.is_empty() {
            return ParseResult::invalid(key_errors);
        }

        match serde_yaml::from_value::<WorkspaceConfig>(document) {
            Ok(config) => ParseResult::valid(config),
            Err(e) => ParseResult::invalid(vec![e.to_string()]),
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
