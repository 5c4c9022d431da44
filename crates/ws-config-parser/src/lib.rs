//! Parser for `.gitpod.yml` configuration files.
//!
//! Turns raw configuration text into a [`WorkspaceConfig`] plus the list of
//! structural validation errors, if any. Callers decide what an invalid
//! file means for them.

mod parser;
mod result;

pub use parser::{YamlConfigParser, KNOWN_KEYS};
pub use result::ParseResult;

use ws_protocol::WorkspaceConfig;

/// Parses configuration text into a structured config.
pub trait ConfigParser: Send + Sync {
    /// Parse `text`. Never fails outright: problems are reported through
    /// [`ParseResult::validation_errors`].
    fn parse(&self, text: &str) -> ParseResult;
}

/// Parse with the bundled YAML parser.
pub fn parse(text: &str) -> ParseResult {
    YamlConfigParser::new().parse(text)
}

/// Convenience for callers that only need a valid config.
pub fn parse_valid(text: &str) -> Result<WorkspaceConfig, Vec<String>> {
    let result = parse(text);
    match result.validation_errors {
        Some(errors) => Err(errors),
        None => Ok(result.config),
    }
}
