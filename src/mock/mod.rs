//! In-process collaborator doubles
//!
//! Configurable stand-ins for the file provider, the inference service and
//! the parser, with call counting and failure injection for error paths.
//!
//! - `MockFileProvider`: canned repository content
//! - `MockInference`: canned guessed configuration
//! - `MockParser`: canned parse result, records every text it sees

mod failure;
mod providers;

pub use failure::{Collaborator, FailureConfig, FailureInjector};
pub use providers::{MockFileProvider, MockInference, MockParser};
