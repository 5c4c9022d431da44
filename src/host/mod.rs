//! Source-host integrations
//!
//! Per-host services the resolver consults for repository content:
//! - FileProvider trait: fetches the config file at a revision
//! - LocalCheckoutFileProvider: serves a checkout on the local disk
//! - HostContextProvider: explicit host -> services registry

mod file_provider;
mod local;

pub use file_provider::{FileProvider, ProviderError};
pub use local::LocalCheckoutFileProvider;

use std::collections::HashMap;
use std::sync::Arc;

/// Services registered for one source host
#[derive(Clone)]
pub struct HostServices {
    pub file_provider: Arc<dyn FileProvider>,
}

impl HostServices {
    pub fn new(file_provider: Arc<dyn FileProvider>) -> Self {
        Self { file_provider }
    }
}

impl std::fmt::Debug for HostServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostServices").finish_non_exhaustive()
    }
}

/// Registry of host integrations, keyed by lowercase host name
#[derive(Debug, Clone, Default)]
pub struct HostContextProvider {
    hosts: HashMap<String, HostServices>,
}

impl HostContextProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register services for `host`, replacing any previous registration
    pub fn register(&mut self, host: &str, services: HostServices) {
        self.hosts.insert(host.to_ascii_lowercase(), services);
    }

    /// Builder form of [`register`](Self::register)
    pub fn with_host(mut self, host: &str, file_provider: Arc<dyn FileProvider>) -> Self {
        self.register(host, HostServices::new(file_provider));
        self
    }

    pub fn get(&self, host: &str) -> Option<&HostServices> {
        self.hosts.get(&host.to_ascii_lowercase())
    }
}
