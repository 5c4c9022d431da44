//! Default Config Factory
//!
//! Builds the fallback configuration used when no source yields one. Every
//! call generates a fresh per-workspace IDE credential.

use base64::Engine as _;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use regex_lite::Regex;
use ws_protocol::{ImageConfig, WorkspaceConfig};

/// Number of random bytes in an IDE credential
pub const IDE_CREDENTIALS_LEN: usize = 32;

/// Loose image reference grammar: `[registry[:port]/]path[:tag][@sha256:digest]`
const IMAGE_REFERENCE_PATTERN: &str = r"^(?:[a-zA-Z0-9.-]+(?::[0-9]+)?/)?[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*(?:/[a-z0-9]+(?:(?:[._]|__|-+)[a-z0-9]+)*)*(?::[A-Za-z0-9_][A-Za-z0-9_.-]{0,127})?(?:@sha256:[a-f0-9]{64})?$";

/// The deployment default image is not a well-formed image reference
#[derive(Debug, Clone, thiserror::Error)]
#[error("default workspace image {0:?} is not a valid image reference")]
pub struct InvalidImageError(pub String);

/// Check whether `reference` looks like a container image reference
pub fn is_image_reference(reference: &str) -> bool {
    match Regex::new(IMAGE_REFERENCE_PATTERN) {
        Ok(re) => re.is_match(reference),
        Err(_) => false,
    }
}

/// Generate a base64-encoded credential from `IDE_CREDENTIALS_LEN` random bytes
pub fn generate_ide_credentials<R: RngCore + CryptoRng>(rng: &mut R) -> String {
    let mut bytes = [0u8; IDE_CREDENTIALS_LEN];
    rng.fill_bytes(&mut bytes);
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// Produces default workspace configs for one deployment
#[derive(Debug, Clone)]
pub struct DefaultConfigFactory {
    workspace_image: String,
}

impl DefaultConfigFactory {
    /// Create a factory. The image is checked once here, never per call.
    pub fn new(workspace_image: impl Into<String>) -> Result<Self, InvalidImageError> {
        let workspace_image = workspace_image.into();
        if !is_image_reference(&workspace_image) {
            return Err(InvalidImageError(workspace_image));
        }
        Ok(Self { workspace_image })
    }

    pub fn workspace_image(&self) -> &str {
        &self.workspace_image
    }

    /// Build a default config with a credential from the OS random source
    pub fn build(&self) -> WorkspaceConfig {
        self.build_with_rng(&mut OsRng)
    }

    /// Build a default config drawing the credential from `rng`
    pub fn build_with_rng<R: RngCore + CryptoRng>(&self, rng: &mut R) -> WorkspaceConfig {
        WorkspaceConfig {
            image: Some(ImageConfig::Reference(self.workspace_image.clone())),
            ports: Some(Vec::new()),
            tasks: Some(Vec::new()),
            ide_credentials: Some(generate_ide_credentials(rng)),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn decode(credentials: &str) -> Vec<u8> {
        base64::engine::general_purpose::STANDARD.decode(credentials).unwrap()
    }

    #[test]
    fn test_image_references() {
        for valid in [
            "gitpod/workspace-full:latest",
            "foo/bar:latest",
            "node:20",
            "ubuntu",
            "gcr.io/gitpod-io/workspace-full",
            "localhost:5000/team/app:1.2.3",
            "eu.gcr.io/gitpod-core-dev/build/workspace-images:commit-abc",
            "registry.example.com/img@sha256:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef",
        ] {
            assert!(is_image_reference(valid), "{} should be valid", valid);
        }

        for invalid in ["", " ", "Foo/Bar", "image with spaces", "trailing/", ":tag"] {
            assert!(!is_image_reference(invalid), "{:?} should be invalid", invalid);
        }
    }

    #[test]
    fn test_new_rejects_empty_image() {
        assert!(DefaultConfigFactory::new("").is_err());
        assert!(DefaultConfigFactory::new("gitpod/workspace-full:latest").is_ok());
    }

    #[test]
    fn test_default_shape() {
        let factory = DefaultConfigFactory::new("gitpod/workspace-full:latest").unwrap();
        let config = factory.build();

        assert_eq!(config.image_reference(), Some("gitpod/workspace-full:latest"));
        assert_eq!(config.ports, Some(vec![]));
        assert_eq!(config.tasks, Some(vec![]));
        assert!(config.feature_flags.is_none());
        assert!(config.vscode.extensions.is_empty());
        assert!(config.checkout_location.is_none());
        assert_eq!(decode(config.ide_credentials.as_deref().unwrap()).len(), IDE_CREDENTIALS_LEN);
    }

    #[test]
    fn test_credentials_are_fresh() {
        let factory = DefaultConfigFactory::new("gitpod/workspace-full:latest").unwrap();
        let first = factory.build();
        let second = factory.build();

        assert_ne!(first.ide_credentials, second.ide_credentials);

        let strip = |mut c: WorkspaceConfig| {
            c.ide_credentials = None;
            c
        };
        assert_eq!(strip(first), strip(second));
    }

    #[test]
    fn test_seeded_rng_is_deterministic() {
        let factory = DefaultConfigFactory::new("ubuntu").unwrap();
        let a = factory.build_with_rng(&mut StdRng::seed_from_u64(7));
        let b = factory.build_with_rng(&mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }
}
