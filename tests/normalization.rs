//! Normalization tests
//!
//! Validation errors, sandbox containment, feature-flag merging and the
//! default config factory, as seen through a full resolution.

use std::collections::BTreeSet;
use std::sync::Arc;

use base64::Engine as _;
use serde_json::json;
use workspace_config::mock::{MockFileProvider, MockInference, MockParser};
use workspace_config::{
    CommitContext, ConfigOrigin, ConfigParser, ConfigResolver, DefaultConfigFactory, ErrorCode,
    HostContextProvider, LocationField, PermanentFeatureFlag, Repository, ResolveError, User,
    YamlConfigParser, CONFIG_FILE_NAME,
};

// =============================================================================
// Test Helpers
// =============================================================================

const DEFAULT_IMAGE: &str = "gitpod/workspace-full:latest";

fn commit_with(text: &str) -> CommitContext {
    CommitContext::new(Repository::new("github.com", "acme", "shop"), "main")
        .with_additional_file(CONFIG_FILE_NAME, text)
}

fn resolver_using(parser: Arc<dyn ConfigParser>) -> ConfigResolver {
    ConfigResolver::new(
        parser,
        HostContextProvider::new().with_host("github.com", Arc::new(MockFileProvider::new())),
        Arc::new(MockInference::new()),
        DefaultConfigFactory::new(DEFAULT_IMAGE).unwrap(),
    )
}

fn resolver() -> ConfigResolver {
    resolver_using(Arc::new(YamlConfigParser::new()))
}

fn flagged_user() -> User {
    User::new("u-1").with_flags(vec![
        PermanentFeatureFlag::workspace("A"),
        PermanentFeatureFlag::user("B"),
    ])
}

async fn sandbox_error(text: &str) -> workspace_config::SandboxViolation {
    match resolver().resolve(&User::new("u-1"), &commit_with(text)).await {
        Err(ResolveError::SandboxViolation(violation)) => violation,
        other => panic!("expected sandbox violation for {:?}, got {:?}", text, other),
    }
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_parser_errors_surface_verbatim() {
    let parser = MockParser::failing(vec!["unknown key: foo".to_string()]);
    let resolver = resolver_using(Arc::new(parser.clone()));

    let err = resolver
        .resolve(&User::new("u-1"), &commit_with("foo: 1"))
        .await
        .unwrap_err();

    match &err {
        ResolveError::InvalidConfig(invalid) => {
            assert_eq!(invalid.validation_errors, vec!["unknown key: foo".to_string()]);
        }
        other => panic!("expected invalid config, got {:?}", other),
    }
    assert_eq!(err.to_string(), "Invalid gitpod.yml: unknown key: foo");
    assert_eq!(parser.seen(), vec!["foo: 1".to_string()]);
}

#[tokio::test]
async fn test_yaml_parser_reports_unknown_keys() {
    let err = resolver()
        .resolve(&User::new("u-1"), &commit_with("image: foo/bar:1\nfoo: 1\n"))
        .await
        .unwrap_err();

    let failure = err.to_failure();
    assert_eq!(failure.code, ErrorCode::InvalidConfig);
    assert_eq!(
        failure.data,
        Some(json!({
            "error_type": "invalidGitpodYML",
            "validation_errors": ["unknown key: foo"],
        }))
    );
}

#[tokio::test]
async fn test_empty_dockerfile_is_invalid_not_defaulted() {
    let err = resolver()
        .resolve(&User::new("u-1"), &commit_with("image:\n  file: ''\n"))
        .await
        .unwrap_err();

    match err {
        ResolveError::InvalidConfig(invalid) => {
            assert_eq!(invalid.validation_errors, vec!["image.file must not be empty".to_string()]);
        }
        other => panic!("expected invalid config, got {:?}", other),
    }
}

#[tokio::test]
async fn test_empty_image_reference_gets_default() {
    let resolved = resolver()
        .resolve(&User::new("u-1"), &commit_with("image: ''\n"))
        .await
        .unwrap();
    assert_eq!(resolved.config.image_reference(), Some(DEFAULT_IMAGE));
}

#[tokio::test]
async fn test_invalid_config_does_not_fall_back() {
    let files = MockFileProvider::with_content("image: [unclosed");
    let inference = MockInference::with_guess("image: from/guess:1");
    let resolver = ConfigResolver::new(
        Arc::new(YamlConfigParser::new()),
        HostContextProvider::new().with_host("github.com", Arc::new(files)),
        Arc::new(inference.clone()),
        DefaultConfigFactory::new(DEFAULT_IMAGE).unwrap(),
    );
    let commit = CommitContext::new(Repository::new("github.com", "acme", "shop"), "main");

    let err = resolver.resolve(&User::new("u-1"), &commit).await.unwrap_err();

    assert!(matches!(err, ResolveError::InvalidConfig(_)));
    assert_eq!(inference.call_count(), 0);
}

// =============================================================================
// Sandbox containment
// =============================================================================

#[tokio::test]
async fn test_checkout_location_escaping_root() {
    let violation = sandbox_error("checkoutLocation: ../../etc").await;

    assert_eq!(violation.field, LocationField::CheckoutLocation);
    assert!(violation.to_string().starts_with("checkoutLocation must not leave the /workspace folder"));
}

#[tokio::test]
async fn test_workspace_location_escaping_root() {
    let violation = sandbox_error("workspaceLocation: shop/../../..").await;
    assert_eq!(violation.field, LocationField::WorkspaceLocation);
}

#[tokio::test]
async fn test_dotdot_segment_rejected_even_inside_root() {
    let violation = sandbox_error("checkoutLocation: shop/../other").await;
    assert_eq!(violation.field, LocationField::CheckoutLocation);
}

#[tokio::test]
async fn test_absolute_location_outside_root_rejected() {
    let violation = sandbox_error("checkoutLocation: /etc").await;
    assert_eq!(violation.normalized, "/etc");
}

#[tokio::test]
async fn test_locations_inside_root_accepted() {
    let text = "checkoutLocation: shop\nworkspaceLocation: shop/frontend/./app\n";
    let resolved = resolver()
        .resolve(&User::new("u-1"), &commit_with(text))
        .await
        .unwrap();

    assert_eq!(resolved.config.checkout_location.as_deref(), Some("shop"));
    assert_eq!(resolved.config.workspace_location.as_deref(), Some("shop/frontend/./app"));
}

#[tokio::test]
async fn test_sandbox_failure_payload() {
    let err = resolver()
        .resolve(&User::new("u-1"), &commit_with("checkoutLocation: ../../etc"))
        .await
        .unwrap_err();

    let failure = err.to_failure();
    assert_eq!(failure.code, ErrorCode::SandboxViolation);
    assert_eq!(failure.data.unwrap()["field"], "checkoutLocation");
}

// =============================================================================
// Feature flags
// =============================================================================

#[tokio::test]
async fn test_flags_replace_literal_flags() {
    let text = "image: foo/bar:1\n_featureFlags: [B, C]\n";
    let resolved = resolver().resolve(&flagged_user(), &commit_with(text)).await.unwrap();

    let expected: BTreeSet<String> = ["A".to_string()].into_iter().collect();
    assert_eq!(resolved.config.feature_flags, Some(expected));
}

#[tokio::test]
async fn test_flags_removed_when_user_has_none_persisted() {
    let text = "image: foo/bar:1\n_featureFlags: [B]\n";
    let user = User::new("u-1").with_flags(vec![
        PermanentFeatureFlag::user("B"),
        PermanentFeatureFlag::workspace("C").disabled(),
    ]);

    let resolved = resolver().resolve(&user, &commit_with(text)).await.unwrap();

    assert!(resolved.config.feature_flags.is_none());
    let json = serde_json::to_value(&resolved.config).unwrap();
    assert!(json.get("_featureFlags").is_none());
}

#[tokio::test]
async fn test_literal_origin_cannot_be_spoofed() {
    let resolved = resolver()
        .resolve(&User::new("u-1"), &commit_with("_origin: default\n"))
        .await
        .unwrap();
    assert_eq!(resolved.config.origin, Some(ConfigOrigin::AdditionalContent));
}

// =============================================================================
// Default config
// =============================================================================

#[test]
fn test_build_default_is_fresh() {
    let factory = DefaultConfigFactory::new(DEFAULT_IMAGE).unwrap();
    let first = factory.build();
    let second = factory.build();

    assert_ne!(first.ide_credentials, second.ide_credentials);
    for config in [&first, &second] {
        let credentials = config.ide_credentials.as_deref().unwrap();
        let bytes = base64::engine::general_purpose::STANDARD.decode(credentials).unwrap();
        assert_eq!(bytes.len(), 32);
    }

    let strip = |mut config: workspace_config::WorkspaceConfig| {
        config.ide_credentials = None;
        config
    };
    assert_eq!(strip(first), strip(second));
}

#[test]
fn test_default_config_shape() {
    let config = DefaultConfigFactory::new(DEFAULT_IMAGE).unwrap().build();

    assert_eq!(config.image_reference(), Some(DEFAULT_IMAGE));
    assert_eq!(config.ports, Some(vec![]));
    assert_eq!(config.tasks, Some(vec![]));
    assert!(config.vscode.extensions.is_empty());
    assert!(config.origin.is_none());
}

#[test]
fn test_empty_default_image_rejected() {
    assert!(DefaultConfigFactory::new("").is_err());
}
