//! Log severity tests
//!
//! Captures formatted events from a resolution and checks the level and
//! fields each outcome is reported with.

use std::io;
use std::sync::{Arc, Mutex};

use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;
use workspace_config::mock::{MockFileProvider, MockInference};
use workspace_config::{
    CommitContext, ConfigResolver, DefaultConfigFactory, HostContextProvider, Repository, User,
    YamlConfigParser, CONFIG_FILE_NAME,
};

// =============================================================================
// Test Helpers
// =============================================================================

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn lines(&self) -> Vec<String> {
        let bytes = self.0.lock().unwrap().clone();
        String::from_utf8(bytes).unwrap().lines().map(str::to_string).collect()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for Captured {
    type Writer = Captured;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn commit() -> CommitContext {
    CommitContext::new(Repository::new("github.com", "acme", "shop"), "main")
}

/// Resolve `commit` and return every formatted log line it produced
async fn resolve_logs(commit: CommitContext) -> Vec<String> {
    let logs = Captured::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(logs.clone())
        .with_ansi(false)
        .with_max_level(Level::DEBUG)
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let resolver = ConfigResolver::new(
        Arc::new(YamlConfigParser::new()),
        HostContextProvider::new().with_host("github.com", Arc::new(MockFileProvider::new())),
        Arc::new(MockInference::new()),
        DefaultConfigFactory::new("gitpod/workspace-full:latest").unwrap(),
    );
    let _ = resolver.resolve(&User::new("u-7"), &commit).await;

    logs.lines()
}

fn find<'a>(lines: &'a [String], needle: &str) -> &'a str {
    lines
        .iter()
        .find(|line| line.contains(needle))
        .unwrap_or_else(|| panic!("no log line containing {:?} in {:#?}", needle, lines))
}

// =============================================================================
// Severities
// =============================================================================

#[tokio::test]
async fn test_invalid_config_logged_at_info_with_text() {
    let lines = resolve_logs(commit().with_additional_file(CONFIG_FILE_NAME, "foo: 1")).await;

    let line = find(&lines, "Invalid gitpod.yml: unknown key: foo");
    assert!(line.contains("INFO"), "{}", line);
    assert!(line.contains("config_text=\"foo: 1\""), "{}", line);
    assert!(line.contains("fetch_config"), "{}", line);
    assert!(line.contains("user_id=u-7"), "{}", line);
    assert!(lines.iter().all(|line| !line.contains("ERROR")), "{:#?}", lines);
}

#[tokio::test]
async fn test_sandbox_violation_logged_at_error_with_path() {
    let lines = resolve_logs(commit().with_additional_file(CONFIG_FILE_NAME, "checkoutLocation: ../../etc")).await;

    let line = find(&lines, "outside the sandbox root");
    assert!(line.contains("ERROR"), "{}", line);
    assert!(line.contains("normalized=/../etc"), "{}", line);
    assert!(line.contains("field=checkoutLocation"), "{}", line);
}

#[tokio::test]
async fn test_default_fallback_logged_at_debug() {
    let lines = resolve_logs(commit()).await;

    let line = find(&lines, "using default config");
    assert!(line.contains("DEBUG"), "{}", line);
    assert!(line.contains("revision=main"), "{}", line);
    assert!(lines.iter().all(|line| !line.contains("ERROR") && !line.contains("INFO")), "{:#?}", lines);
}
