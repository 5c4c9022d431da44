//! Workspace config CLI
//!
//! Entry point for the `ws-config` command-line tool.

use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use workspace_config::{
    CommitContext, ConfigResolver, DeploymentSettings, ErrorCode, HostContextProvider, LocalCheckoutFileProvider,
    LocalInference, Repository, ResolveError, SandboxGuard, User, YamlConfigParser, CONFIG_FILE_NAME,
};

/// Exit code for a config file that failed validation
const EXIT_INVALID_CONFIG: i32 = 2;

/// Exit code for a location that escapes the sandbox root
const EXIT_SANDBOX_VIOLATION: i32 = 3;

#[derive(Parser)]
#[command(name = "ws-config")]
#[command(about = "Resolve the effective workspace configuration", version)]
struct Cli {
    /// Enable debug logging (overrides RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve the config for a local checkout
    Resolve {
        /// Repository checkout to read the config file from
        #[arg(long)]
        repo_dir: PathBuf,

        /// Source host of the repository
        #[arg(long, default_value = "github.com")]
        host: String,

        /// Clone URL recorded in logs and provenance
        #[arg(long)]
        clone_url: Option<String>,

        /// Revision being resolved
        #[arg(long, default_value = "HEAD")]
        revision: String,

        /// File whose content is attached as unpushed .gitpod.yml content
        #[arg(long)]
        additional_file: Option<PathBuf>,

        /// User JSON file (id and feature flags)
        #[arg(long)]
        user: Option<PathBuf>,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Skip every source and use the default config
        #[arg(long)]
        force_default: bool,

        /// Write the resolved config to this file instead of stdout
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },

    /// Print a freshly built default config
    Default {
        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Validate a config file without resolving
    Verify {
        /// Path to the config file (default: .gitpod.yml)
        path: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct SettingsArgs {
    /// Deployment settings file (TOML)
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Override the deployment default image
    #[arg(long)]
    default_image: Option<String>,
}

impl SettingsArgs {
    fn load(&self) -> DeploymentSettings {
        let overrides = self.default_image.as_ref().map(|image| {
            serde_json::json!({ "workspace_defaults": { "workspace_image": image } })
        });

        match DeploymentSettings::build(self.settings.as_deref(), overrides) {
            Ok(settings) => settings,
            Err(e) => {
                eprintln!("Error loading settings: {}", e);
                process::exit(1);
            }
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Resolve {
            repo_dir,
            host,
            clone_url,
            revision,
            additional_file,
            user,
            settings,
            force_default,
            out,
        } => {
            let commit = build_commit(&repo_dir, &host, clone_url, revision, additional_file, force_default);
            let user = load_user(user.as_deref());
            run_resolve(&repo_dir, &host, &settings.load(), &user, &commit, out.as_deref()).await;
        }
        Commands::Default { settings } => {
            run_default(&settings.load());
        }
        Commands::Verify { path } => {
            run_verify(path.unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME)));
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_commit(
    repo_dir: &Path,
    host: &str,
    clone_url: Option<String>,
    revision: String,
    additional_file: Option<PathBuf>,
    force_default: bool,
) -> CommitContext {
    let name = repo_dir
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("repository");

    let mut repository = Repository::new(host, "local", name);
    if let Some(url) = clone_url {
        repository.clone_url = url;
    }

    let mut commit = CommitContext::new(repository, revision);
    if let Some(path) = additional_file {
        match fs::read_to_string(&path) {
            Ok(content) => commit = commit.with_additional_file(CONFIG_FILE_NAME, content),
            Err(e) => {
                eprintln!("Error reading {}: {}", path.display(), e);
                process::exit(1);
            }
        }
    }
    if force_default {
        commit = commit.with_default_config();
    }
    commit
}

fn load_user(path: Option<&Path>) -> User {
    let Some(path) = path else {
        return User::new("local");
    };

    let parsed = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str(&content).map_err(|e| e.to_string()));

    match parsed {
        Ok(user) => user,
        Err(e) => {
            eprintln!("Error loading user {}: {}", path.display(), e);
            process::exit(1);
        }
    }
}

async fn run_resolve(
    repo_dir: &Path,
    host: &str,
    settings: &DeploymentSettings,
    user: &User,
    commit: &CommitContext,
    out: Option<&Path>,
) {
    let hosts = HostContextProvider::new().with_host(host, Arc::new(LocalCheckoutFileProvider::new(repo_dir)));

    let resolver = match ConfigResolver::from_settings(
        settings,
        Arc::new(YamlConfigParser::new()),
        hosts,
        Arc::new(LocalInference::new(repo_dir)),
    ) {
        Ok(resolver) => resolver,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    };

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            on_signal.cancel();
        }
    });

    let resolved = match resolver.resolve_with_cancellation(user, commit, &cancel).await {
        Ok(resolved) => resolved,
        Err(e) => {
            print_failure(&e);
            process::exit(exit_code(&e));
        }
    };

    if let Some(path) = out {
        if let Err(e) = resolved.write_to_file(path) {
            eprintln!("Error writing {}: {}", path.display(), e);
            process::exit(1);
        }
        eprintln!("Resolved config ({}) written to {}", resolved.origin(), path.display());
        return;
    }

    match resolved.to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_default(settings: &DeploymentSettings) {
    let factory = match settings.default_config_factory() {
        Ok(factory) => factory,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            process::exit(1);
        }
    };

    match serde_json::to_string_pretty(&factory.build()) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

fn run_verify(path: PathBuf) {
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Error reading {}: {}", path.display(), e);
            process::exit(1);
        }
    };

    let config = match ws_config_parser::parse_valid(&text) {
        Ok(config) => config,
        Err(errors) => {
            eprintln!("Configuration invalid: {}", path.display());
            for error in errors {
                eprintln!("  - {}", error);
            }
            process::exit(EXIT_INVALID_CONFIG);
        }
    };

    if let Err(violation) = SandboxGuard::new().check_config(&config, "local") {
        eprintln!("Configuration error: {}", violation);
        process::exit(EXIT_SANDBOX_VIOLATION);
    }

    println!("Configuration valid: {}", path.display());
    println!();
    if let Some(image) = config.image_reference() {
        println!("  Image: {}", image);
    }
    if let Some(location) = &config.checkout_location {
        println!("  Checkout location: {}", location);
    }
    if let Some(location) = &config.workspace_location {
        println!("  Workspace location: {}", location);
    }
    if let Some(tasks) = &config.tasks {
        println!("  Tasks: {}", tasks.len());
    }
    if let Some(ports) = &config.ports {
        println!("  Ports: {}", ports.len());
    }
    if !config.vscode.extensions.is_empty() {
        println!("  VS Code extensions: {}", config.vscode.extensions.join(", "));
    }
}

fn print_failure(error: &ResolveError) {
    let failure = error.to_failure();
    if !failure.code.is_user_error() {
        tracing::error!(code = %failure.code, "config resolution failed: {}", failure.message);
    }

    match serde_json::to_string_pretty(&failure) {
        Ok(json) => println!("{}", json),
        Err(_) => eprintln!("{}", error),
    }
}

fn exit_code(error: &ResolveError) -> i32 {
    match error.code() {
        ErrorCode::InvalidConfig => EXIT_INVALID_CONFIG,
        ErrorCode::SandboxViolation => EXIT_SANDBOX_VIOLATION,
        _ => 1,
    }
}
