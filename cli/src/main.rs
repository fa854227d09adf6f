// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # Unravel CLI
//!
//! The `unravel` binary runs the pattern-processing HTTP server and offers
//! one-shot access to the same services from the terminal.
//!
//! ## Commands
//!
//! - `unravel serve` - Run the HTTP API (default when no command is given)
//! - `unravel process` - Apply a pattern to text, a file, a web page or a video
//! - `unravel providers` - List LLM providers, their status and models
//! - `unravel patterns` - List patterns by category
//! - `unravel config show|validate|generate` - Configuration management

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use unravel_cli::commands::{self, ConfigCommand, PatternsArgs, ProcessArgs, ProvidersArgs};
use unravel_cli::server;
use unravel_core::domain::config::UnravelConfigManifest;

/// Unravel - Apply prompt patterns to text with local and hosted LLMs
#[derive(Parser)]
#[command(name = "unravel")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(short, long, global = true, env = "UNRAVEL_CONFIG_PATH", value_name = "FILE")]
    config: Option<PathBuf>,

    /// HTTP API port (default: from configuration, 3006)
    #[arg(long, global = true, env = "UNRAVEL_PORT")]
    port: Option<u16>,

    /// HTTP API bind address (default: from configuration, 0.0.0.0)
    #[arg(long, global = true, env = "UNRAVEL_HOST")]
    host: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "UNRAVEL_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    #[command(name = "serve")]
    Serve,

    /// Process input with a pattern
    #[command(name = "process")]
    Process(ProcessArgs),

    /// List LLM providers
    #[command(name = "providers")]
    Providers(ProvidersArgs),

    /// List patterns
    #[command(name = "patterns")]
    Patterns(PatternsArgs),

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let loaded = UnravelConfigManifest::load_or_default(cli.config.clone());
    let logging = loaded
        .as_ref()
        .map(|config| config.spec.observability.logging.clone())
        .unwrap_or_default();
    let level = cli.log_level.as_deref().unwrap_or(&logging.level);

    // Initialize logging
    init_logging(level, &logging.format)?;

    let overrides = ServerOverrides {
        host: cli.host,
        port: cli.port,
    };

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            info!("Starting Unravel {}", env!("CARGO_PKG_VERSION"));
            server::serve(overrides.apply(loaded)?).await
        }
        Commands::Process(args) => {
            if !commands::process::handle_command(args, overrides.apply(loaded)?).await? {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Providers(args) => commands::providers::handle_command(args, overrides.apply(loaded)?).await,
        Commands::Patterns(args) => commands::patterns::handle_command(args, overrides.apply(loaded)?).await,
        Commands::Config { command } => commands::config::handle_command(command, cli.config).await,
    }
}

/// `--host` / `--port` take precedence over the configuration file
struct ServerOverrides {
    host: Option<String>,
    port: Option<u16>,
}

impl ServerOverrides {
    fn apply(self, loaded: Result<UnravelConfigManifest>) -> Result<UnravelConfigManifest> {
        let mut config = loaded.context("Failed to load configuration")?;
        if let Some(host) = self.host {
            config.spec.server.bind_address = host;
        }
        if let Some(port) = self.port {
            config.spec.server.port = port;
        }
        Ok(config)
    }
}

/// Initialize tracing subscriber for logging. Logs go to stderr so command
/// output on stdout stays clean.
fn init_logging(level: &str, format: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false);

    if format == "json" {
        builder.json().init();
    } else {
        builder.compact().init();
    }

    Ok(())
}
