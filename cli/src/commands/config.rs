// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use unravel_core::domain::config::{
    UnravelConfigManifest, DEFAULT_ANTHROPIC_ENDPOINT, DEFAULT_GROK_ENDPOINT, DEFAULT_OPENAI_ENDPOINT,
    DEFAULT_OPENROUTER_ENDPOINT,
};

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective configuration as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate sample configuration
    Generate {
        /// Output path (default: ./unravel-config.yaml)
        #[arg(short, long, default_value = "./unravel-config.yaml")]
        output: PathBuf,

        /// Include examples and comments
        #[arg(long)]
        examples: bool,
    },
}

pub async fn handle_command(command: ConfigCommand, config_override: Option<PathBuf>) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml).await,
        ConfigCommand::Validate { file } => validate(file.or(config_override)).await,
        ConfigCommand::Generate { output, examples } => generate(output, examples).await,
    }
}

fn key_state(key: Option<String>) -> colored::ColoredString {
    match key {
        Some(_) => "configured".green(),
        None => "not set".dimmed(),
    }
}

async fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config =
        UnravelConfigManifest::load_or_default(config_override.clone()).context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. UNRAVEL_CONFIG_PATH: {}",
            std::env::var("UNRAVEL_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./unravel-config.yaml");
        println!("  4. ~/.unravel/config.yaml");
        println!("  5. /etc/unravel/config.yaml");
        println!();
    }

    if as_yaml {
        print!("{}", serde_yaml::to_string(&config).context("Failed to render configuration")?);
        return Ok(());
    }

    let spec = &config.spec;

    println!("{}", "Current configuration:".bold());
    println!();

    println!("{}", "Server:".bold());
    println!("  Listen: {}:{}", spec.server.bind_address, spec.server.port);
    println!(
        "  Static dir: {}",
        spec.server.static_dir.as_deref().unwrap_or("(none)")
    );
    println!("  Max upload: {} MB", spec.server.max_upload_mb);
    println!();

    println!("{}", "LLM Providers:".bold());
    println!("  {} (local)", "ollama".bold());
    println!("    Endpoint: {}", spec.providers.ollama.endpoint);
    let defaults = [
        DEFAULT_OPENAI_ENDPOINT,
        DEFAULT_ANTHROPIC_ENDPOINT,
        DEFAULT_OPENROUTER_ENDPOINT,
        DEFAULT_GROK_ENDPOINT,
    ];
    for ((id, provider), default) in spec.providers.hosted().into_iter().zip(defaults) {
        println!("  {} (hosted)", id.bold());
        println!("    Endpoint: {}", provider.endpoint_or(default));
        println!("    API key: {}", key_state(provider.resolved_api_key()));
    }
    println!("  Request timeout: {}s", spec.providers.request_timeout_seconds);
    println!();

    println!("{}", "Patterns:".bold());
    println!("  Built-in: {}", spec.patterns.builtin_dir);
    println!("  Custom: {}", spec.patterns.custom_dir);
    println!("  Settings: {}", spec.settings.path);
    println!();

    println!("{}", "Ingestion:".bold());
    println!("  yt-dlp: {}", spec.ingestion.ytdlp_path);
    println!("  YouTube API key: {}", key_state(spec.ingestion.resolved_youtube_api_key()));
    println!("  Jina API key: {}", key_state(spec.ingestion.resolved_jina_api_key()));
    println!();

    println!("{}", "Logging:".bold());
    println!(
        "  Level: {} ({})",
        spec.observability.logging.level, spec.observability.logging.format
    );
    println!();

    Ok(())
}

async fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config = UnravelConfigManifest::load_or_default(config_path).context("Failed to load configuration")?;

    config.validate().context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

async fn generate(output: PathBuf, with_examples: bool) -> Result<()> {
    let sample = if with_examples {
        include_str!("../../templates/config-with-examples.yaml")
    } else {
        include_str!("../../templates/config-minimal.yaml")
    };

    std::fs::write(&output, sample).with_context(|| format!("Failed to write config to {:?}", output))?;

    println!("{}", format!("✓ Configuration generated: {}", output.display()).green());

    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_templates_parse_and_validate() {
        for template in [
            include_str!("../../templates/config-minimal.yaml"),
            include_str!("../../templates/config-with-examples.yaml"),
        ] {
            let config = unravel_core::domain::config::UnravelConfigManifest::from_yaml_str(template).unwrap();
            config.validate().unwrap();
        }
    }
}
