// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Provider listing

use anyhow::Result;
use clap::Args;
use colored::Colorize;

use unravel_core::domain::config::UnravelConfigManifest;
use unravel_core::domain::llm::ProviderStatus;

use crate::services::Services;

#[derive(Args, Debug)]
pub struct ProvidersArgs {
    /// Print the listing as JSON
    #[arg(long)]
    pub json: bool,
}

pub async fn handle_command(args: ProvidersArgs, config: UnravelConfigManifest) -> Result<()> {
    let services = Services::build(&config).await?;
    let providers = services.registry.list_providers().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&providers)?);
        return Ok(());
    }

    println!("{}", "LLM Providers:".bold());
    for provider in &providers {
        print_provider(provider);
    }

    let available = providers.iter().filter(|p| p.is_available()).count();
    println!();
    println!("{} of {} providers available", available, providers.len());

    Ok(())
}

fn print_provider(provider: &ProviderStatus) {
    let marker = if provider.is_available() {
        "✓".green()
    } else {
        "✗".red()
    };
    println!("  {} {} ({})", marker, provider.name.bold(), provider.id);

    if let Some(error) = &provider.error {
        println!("    {}", error.red());
    }
    if provider.models.is_empty() {
        println!("    {}", "(no models)".dimmed());
    }
    for model in &provider.models {
        if model.context_length > 0 {
            println!("    - {} {}", model.id, format!("[{} ctx]", model.context_length).dimmed());
        } else {
            println!("    - {}", model.id);
        }
    }
}
