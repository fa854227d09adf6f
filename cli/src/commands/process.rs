// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! One-shot pattern processing
//!
//! Input comes from exactly one of `--input`, `--file`, `--url` or
//! `--youtube`, or from stdin when none is given.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::io::IsTerminal;
use std::path::PathBuf;
use tokio::io::AsyncReadExt;

use unravel_core::domain::config::UnravelConfigManifest;
use unravel_core::domain::ingestion::is_youtube_url;
use unravel_core::domain::llm::GenerationOptions;
use unravel_core::domain::process::{ProcessRequest, ProcessResult};

use crate::services::Services;

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Pattern to apply (e.g. summarize, extract_wisdom)
    #[arg(short, long)]
    pub pattern: String,

    /// Provider id (ollama, openai, anthropic, openrouter, grok)
    #[arg(long, default_value = "ollama")]
    pub provider: String,

    /// Model id as understood by the provider
    #[arg(short, long)]
    pub model: String,

    /// Literal input text
    #[arg(short, long, group = "source")]
    pub input: Option<String>,

    /// Read input from a text file
    #[arg(short, long, value_name = "FILE", group = "source")]
    pub file: Option<PathBuf>,

    /// Scrape a web page and use its text as input
    #[arg(long, value_name = "URL", group = "source")]
    pub url: Option<String>,

    /// Use a YouTube video's metadata and transcript as input
    #[arg(long, value_name = "URL", group = "source")]
    pub youtube: Option<String>,

    /// Leave the video description out of YouTube input
    #[arg(long)]
    pub no_description: bool,

    #[arg(long)]
    pub temperature: Option<f32>,

    #[arg(long)]
    pub top_p: Option<f32>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,
}

impl ProcessArgs {
    pub fn generation_options(&self) -> GenerationOptions {
        let mut options = GenerationOptions::default();
        if let Some(temperature) = self.temperature {
            options.temperature = temperature;
        }
        if let Some(top_p) = self.top_p {
            options.top_p = top_p;
        }
        if let Some(max_tokens) = self.max_tokens {
            options.max_tokens = max_tokens;
        }
        options
    }
}

/// Returns `Ok(false)` when processing completed with a failure result
pub async fn handle_command(args: ProcessArgs, config: UnravelConfigManifest) -> Result<bool> {
    let services = Services::build(&config).await?;

    let input = read_input(&args, &services).await?;
    let request = ProcessRequest::new(&args.pattern, input, &args.provider, &args.model)
        .with_options(args.generation_options());

    let result = services.pipeline.process(request).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(result.is_success());
    }

    match &result {
        ProcessResult::Success(success) => {
            println!("{}", success.content);
            eprintln!(
                "{}",
                format!(
                    "{} · {}:{} · {} ms · {} tokens",
                    success.metadata.pattern,
                    success.metadata.provider,
                    success.metadata.model,
                    success.duration_ms,
                    success.usage.total_tokens
                )
                .dimmed()
            );
        }
        ProcessResult::Failure(failure) => {
            eprintln!("{} {}", "✗".red(), failure.error.red());
        }
    }

    Ok(result.is_success())
}

async fn read_input(args: &ProcessArgs, services: &Services) -> Result<String> {
    if let Some(input) = &args.input {
        return Ok(input.clone());
    }

    if let Some(path) = &args.file {
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {:?}", path))?;
        return Ok(String::from_utf8_lossy(&bytes).into_owned());
    }

    if let Some(url) = &args.url {
        let scraped = services
            .ingestion
            .scrape_url(url)
            .await
            .with_context(|| format!("URL processing failed for {}", url))?;
        eprintln!("{}", format!("Scraped \"{}\" ({} chars)", scraped.title, scraped.length).dimmed());
        return Ok(scraped.content);
    }

    if let Some(url) = &args.youtube {
        if !is_youtube_url(url) {
            anyhow::bail!("Invalid YouTube URL: {}", url);
        }
        let video = services
            .ingestion
            .process_youtube(url, !args.no_description)
            .await
            .with_context(|| format!("YouTube processing failed for {}", url))?;
        eprintln!("{}", format!("Loaded \"{}\" ({} chars)", video.title, video.length).dimmed());
        return Ok(video.content);
    }

    let mut stdin = tokio::io::stdin();
    if std::io::stdin().is_terminal() {
        anyhow::bail!("No input provided. Use --input, --file, --url, --youtube or pipe text on stdin");
    }
    let mut input = String::new();
    stdin
        .read_to_string(&mut input)
        .await
        .context("Failed to read input from stdin")?;
    Ok(input)
}
