// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! HTTP server bootstrap
//!
//! Binds the listener, mounts the API router and serves until Ctrl+C or
//! SIGTERM.

use anyhow::{Context, Result};
use colored::Colorize;
use std::path::PathBuf;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn};

use unravel_core::domain::config::UnravelConfigManifest;
use unravel_core::presentation::api::{app, AppState, RouterOptions};

use crate::services::Services;

const BYTES_PER_MB: u64 = 1024 * 1024;

pub fn router_options(config: &UnravelConfigManifest) -> RouterOptions {
    let server = &config.spec.server;
    let static_dir = server.static_dir.as_ref().map(PathBuf::from);
    if let Some(dir) = &static_dir {
        if !dir.is_dir() {
            warn!("Static directory {:?} does not exist, frontend requests will 404", dir);
        }
    }

    RouterOptions {
        static_dir,
        max_upload_bytes: usize::try_from(server.max_upload_mb.saturating_mul(BYTES_PER_MB)).unwrap_or(usize::MAX),
    }
}

pub async fn serve(config: UnravelConfigManifest) -> Result<()> {
    let services = Services::build(&config).await?;

    let state = AppState::new(services.pipeline, services.settings, services.ingestion);
    let router = app(state, router_options(&config));

    let addr = format!("{}:{}", config.spec.server.bind_address, config.spec.server.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    info!("Unravel server listening on {}", addr);
    println!("{} http://{}", "Unravel server running at".green().bold(), addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;

    info!("Unravel server shutting down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
