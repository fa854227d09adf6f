// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-process service wiring
//!
//! Builds the provider registry, pattern store, settings store, ingestion
//! service and processing pipeline from a loaded configuration. Both the
//! HTTP server and the one-shot commands start from here.
//!
//! # Architecture
//!
//! - **Layer:** Interface / Presentation Layer
//! - **Purpose:** Composition root for the core services

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{debug, info};

use unravel_core::{
    application::{IngestionService, ProcessingPipeline},
    domain::{
        config::UnravelConfigManifest,
        pattern::PatternRepository,
        settings::{ApiKeys, SettingsRepository},
    },
    infrastructure::{
        llm::{HttpProviderFactory, ProviderRegistry},
        FilesystemPatternRepository, JsonSettingsRepository,
    },
};

pub struct Services {
    pub pipeline: Arc<ProcessingPipeline>,
    pub registry: Arc<ProviderRegistry>,
    pub patterns: Arc<dyn PatternRepository>,
    pub settings: Arc<dyn SettingsRepository>,
    pub ingestion: Arc<IngestionService>,
}

impl Services {
    pub async fn build(config: &UnravelConfigManifest) -> Result<Self> {
        let spec = &config.spec;

        let settings: Arc<dyn SettingsRepository> =
            Arc::new(JsonSettingsRepository::new(&spec.settings.path, ApiKeys::from_env()));

        // Saved keys first, configured keys take precedence
        let mut credentials = settings.load().await.api_keys.provider_credentials();
        credentials.extend(spec.providers.credentials());
        debug!("Hosted provider credentials found for: {:?}", credentials.keys().collect::<Vec<_>>());

        let factory = HttpProviderFactory::from_config(&spec.providers, &spec.model_parameters)
            .context("Failed to initialize LLM providers")?;
        let registry = Arc::new(ProviderRegistry::with_credentials(Arc::new(factory), &credentials));
        info!("Registered providers: {}", registry.provider_ids().join(", "));

        let patterns: Arc<dyn PatternRepository> = Arc::new(
            FilesystemPatternRepository::load(&spec.patterns.builtin_dir, &spec.patterns.custom_dir)
                .await
                .with_context(|| format!("Failed to load patterns from {}", spec.patterns.builtin_dir))?,
        );

        let ingestion = Arc::new(
            IngestionService::from_config(&spec.ingestion, settings.clone())
                .context("Failed to initialize content ingestion")?,
        );

        let pipeline = Arc::new(ProcessingPipeline::new(patterns.clone(), registry.clone()));

        Ok(Self {
            pipeline,
            registry,
            patterns,
            settings,
            ingestion,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let builtin = dir.path().join("patterns");
        std::fs::create_dir_all(builtin.join("summarize")).unwrap();
        std::fs::write(builtin.join("summarize").join("system.md"), "# IDENTITY\nSummarize things.").unwrap();

        let mut config = UnravelConfigManifest::default();
        config.spec.patterns.builtin_dir = builtin.to_string_lossy().into_owned();
        config.spec.patterns.custom_dir = dir.path().join("custom").to_string_lossy().into_owned();
        config.spec.settings.path = dir.path().join("settings.json").to_string_lossy().into_owned();
        config.spec.providers.openai.api_key = Some("sk-test".to_string());

        let services = Services::build(&config).await.unwrap();

        let ids = services.registry.provider_ids();
        assert!(ids.contains(&"ollama".to_string()));
        assert!(ids.contains(&"openai".to_string()));
        assert_eq!(services.patterns.count().await, 1);
        assert!(services.patterns.get("summarize").await.is_ok());
    }
}
