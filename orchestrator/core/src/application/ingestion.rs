// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Content Ingestion Service
//!
//! Acquires input text from URLs and YouTube videos. Service keys are taken
//! from configuration first and from the persisted settings document second.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Resolves credentials and delegates to ingestion adapters

use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::config::IngestionConfig;
use crate::domain::ingestion::{
    ContentScraper, IngestionError, ScrapeOptions, ScrapedContent, VideoContent, VideoOptions, VideoSource,
};
use crate::domain::settings::SettingsRepository;
use crate::infrastructure::scraper::WebScraper;
use crate::infrastructure::youtube::YoutubeVideoSource;

pub struct IngestionService {
    scraper: Arc<dyn ContentScraper>,
    videos: Arc<dyn VideoSource>,
    settings: Arc<dyn SettingsRepository>,
    jina_api_key: Option<String>,
    youtube_api_key: Option<String>,
}

impl IngestionService {
    pub fn new(
        scraper: Arc<dyn ContentScraper>,
        videos: Arc<dyn VideoSource>,
        settings: Arc<dyn SettingsRepository>,
        config: &IngestionConfig,
    ) -> Self {
        Self {
            scraper,
            videos,
            settings,
            jina_api_key: config.resolved_jina_api_key(),
            youtube_api_key: config.resolved_youtube_api_key(),
        }
    }

    /// Production wiring: direct HTTP scraper and YouTube source
    pub fn from_config(config: &IngestionConfig, settings: Arc<dyn SettingsRepository>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .build()
            .context("Failed to build ingestion HTTP client")?;

        let scraper = WebScraper::new(
            client.clone(),
            Duration::from_secs(config.scrape_timeout_seconds),
            Duration::from_secs(config.jina_timeout_seconds),
        );
        let videos = YoutubeVideoSource::new(client, config.ytdlp_path.clone());

        Ok(Self::new(Arc::new(scraper), Arc::new(videos), settings, config))
    }

    async fn resolve_key(&self, configured: &Option<String>, service: &str) -> Option<String> {
        if let Some(key) = configured {
            return Some(key.clone());
        }
        let settings = self.settings.load().await;
        let key = settings.api_keys.get(service).map(str::to_string);
        debug!("Resolved {} key from settings: {}", service, key.is_some());
        key
    }

    pub async fn scrape_url(&self, url: &str) -> Result<ScrapedContent, IngestionError> {
        let options = ScrapeOptions {
            jina_api_key: self.resolve_key(&self.jina_api_key, "jina").await,
        };
        self.scraper.scrape(url, &options).await
    }

    pub async fn process_youtube(&self, url: &str, include_description: bool) -> Result<VideoContent, IngestionError> {
        let options = VideoOptions {
            include_description,
            include_transcript: true,
            youtube_api_key: self.resolve_key(&self.youtube_api_key, "youtube").await,
        };
        self.videos.process_video(url, &options).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ingestion::ContentSource;
    use crate::domain::settings::{ApiKeys, SaveReceipt, Settings, SettingsError};
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct FixedSettings(ApiKeys);

    #[async_trait]
    impl SettingsRepository for FixedSettings {
        async fn load(&self) -> Settings {
            Settings {
                api_keys: self.0.clone(),
                ..Settings::default()
            }
        }

        async fn save(&self, _settings: Settings) -> Result<SaveReceipt, SettingsError> {
            unreachable!("ingestion never saves settings")
        }
    }

    #[derive(Default)]
    struct RecordingScraper {
        seen_key: Mutex<Option<Option<String>>>,
    }

    #[async_trait]
    impl ContentScraper for RecordingScraper {
        async fn scrape(&self, url: &str, options: &ScrapeOptions) -> Result<ScrapedContent, IngestionError> {
            *self.seen_key.lock() = Some(options.jina_api_key.clone());
            Ok(ScrapedContent {
                url: url.to_string(),
                title: "t".to_string(),
                content: "c".to_string(),
                length: 1,
                source: ContentSource::Html,
            })
        }
    }

    #[derive(Default)]
    struct RecordingVideos {
        seen: Mutex<Option<VideoOptions>>,
    }

    #[async_trait]
    impl VideoSource for RecordingVideos {
        async fn process_video(&self, _url: &str, options: &VideoOptions) -> Result<VideoContent, IngestionError> {
            *self.seen.lock() = Some(options.clone());
            Err(IngestionError::Video("stub".to_string()))
        }
    }

    fn settings_keys() -> ApiKeys {
        ApiKeys {
            jina: Some("settings-jina".to_string()),
            youtube: Some("settings-yt".to_string()),
            ..ApiKeys::default()
        }
    }

    #[tokio::test]
    async fn test_configured_key_wins_over_settings() {
        let scraper = Arc::new(RecordingScraper::default());
        let config = IngestionConfig {
            jina_api_key: Some("config-jina".to_string()),
            ..IngestionConfig::default()
        };
        let service = IngestionService::new(
            scraper.clone(),
            Arc::new(RecordingVideos::default()),
            Arc::new(FixedSettings(settings_keys())),
            &config,
        );

        service.scrape_url("https://example.com").await.unwrap();
        assert_eq!(*scraper.seen_key.lock(), Some(Some("config-jina".to_string())));
    }

    #[tokio::test]
    async fn test_settings_key_used_when_unconfigured() {
        let videos = Arc::new(RecordingVideos::default());
        let service = IngestionService::new(
            Arc::new(RecordingScraper::default()),
            videos.clone(),
            Arc::new(FixedSettings(settings_keys())),
            &IngestionConfig::default(),
        );

        let err = service
            .process_youtube("https://youtu.be/abc", false)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestionError::Video(_)));

        let seen = videos.seen.lock().clone().unwrap();
        assert_eq!(seen.youtube_api_key.as_deref(), Some("settings-yt"));
        assert!(!seen.include_description);
        assert!(seen.include_transcript);
    }
}
