// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// JSON Settings Repository
//
// Persists the settings document as pretty-printed JSON. Keys supplied by the
// environment take precedence on load and are never written back to disk.

use crate::domain::settings::{ApiKeys, SaveReceipt, Settings, SettingsError, SettingsRepository};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use std::path::PathBuf;
use tracing::{debug, info, warn};

pub struct JsonSettingsRepository {
    path: PathBuf,
    env_keys: ApiKeys,
}

impl JsonSettingsRepository {
    /// `env_keys` are the keys provided by the process environment
    pub fn new(path: impl Into<PathBuf>, env_keys: ApiKeys) -> Self {
        Self {
            path: path.into(),
            env_keys,
        }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    fn defaults(&self) -> Settings {
        Settings {
            api_keys: self.env_keys.clone(),
            ..Settings::default()
        }
    }
}

#[async_trait]
impl SettingsRepository for JsonSettingsRepository {
    async fn load(&self) -> Settings {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("No settings at {:?} ({}), using defaults", self.path, e);
                return self.defaults();
            }
        };

        match serde_json::from_str::<Settings>(&raw) {
            Ok(mut settings) => {
                settings.api_keys.overlay(&self.env_keys);
                settings
            }
            Err(e) => {
                warn!("Settings file {:?} is invalid ({}), using defaults", self.path, e);
                self.defaults()
            }
        }
    }

    async fn save(&self, mut settings: Settings) -> Result<SaveReceipt, SettingsError> {
        settings.api_keys.strip_matching(&self.env_keys);

        let timestamp = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        settings.last_updated = Some(timestamp.clone());
        settings.version = env!("CARGO_PKG_VERSION").to_string();

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let encoded = serde_json::to_string_pretty(&settings)?;
        tokio::fs::write(&self.path, encoded).await?;
        info!("Settings saved to {:?}", self.path);

        Ok(SaveReceipt {
            saved: true,
            path: self.path.display().to_string(),
            timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_keys() -> ApiKeys {
        ApiKeys {
            openai: Some("env-openai".to_string()),
            ..ApiKeys::default()
        }
    }

    #[tokio::test]
    async fn test_missing_file_yields_defaults_with_env_keys() {
        let dir = tempfile::tempdir().unwrap();
        let repo = JsonSettingsRepository::new(dir.path().join("settings.json"), env_keys());

        let settings = repo.load().await;
        assert_eq!(settings.api_keys.openai.as_deref(), Some("env-openai"));
        assert!(settings.preferences.save_results);
        assert!(settings.created.is_some());
    }

    #[tokio::test]
    async fn test_corrupt_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{not json").unwrap();

        let repo = JsonSettingsRepository::new(&path, ApiKeys::default());
        let settings = repo.load().await;
        assert_eq!(settings, Settings { created: settings.created.clone(), ..Settings::default() });
    }

    #[tokio::test]
    async fn test_save_strips_env_keys_and_load_overlays_them() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let repo = JsonSettingsRepository::new(&path, env_keys());

        let mut settings = Settings::default();
        settings.api_keys.openai = Some("env-openai".to_string());
        settings.api_keys.jina = Some("user-jina".to_string());
        settings.preferences.show_advanced = true;

        let receipt = repo.save(settings).await.unwrap();
        assert!(receipt.saved);
        assert_eq!(receipt.path, path.display().to_string());

        let on_disk: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(on_disk["apiKeys"].get("openai").is_none());
        assert_eq!(on_disk["apiKeys"]["jina"], "user-jina");
        assert_eq!(on_disk["lastUpdated"], receipt.timestamp.as_str());

        let loaded = repo.load().await;
        assert_eq!(loaded.api_keys.openai.as_deref(), Some("env-openai"));
        assert_eq!(loaded.api_keys.jina.as_deref(), Some("user-jina"));
        assert!(loaded.preferences.show_advanced);
    }

    #[tokio::test]
    async fn test_save_keeps_user_key_that_differs_from_env() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let repo = JsonSettingsRepository::new(&path, env_keys());

        let mut settings = Settings::default();
        settings.api_keys.openai = Some("user-openai".to_string());
        repo.save(settings).await.unwrap();

        let on_disk: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(on_disk["apiKeys"]["openai"], "user-openai");
    }
}
