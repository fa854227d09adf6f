// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Settings
//!
//! Operator preferences and API keys persisted between runs.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Settings document and persistence contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Hosted providers that accept an API key, in registry order
pub const HOSTED_PROVIDER_IDS: [&str; 4] = ["openai", "anthropic", "openrouter", "grok"];

/// API keys by service. Blank and absent are equivalent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiKeys {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openai: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anthropic: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub openrouter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grok: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jina: Option<String>,
}

impl ApiKeys {
    /// Read keys from the conventional `<SERVICE>_API_KEY` variables
    pub fn from_env() -> Self {
        let read = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());
        Self {
            openai: read("OPENAI_API_KEY"),
            anthropic: read("ANTHROPIC_API_KEY"),
            openrouter: read("OPENROUTER_API_KEY"),
            grok: read("GROK_API_KEY"),
            youtube: read("YOUTUBE_API_KEY"),
            jina: read("JINA_API_KEY"),
        }
    }

    fn slots(&self) -> [(&'static str, &Option<String>); 6] {
        [
            ("openai", &self.openai),
            ("anthropic", &self.anthropic),
            ("openrouter", &self.openrouter),
            ("grok", &self.grok),
            ("youtube", &self.youtube),
            ("jina", &self.jina),
        ]
    }

    fn slots_mut(&mut self) -> [(&'static str, &mut Option<String>); 6] {
        [
            ("openai", &mut self.openai),
            ("anthropic", &mut self.anthropic),
            ("openrouter", &mut self.openrouter),
            ("grok", &mut self.grok),
            ("youtube", &mut self.youtube),
            ("jina", &mut self.jina),
        ]
    }

    /// Non-blank key for `service`
    pub fn get(&self, service: &str) -> Option<&str> {
        self.slots()
            .into_iter()
            .find(|(name, _)| *name == service)
            .and_then(|(_, value)| value.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Keys present in `overlay` replace ours
    pub fn overlay(&mut self, overlay: &ApiKeys) {
        for ((_, target), (_, source)) in self.slots_mut().into_iter().zip(overlay.slots()) {
            if let Some(value) = source.as_ref().filter(|v| !v.trim().is_empty()) {
                *target = Some(value.clone());
            }
        }
    }

    /// Drop keys that are identical to the ones in `other`
    pub fn strip_matching(&mut self, other: &ApiKeys) {
        for ((_, target), (_, source)) in self.slots_mut().into_iter().zip(other.slots()) {
            if source.is_some() && *target == *source {
                *target = None;
            }
        }
    }

    /// Credentials for the hosted model providers, as accepted by the registry
    pub fn provider_credentials(&self) -> HashMap<String, String> {
        HOSTED_PROVIDER_IDS
            .iter()
            .filter_map(|id| self.get(id).map(|key| (id.to_string(), key.to_string())))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default = "default_true")]
    pub save_results: bool,
    #[serde(default)]
    pub show_advanced: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            save_results: true,
            show_advanced: false,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternPreferences {
    pub enabled: Map<String, Value>,
    pub custom: Map<String, Value>,
}

/// Persisted settings document. Unknown top-level keys are carried through.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default)]
    pub api_keys: ApiKeys,

    #[serde(default)]
    pub preferences: Preferences,

    #[serde(default)]
    pub patterns: PatternPreferences,

    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_keys: ApiKeys::default(),
            preferences: Preferences::default(),
            patterns: PatternPreferences::default(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            created: Some(chrono::Utc::now().to_rfc3339()),
            last_updated: None,
            extra: Map::new(),
        }
    }
}

/// Outcome of a successful save
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub saved: bool,
    pub path: String,
    pub timestamp: String,
}

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to save settings: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode settings: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// Current settings with environment-provided keys applied. Never fails
    /// on a missing or unreadable document; defaults are returned instead.
    async fn load(&self) -> Settings;

    async fn save(&self, settings: Settings) -> Result<SaveReceipt, SettingsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(openai: Option<&str>, jina: Option<&str>) -> ApiKeys {
        ApiKeys {
            openai: openai.map(String::from),
            jina: jina.map(String::from),
            ..ApiKeys::default()
        }
    }

    #[test]
    fn test_get_ignores_blank() {
        let keys = keys(Some("  "), Some(" jk "));
        assert_eq!(keys.get("openai"), None);
        assert_eq!(keys.get("jina"), Some("jk"));
        assert_eq!(keys.get("unknown"), None);
    }

    #[test]
    fn test_overlay_and_strip() {
        let mut file = keys(Some("file-openai"), Some("file-jina"));
        let env = keys(Some("env-openai"), None);

        file.overlay(&env);
        assert_eq!(file.openai.as_deref(), Some("env-openai"));
        assert_eq!(file.jina.as_deref(), Some("file-jina"));

        file.strip_matching(&env);
        assert_eq!(file.openai, None);
        assert_eq!(file.jina.as_deref(), Some("file-jina"));
    }

    #[test]
    fn test_provider_credentials_skip_media_keys() {
        let keys = ApiKeys {
            anthropic: Some("a".to_string()),
            youtube: Some("y".to_string()),
            ..ApiKeys::default()
        };
        let credentials = keys.provider_credentials();
        assert_eq!(credentials.len(), 1);
        assert_eq!(credentials["anthropic"], "a");
    }

    #[test]
    fn test_settings_preserve_unknown_keys() {
        let json = r#"{"apiKeys": {"grok": "g"}, "theme": "dark", "preferences": {"showAdvanced": true}}"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.api_keys.grok.as_deref(), Some("g"));
        assert!(settings.preferences.save_results);
        assert!(settings.preferences.show_advanced);
        assert_eq!(settings.extra["theme"], "dark");

        let encoded = serde_json::to_value(&settings).unwrap();
        assert_eq!(encoded["theme"], "dark");
        assert_eq!(encoded["apiKeys"]["grok"], "g");
        assert!(encoded["apiKeys"].get("openai").is_none());
    }
}
