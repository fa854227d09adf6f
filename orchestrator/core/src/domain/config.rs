// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Unravel Configuration Types
//
// Defines the configuration schema for an Unravel instance, including:
// - Kubernetes-style manifest format (apiVersion/kind/metadata/spec)
// - Server binding and static frontend
// - Provider endpoints and credentials
// - Model parameter profile for chat-completions request shaping
// - Pattern/settings storage locations
// - Ingestion and observability settings

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const API_VERSION: &str = "unravel/v1";
pub const KIND: &str = "UnravelConfig";

pub const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";
pub const DEFAULT_ANTHROPIC_ENDPOINT: &str = "https://api.anthropic.com/v1";
pub const DEFAULT_OPENROUTER_ENDPOINT: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_GROK_ENDPOINT: &str = "https://api.x.ai/v1";

/// Top-level Kubernetes-style configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnravelConfigManifest {
    /// API version (must be "unravel/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "UnravelConfig")
    pub kind: String,

    pub metadata: ManifestMetadata,

    #[serde(default)]
    pub spec: UnravelConfigSpec,
}

/// Manifest metadata (Kubernetes-style)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

/// Manifest body (content under `spec:`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnravelConfigSpec {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub providers: ProvidersConfig,

    #[serde(default)]
    pub model_parameters: ModelParameterProfile,

    #[serde(default)]
    pub patterns: PatternsConfig,

    #[serde(default)]
    pub settings: SettingsConfig,

    #[serde(default)]
    pub ingestion: IngestionConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Network bind address (e.g. "0.0.0.0" or "127.0.0.1")
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Directory with the web frontend, served for unmatched routes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,

    /// Upload limit for file processing, in megabytes
    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            static_dir: None,
            max_upload_mb: default_max_upload_mb(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub ollama: LocalProviderConfig,

    #[serde(default)]
    pub openai: HostedProviderConfig,

    #[serde(default)]
    pub anthropic: HostedProviderConfig,

    #[serde(default)]
    pub openrouter: HostedProviderConfig,

    #[serde(default)]
    pub grok: HostedProviderConfig,

    /// Per-request timeout applied by every adapter's HTTP client
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    /// Attribution headers sent to OpenRouter
    #[serde(default)]
    pub attribution: AttributionConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            ollama: LocalProviderConfig::default(),
            openai: HostedProviderConfig::default(),
            anthropic: HostedProviderConfig::default(),
            openrouter: HostedProviderConfig::default(),
            grok: HostedProviderConfig::default(),
            request_timeout_seconds: default_request_timeout(),
            attribution: AttributionConfig::default(),
        }
    }
}

impl ProvidersConfig {
    /// Hosted provider sections keyed by registry id
    pub fn hosted(&self) -> [(&'static str, &HostedProviderConfig); 4] {
        [
            ("openai", &self.openai),
            ("anthropic", &self.anthropic),
            ("openrouter", &self.openrouter),
            ("grok", &self.grok),
        ]
    }

    /// Resolved credentials for every hosted provider that has one
    pub fn credentials(&self) -> HashMap<String, String> {
        self.hosted()
            .into_iter()
            .filter_map(|(id, config)| config.resolved_api_key().map(|key| (id.to_string(), key)))
            .collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalProviderConfig {
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,
}

impl Default for LocalProviderConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ollama_endpoint(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HostedProviderConfig {
    /// API base URL, the vendor default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    /// API key (supports "env:VAR_NAME" for environment variables)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl HostedProviderConfig {
    pub fn endpoint_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.endpoint.as_deref().unwrap_or(default)
    }

    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key.as_deref().and_then(resolve_secret)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributionConfig {
    #[serde(default = "default_referer")]
    pub referer: String,

    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for AttributionConfig {
    fn default() -> Self {
        Self {
            referer: default_referer(),
            title: default_title(),
        }
    }
}

/// Request-shaping rules for OpenAI chat models. Entries match by substring
/// of the model id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelParameterProfile {
    /// Models that take `max_completion_tokens` instead of `max_tokens`
    #[serde(default = "default_max_completion_tokens_models")]
    pub max_completion_tokens_models: Vec<String>,

    /// Models that reject `temperature` and `top_p`
    #[serde(default = "default_restricted_sampling_models")]
    pub restricted_sampling_models: Vec<String>,
}

impl Default for ModelParameterProfile {
    fn default() -> Self {
        Self {
            max_completion_tokens_models: default_max_completion_tokens_models(),
            restricted_sampling_models: default_restricted_sampling_models(),
        }
    }
}

impl ModelParameterProfile {
    pub fn uses_max_completion_tokens(&self, model: &str) -> bool {
        self.max_completion_tokens_models.iter().any(|m| model.contains(m.as_str()))
    }

    pub fn restricts_sampling(&self, model: &str) -> bool {
        self.restricted_sampling_models.iter().any(|m| model.contains(m.as_str()))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternsConfig {
    /// Built-in pattern library (one directory per pattern)
    #[serde(default = "default_builtin_dir")]
    pub builtin_dir: String,

    /// Operator-created patterns
    #[serde(default = "default_custom_dir")]
    pub custom_dir: String,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            builtin_dir: default_builtin_dir(),
            custom_dir: default_custom_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettingsConfig {
    #[serde(default = "default_settings_path")]
    pub path: String,
}

impl Default for SettingsConfig {
    fn default() -> Self {
        Self {
            path: default_settings_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestionConfig {
    /// Jina reader key (supports "env:VAR_NAME")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jina_api_key: Option<String>,

    /// YouTube Data API v3 key (supports "env:VAR_NAME")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub youtube_api_key: Option<String>,

    /// yt-dlp executable, looked up on PATH when not absolute
    #[serde(default = "default_ytdlp_path")]
    pub ytdlp_path: String,

    #[serde(default = "default_scrape_timeout")]
    pub scrape_timeout_seconds: u64,

    #[serde(default = "default_jina_timeout")]
    pub jina_timeout_seconds: u64,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            jina_api_key: None,
            youtube_api_key: None,
            ytdlp_path: default_ytdlp_path(),
            scrape_timeout_seconds: default_scrape_timeout(),
            jina_timeout_seconds: default_jina_timeout(),
        }
    }
}

impl IngestionConfig {
    pub fn resolved_jina_api_key(&self) -> Option<String> {
        self.jina_api_key.as_deref().and_then(resolve_secret)
    }

    pub fn resolved_youtube_api_key(&self) -> Option<String> {
        self.youtube_api_key.as_deref().and_then(resolve_secret)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (e.g., "info", "debug", "trace")
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format ("json" or "text")
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

/// Resolve a secret value, following `env:VAR_NAME` indirection.
/// Blank values and unset variables resolve to `None`.
pub fn resolve_secret(value: &str) -> Option<String> {
    let resolved = match value.strip_prefix("env:") {
        Some(var_name) => match std::env::var(var_name) {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!("Environment variable {} referenced in config is not set", var_name);
                return None;
            }
        },
        None => value.to_string(),
    };
    let trimmed = resolved.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

// Default value functions
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3006
}

fn default_max_upload_mb() -> u64 {
    50
}

fn default_ollama_endpoint() -> String {
    DEFAULT_OLLAMA_ENDPOINT.to_string()
}

fn default_request_timeout() -> u64 {
    300
}

fn default_referer() -> String {
    "https://github.com/100monkeys-ai/unravel".to_string()
}

fn default_title() -> String {
    "Unravel".to_string()
}

fn default_max_completion_tokens_models() -> Vec<String> {
    ["gpt-4o", "gpt-4o-mini", "gpt-5-nano", "gpt-5-mini", "gpt-5"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_restricted_sampling_models() -> Vec<String> {
    vec!["gpt-5-nano".to_string()]
}

fn default_builtin_dir() -> String {
    "./patterns".to_string()
}

fn default_custom_dir() -> String {
    "./config/custom_patterns".to_string()
}

fn default_settings_path() -> String {
    "./config/settings.json".to_string()
}

fn default_ytdlp_path() -> String {
    "yt-dlp".to_string()
}

fn default_scrape_timeout() -> u64 {
    10
}

fn default_jina_timeout() -> u64 {
    15
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for UnravelConfigManifest {
    fn default() -> Self {
        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ManifestMetadata {
                name: "unravel".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
                labels: None,
            },
            spec: UnravelConfigSpec::default(),
        }
    }
}

impl UnravelConfigManifest {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. UNRAVEL_CONFIG_PATH environment variable
    /// 2. ./unravel-config.yaml (working directory)
    /// 3. ~/.unravel/config.yaml (user home)
    /// 4. /etc/unravel/config.yaml (system, Unix) or C:\ProgramData\Unravel\config.yaml (Windows)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("UNRAVEL_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./unravel-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".unravel").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        #[cfg(unix)]
        let system_config = PathBuf::from("/etc/unravel/config.yaml");
        #[cfg(windows)]
        let system_config = PathBuf::from("C:\\ProgramData\\Unravel\\config.yaml");

        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit CLI path fails hard when missing or invalid
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from an arbitrary variable source. Blank values are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(endpoint) = lookup("OLLAMA_BASE_URL") {
            tracing::info!("Environment override: OLLAMA_BASE_URL={}", endpoint);
            self.spec.providers.ollama.endpoint = endpoint;
        }

        let providers = &mut self.spec.providers;
        for (var, section) in [
            ("OPENAI_API_KEY", &mut providers.openai),
            ("ANTHROPIC_API_KEY", &mut providers.anthropic),
            ("OPENROUTER_API_KEY", &mut providers.openrouter),
            ("GROK_API_KEY", &mut providers.grok),
        ] {
            if let Some(key) = lookup(var) {
                tracing::debug!("Environment override: {} is set", var);
                section.api_key = Some(key);
            }
        }

        if let Some(key) = lookup("YOUTUBE_API_KEY") {
            self.spec.ingestion.youtube_api_key = Some(key);
        }
        if let Some(key) = lookup("JINA_API_KEY") {
            self.spec.ingestion.jina_api_key = Some(key);
        }
        if let Some(path) = lookup("UNRAVEL_YTDLP_PATH") {
            self.spec.ingestion.ytdlp_path = path;
        }

        if let Some(val) = lookup("PORT") {
            match val.trim().parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: PORT={}", port);
                    self.spec.server.port = port;
                }
                Err(_) => {
                    tracing::warn!("Invalid value for PORT: '{}'. Expected a port number. Ignoring.", val);
                }
            }
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_version != API_VERSION {
            anyhow::bail!("Invalid apiVersion: '{}'. Must be '{}'", self.api_version, API_VERSION);
        }

        if self.kind != KIND {
            anyhow::bail!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND);
        }

        if self.metadata.name.is_empty() {
            anyhow::bail!("metadata.name cannot be empty");
        }

        if self.spec.server.port == 0 {
            anyhow::bail!("spec.server.port cannot be 0");
        }

        if self.spec.providers.ollama.endpoint.trim().is_empty() {
            anyhow::bail!("spec.providers.ollama.endpoint cannot be empty");
        }

        for (id, provider) in self.spec.providers.hosted() {
            if provider.endpoint.as_deref().is_some_and(|e| e.trim().is_empty()) {
                anyhow::bail!("spec.providers.{}.endpoint cannot be empty when set", id);
            }
        }

        if self.spec.providers.request_timeout_seconds == 0 {
            anyhow::bail!("spec.providers.request_timeout_seconds must be greater than 0");
        }

        if self.spec.patterns.builtin_dir.trim().is_empty() {
            anyhow::bail!("spec.patterns.builtin_dir cannot be empty");
        }

        if self.spec.patterns.custom_dir.trim().is_empty() {
            anyhow::bail!("spec.patterns.custom_dir cannot be empty");
        }

        if self.spec.settings.path.trim().is_empty() {
            anyhow::bail!("spec.settings.path cannot be empty");
        }

        match self.spec.observability.logging.format.as_str() {
            "text" | "json" => {}
            other => anyhow::bail!("Invalid logging format: '{}'. Must be 'text' or 'json'", other),
        }

        Ok(())
    }
}
