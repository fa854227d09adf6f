// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Registry - Provider Lifecycle and Availability
//
// Holds the live set of provider adapters keyed by id. The local adapter is
// always present; hosted adapters exist exactly when a credential is
// configured for them. Every reconfiguration builds a fresh map and swaps it
// in with a single write, so readers always see a complete snapshot.

use crate::domain::config::{
    AttributionConfig, ModelParameterProfile, ProvidersConfig, DEFAULT_ANTHROPIC_ENDPOINT, DEFAULT_GROK_ENDPOINT,
    DEFAULT_OPENAI_ENDPOINT, DEFAULT_OPENROUTER_ENDPOINT,
};
use crate::domain::llm::{LLMProvider, ProviderAvailability, ProviderStatus};
use anyhow::Context;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::anthropic::AnthropicAdapter;
use super::build_http_client;
use super::grok::GrokAdapter;
use super::ollama::OllamaAdapter;
use super::openai::OpenAIAdapter;
use super::openrouter::OpenRouterAdapter;

type ProviderMap = BTreeMap<String, Arc<dyn LLMProvider>>;

/// Hosted providers that are enabled by supplying an API key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostedProviderKind {
    OpenAI,
    Anthropic,
    OpenRouter,
    Grok,
}

impl HostedProviderKind {
    pub const ALL: [HostedProviderKind; 4] = [Self::OpenAI, Self::Anthropic, Self::OpenRouter, Self::Grok];

    pub fn id(self) -> &'static str {
        match self {
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::OpenRouter => "openrouter",
            Self::Grok => "grok",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

/// Constructs adapters on behalf of the registry
pub trait ProviderFactory: Send + Sync {
    /// The always-available local adapter
    fn local(&self) -> Arc<dyn LLMProvider>;

    fn hosted(&self, kind: HostedProviderKind, credential: &str) -> Arc<dyn LLMProvider>;
}

/// Production factory: real HTTP adapters sharing one client
pub struct HttpProviderFactory {
    client: reqwest::Client,
    ollama_endpoint: String,
    openai_endpoint: String,
    anthropic_endpoint: String,
    openrouter_endpoint: String,
    grok_endpoint: String,
    profile: ModelParameterProfile,
    attribution: AttributionConfig,
}

impl HttpProviderFactory {
    pub fn from_config(providers: &ProvidersConfig, profile: &ModelParameterProfile) -> anyhow::Result<Self> {
        let timeout = Duration::from_secs(providers.request_timeout_seconds);
        let client = build_http_client(timeout).context("Failed to build provider HTTP client")?;
        Ok(Self::with_client(client, providers, profile))
    }

    pub fn with_client(client: reqwest::Client, providers: &ProvidersConfig, profile: &ModelParameterProfile) -> Self {
        Self {
            client,
            ollama_endpoint: providers.ollama.endpoint.clone(),
            openai_endpoint: providers.openai.endpoint_or(DEFAULT_OPENAI_ENDPOINT).to_string(),
            anthropic_endpoint: providers.anthropic.endpoint_or(DEFAULT_ANTHROPIC_ENDPOINT).to_string(),
            openrouter_endpoint: providers.openrouter.endpoint_or(DEFAULT_OPENROUTER_ENDPOINT).to_string(),
            grok_endpoint: providers.grok.endpoint_or(DEFAULT_GROK_ENDPOINT).to_string(),
            profile: profile.clone(),
            attribution: providers.attribution.clone(),
        }
    }
}

impl ProviderFactory for HttpProviderFactory {
    fn local(&self) -> Arc<dyn LLMProvider> {
        Arc::new(OllamaAdapter::new(self.client.clone(), self.ollama_endpoint.clone()))
    }

    fn hosted(&self, kind: HostedProviderKind, credential: &str) -> Arc<dyn LLMProvider> {
        let client = self.client.clone();
        match kind {
            HostedProviderKind::OpenAI => Arc::new(OpenAIAdapter::new(
                client,
                self.openai_endpoint.clone(),
                credential,
                self.profile.clone(),
            )),
            HostedProviderKind::Anthropic => {
                Arc::new(AnthropicAdapter::new(client, self.anthropic_endpoint.clone(), credential))
            }
            HostedProviderKind::OpenRouter => Arc::new(OpenRouterAdapter::new(
                client,
                self.openrouter_endpoint.clone(),
                credential,
                self.attribution.clone(),
            )),
            HostedProviderKind::Grok => Arc::new(GrokAdapter::new(client, self.grok_endpoint.clone(), credential)),
        }
    }
}

/// Registry of live provider adapters
pub struct ProviderRegistry {
    factory: Arc<dyn ProviderFactory>,
    local_id: String,
    providers: RwLock<Arc<ProviderMap>>,
}

impl ProviderRegistry {
    /// Registry containing only the local adapter
    pub fn new(factory: Arc<dyn ProviderFactory>) -> Self {
        let local = factory.local();
        let local_id = local.id().to_string();
        info!("Initializing LLM provider registry with local provider '{}'", local_id);

        let mut providers = ProviderMap::new();
        providers.insert(local_id.clone(), local);

        Self {
            factory,
            local_id,
            providers: RwLock::new(Arc::new(providers)),
        }
    }

    /// Registry configured from startup credentials
    pub fn with_credentials(factory: Arc<dyn ProviderFactory>, credentials: &HashMap<String, String>) -> Self {
        let registry = Self::new(factory);
        registry.configure(credentials);
        registry
    }

    fn snapshot(&self) -> Arc<ProviderMap> {
        self.providers.read().clone()
    }

    /// Reconcile hosted adapters with `credentials`.
    ///
    /// A trimmed non-blank credential (re)creates the adapter, a blank or
    /// absent one removes it. Unknown ids are ignored. The local adapter is
    /// always retained.
    pub fn configure(&self, credentials: &HashMap<String, String>) {
        for id in credentials.keys() {
            if HostedProviderKind::from_id(id).is_none() {
                warn!("Ignoring credential for unknown provider '{}'", id);
            }
        }

        let current = self.snapshot();
        let mut next = ProviderMap::new();

        let local = current
            .get(&self.local_id)
            .cloned()
            .unwrap_or_else(|| self.factory.local());
        next.insert(self.local_id.clone(), local);

        for kind in HostedProviderKind::ALL {
            let credential = credentials.get(kind.id()).map(|c| c.trim()).filter(|c| !c.is_empty());
            match credential {
                Some(credential) => {
                    debug!("Configuring provider '{}'", kind.id());
                    next.insert(kind.id().to_string(), self.factory.hosted(kind, credential));
                }
                None => {
                    if current.contains_key(kind.id()) {
                        info!("Removing provider '{}' (no credential)", kind.id());
                    }
                }
            }
        }

        *self.providers.write() = Arc::new(next);
    }

    pub fn get(&self, id: &str) -> Option<Arc<dyn LLMProvider>> {
        self.snapshot().get(id).cloned()
    }

    pub fn provider_ids(&self) -> Vec<String> {
        self.snapshot().keys().cloned().collect()
    }

    /// Status and models of every registered provider, in id order.
    /// A failing adapter is reported as `error`; the listing itself never fails.
    pub async fn list_providers(&self) -> Vec<ProviderStatus> {
        let snapshot = self.snapshot();

        let checks = snapshot.iter().map(|(id, provider)| async move {
            match provider.list_models().await {
                Ok(models) => ProviderStatus {
                    id: id.clone(),
                    name: provider.display_name().to_string(),
                    kind: provider.kind(),
                    status: ProviderAvailability::Available,
                    error: None,
                    models,
                },
                Err(e) => {
                    warn!("Provider '{}' failed to list models: {}", id, e);
                    ProviderStatus {
                        id: id.clone(),
                        name: provider.display_name().to_string(),
                        kind: provider.kind(),
                        status: ProviderAvailability::Error,
                        error: Some(e.to_string()),
                        models: Vec::new(),
                    }
                }
            }
        });

        futures::future::join_all(checks).await
    }

    /// Reconfigure, then report the resulting provider listing
    pub async fn configure_providers(&self, credentials: &HashMap<String, String>) -> Vec<ProviderStatus> {
        self.configure(credentials);
        self.list_providers().await
    }
}
