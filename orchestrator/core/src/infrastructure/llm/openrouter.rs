// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// OpenRouter LLM Provider Adapter
//
// OpenRouter speaks the chat-completions format and routes to many vendors;
// model ids are vendor-prefixed (`anthropic/claude-3.5-sonnet`). Requests
// carry attribution headers identifying this application.

use crate::domain::config::AttributionConfig;
use crate::domain::llm::{
    GenerationOptions, GenerationResult, LLMError, LLMProvider, ModelDescriptor, ProviderKind,
};
use async_trait::async_trait;
use tracing::warn;

use super::catalog::{self, OPENROUTER_DEFAULT_CONTEXT, OPENROUTER_FALLBACK};
use super::chat::{self, ChatCompletionRequest};
use super::endpoint_url;

pub struct OpenRouterAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    attribution: AttributionConfig,
}

impl OpenRouterAdapter {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        attribution: AttributionConfig,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            attribution,
        }
    }

    async fn fetch_models(&self) -> Result<Vec<ModelDescriptor>, LLMError> {
        let url = endpoint_url(&self.endpoint, "models");
        let entries = chat::list_models(self.client.get(&url).bearer_auth(&self.api_key)).await?;
        Ok(entries
            .into_iter()
            .map(|m| {
                let context = m.context_length.unwrap_or(OPENROUTER_DEFAULT_CONTEXT);
                ModelDescriptor::new(m.id.clone(), m.id, context)
            })
            .collect())
    }
}

#[async_trait]
impl LLMProvider for OpenRouterAdapter {
    fn id(&self) -> &str {
        "openrouter"
    }

    fn display_name(&self) -> &str {
        "OpenRouter"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Hosted
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, LLMError> {
        match self.fetch_models().await {
            Ok(models) => Ok(models),
            Err(e) => {
                warn!("OpenRouter model listing failed, serving fallback catalog: {}", e);
                Ok(catalog::descriptors(OPENROUTER_FALLBACK))
            }
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, LLMError> {
        let body = ChatCompletionRequest::standard(model, prompt, options);
        let url = endpoint_url(&self.endpoint, "chat/completions");
        let builder = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .header("HTTP-Referer", &self.attribution.referer)
            .header("X-Title", &self.attribution.title);
        chat::complete(builder, &body).await
    }
}
