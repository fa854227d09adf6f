// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Grok (xAI) LLM Provider Adapter
//
// xAI serves an OpenAI-compatible chat-completions API.

use crate::domain::llm::{
    GenerationOptions, GenerationResult, LLMError, LLMProvider, ModelDescriptor, ProviderKind,
};
use async_trait::async_trait;
use tracing::warn;

use super::catalog::{self, GROK_CONTEXT, GROK_DEFAULT_CONTEXT, GROK_FALLBACK};
use super::chat::{self, ChatCompletionRequest};
use super::endpoint_url;

pub struct GrokAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GrokAdapter {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        }
    }

    async fn fetch_models(&self) -> Result<Vec<ModelDescriptor>, LLMError> {
        let url = endpoint_url(&self.endpoint, "models");
        let entries = chat::list_models(self.client.get(&url).bearer_auth(&self.api_key)).await?;
        Ok(entries
            .into_iter()
            .map(|m| {
                let context = catalog::context_length(GROK_CONTEXT, &m.id, GROK_DEFAULT_CONTEXT);
                ModelDescriptor::new(m.id.clone(), m.id, context)
            })
            .collect())
    }
}

#[async_trait]
impl LLMProvider for GrokAdapter {
    fn id(&self) -> &str {
        "grok"
    }

    fn display_name(&self) -> &str {
        "Grok"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Hosted
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, LLMError> {
        match self.fetch_models().await {
            Ok(models) => Ok(models),
            Err(e) => {
                warn!("Grok model listing failed, serving fallback catalog: {}", e);
                Ok(catalog::descriptors(GROK_FALLBACK))
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
        chat::complete(self.client.post(&url).bearer_auth(&self.api_key), &body).await
    }
}
