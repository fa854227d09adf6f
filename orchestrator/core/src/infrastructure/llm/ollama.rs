// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Ollama LLM Provider Adapter
//
// Anti-Corruption Layer for a local Ollama server. Needs no credential and is
// always registered.

use crate::domain::llm::{
    GenerationOptions, GenerationResult, LLMError, LLMProvider, ModelDescriptor, ProviderKind, TokenUsage,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{endpoint_url, send_json};

pub struct OllamaAdapter {
    client: reqwest::Client,
    endpoint: String,
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: OllamaOptions,
}

#[derive(Serialize)]
struct OllamaOptions {
    temperature: f32,
    top_p: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct OllamaResponse {
    #[serde(default)]
    response: String,
    eval_count: Option<u32>,
    prompt_eval_count: Option<u32>,
}

#[derive(Deserialize)]
struct OllamaTags {
    #[serde(default)]
    models: Vec<OllamaModel>,
}

#[derive(Deserialize)]
struct OllamaModel {
    name: String,
}

impl OllamaAdapter {
    pub fn new(client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
        }
    }

    async fn fetch_tags(&self) -> Result<Vec<ModelDescriptor>, LLMError> {
        let url = endpoint_url(&self.endpoint, "api/tags");
        let tags: OllamaTags = send_json(self.client.get(&url), "").await?;
        // Context window is not reported by /api/tags
        Ok(tags
            .models
            .into_iter()
            .map(|m| ModelDescriptor::new(m.name.clone(), m.name, 0))
            .collect())
    }
}

#[async_trait]
impl LLMProvider for OllamaAdapter {
    fn id(&self) -> &str {
        "ollama"
    }

    fn display_name(&self) -> &str {
        "Ollama"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Local
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, LLMError> {
        match self.fetch_tags().await {
            Ok(models) => Ok(models),
            Err(e) => {
                warn!("Ollama models unavailable at {}: {}", self.endpoint, e);
                Ok(Vec::new())
            }
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, LLMError> {
        let request = OllamaRequest {
            model,
            prompt,
            stream: false,
            options: OllamaOptions {
                temperature: options.temperature,
                top_p: options.top_p,
                num_predict: options.max_tokens,
            },
        };

        let url = endpoint_url(&self.endpoint, "api/generate");
        let response: OllamaResponse = send_json(self.client.post(&url).json(&request), model).await?;

        Ok(GenerationResult {
            content: response.response,
            usage: TokenUsage::new(
                response.prompt_eval_count.unwrap_or(0),
                response.eval_count.unwrap_or(0),
            ),
        })
    }
}
