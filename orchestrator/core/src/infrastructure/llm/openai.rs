// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// OpenAI LLM Provider Adapter
//
// Anti-Corruption Layer for the OpenAI chat-completions API. The token-limit
// parameter name and whether sampling parameters are sent depend on the
// model, as described by the configured `ModelParameterProfile`.

use crate::domain::config::ModelParameterProfile;
use crate::domain::llm::{
    GenerationOptions, GenerationResult, LLMError, LLMProvider, ModelDescriptor, ProviderKind,
};
use async_trait::async_trait;
use tracing::warn;

use super::catalog::{self, OPENAI_CONTEXT, OPENAI_DEFAULT_CONTEXT, OPENAI_FALLBACK};
use super::chat::{self, ChatCompletionRequest, ChatMessage};
use super::endpoint_url;

pub struct OpenAIAdapter {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    profile: ModelParameterProfile,
}

impl OpenAIAdapter {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        profile: ModelParameterProfile,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            profile,
        }
    }

    /// Chat-completions body for `model` under `profile`
    pub fn build_request<'a>(
        profile: &ModelParameterProfile,
        model: &'a str,
        prompt: &'a str,
        options: &GenerationOptions,
    ) -> ChatCompletionRequest<'a> {
        let (max_tokens, max_completion_tokens) = if profile.uses_max_completion_tokens(model) {
            (None, Some(options.max_tokens))
        } else {
            (Some(options.max_tokens), None)
        };

        let (temperature, top_p) = if profile.restricts_sampling(model) {
            (None, None)
        } else {
            (Some(options.temperature), Some(options.top_p))
        };

        ChatCompletionRequest {
            model,
            messages: vec![ChatMessage::user(prompt)],
            temperature,
            top_p,
            max_tokens,
            max_completion_tokens,
        }
    }

    async fn fetch_models(&self) -> Result<Vec<ModelDescriptor>, LLMError> {
        let url = endpoint_url(&self.endpoint, "models");
        let entries = chat::list_models(self.client.get(&url).bearer_auth(&self.api_key)).await?;
        Ok(entries
            .into_iter()
            .filter(|m| m.id.contains("gpt"))
            .map(|m| {
                let context = catalog::context_length(OPENAI_CONTEXT, &m.id, OPENAI_DEFAULT_CONTEXT);
                ModelDescriptor::new(m.id.clone(), m.id, context)
            })
            .collect())
    }
}

#[async_trait]
impl LLMProvider for OpenAIAdapter {
    fn id(&self) -> &str {
        "openai"
    }

    fn display_name(&self) -> &str {
        "OpenAI"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Hosted
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, LLMError> {
        match self.fetch_models().await {
            Ok(models) => Ok(models),
            Err(e) => {
                warn!("OpenAI model listing failed, serving fallback catalog: {}", e);
                Ok(catalog::descriptors(OPENAI_FALLBACK))
            }
        }
    }

    async fn generate(
        &self,
        prompt: &str,
        model: &str,
        options: &GenerationOptions,
    ) -> Result<GenerationResult, LLMError> {
        let body = Self::build_request(&self.profile, model, prompt, options);
        let url = endpoint_url(&self.endpoint, "chat/completions");
        chat::complete(self.client.post(&url).bearer_auth(&self.api_key), &body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn body(model: &str) -> Value {
        let profile = ModelParameterProfile::default();
        let options = GenerationOptions::default();
        serde_json::to_value(OpenAIAdapter::build_request(&profile, model, "hi", &options)).unwrap()
    }

    #[test]
    fn test_newer_model_uses_max_completion_tokens() {
        let value = body("gpt-4o");
        assert_eq!(value["max_completion_tokens"], 2048);
        assert!(value.get("max_tokens").is_none());
        assert!(value.get("temperature").is_some());
        assert!(value.get("top_p").is_some());
    }

    #[test]
    fn test_restricted_model_omits_sampling() {
        let value = body("gpt-5-nano");
        assert_eq!(value["max_completion_tokens"], 2048);
        assert!(value.get("max_tokens").is_none());
        assert!(value.get("temperature").is_none());
        assert!(value.get("top_p").is_none());
    }

    #[test]
    fn test_legacy_model_uses_max_tokens() {
        let value = body("gpt-3.5-turbo");
        assert_eq!(value["max_tokens"], 2048);
        assert!(value.get("max_completion_tokens").is_none());
        assert!(value.get("temperature").is_some());
        assert!(value.get("top_p").is_some());
    }

    #[test]
    fn test_profile_is_configurable() {
        let profile = ModelParameterProfile {
            max_completion_tokens_models: vec!["o1".to_string()],
            restricted_sampling_models: vec!["o1".to_string()],
        };
        let options = GenerationOptions::default();
        let value = serde_json::to_value(OpenAIAdapter::build_request(&profile, "o1-mini", "hi", &options)).unwrap();
        assert_eq!(value["max_completion_tokens"], 2048);
        assert!(value.get("temperature").is_none());

        let value = serde_json::to_value(OpenAIAdapter::build_request(&profile, "gpt-4o", "hi", &options)).unwrap();
        assert_eq!(value["max_tokens"], 2048);
    }
}
