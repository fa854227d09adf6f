// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Chat-completions wire format
//
// Request/response DTOs shared by the OpenAI-compatible adapters (OpenAI,
// OpenRouter, Grok).

use crate::domain::llm::{GenerationOptions, GenerationResult, LLMError, TokenUsage};
use serde::{Deserialize, Serialize};

use super::send_json;

#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
}

impl<'a> ChatCompletionRequest<'a> {
    /// Single user turn with temperature, top_p and max_tokens
    pub fn standard(model: &'a str, prompt: &'a str, options: &GenerationOptions) -> Self {
        Self {
            model,
            messages: vec![ChatMessage::user(prompt)],
            temperature: Some(options.temperature),
            top_p: Some(options.top_p),
            max_tokens: Some(options.max_tokens),
            max_completion_tokens: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

impl<'a> ChatMessage<'a> {
    pub fn user(content: &'a str) -> Self {
        Self { role: "user", content }
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: Option<u32>,
}

/// `GET /models` listing entry
#[derive(Debug, Deserialize)]
pub struct ModelListEntry {
    pub id: String,
    #[serde(default)]
    pub context_length: Option<u32>,
}

#[derive(Deserialize)]
struct ModelList {
    data: Vec<ModelListEntry>,
}

/// POST a chat-completions body and reduce the reply to a `GenerationResult`
pub(crate) async fn complete(
    request: reqwest::RequestBuilder,
    body: &ChatCompletionRequest<'_>,
) -> Result<GenerationResult, LLMError> {
    let response: ChatCompletionResponse = send_json(request.json(body), body.model).await?;

    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LLMError::Provider("No response from model".into()))?;

    let usage = response
        .usage
        .map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens
                .unwrap_or(u.prompt_tokens.saturating_add(u.completion_tokens)),
        })
        .unwrap_or_default();

    Ok(GenerationResult {
        content: choice.message.content.unwrap_or_default(),
        usage,
    })
}

/// GET a `{data: [{id, ...}]}` model listing
pub(crate) async fn list_models(request: reqwest::RequestBuilder) -> Result<Vec<ModelListEntry>, LLMError> {
    let list: ModelList = send_json(request, "").await?;
    Ok(list.data)
}
