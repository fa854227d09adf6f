// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// LLM Provider Infrastructure - Anti-Corruption Layer Implementations
//
// Each adapter translates between the domain `LLMProvider` interface and one
// vendor API. OpenAI, OpenRouter and Grok share the chat-completions wire
// format in `chat`.

pub mod anthropic;
pub mod catalog;
pub mod chat;
pub mod grok;
pub mod ollama;
pub mod openai;
pub mod openrouter;
pub mod registry;

pub use registry::{HostedProviderKind, HttpProviderFactory, ProviderFactory, ProviderRegistry};

use crate::domain::llm::LLMError;
use reqwest::StatusCode;
use std::time::Duration;

/// Build the HTTP client shared by all adapters. Every request is bounded by
/// `timeout`.
pub fn build_http_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder().timeout(timeout).build()
}

/// Map a non-2xx vendor response to the domain error taxonomy
pub(crate) fn status_error(status: StatusCode, body: String, model: &str) -> LLMError {
    match status.as_u16() {
        401 | 403 => LLMError::Authentication(body),
        429 => LLMError::RateLimit,
        404 => LLMError::ModelNotFound(model.to_string()),
        400 | 422 => LLMError::InvalidInput(body),
        _ => LLMError::Provider(format!("HTTP {}: {}", status, body)),
    }
}

pub(crate) fn transport_error(error: reqwest::Error) -> LLMError {
    if error.is_timeout() {
        LLMError::Network(format!("request timed out: {}", error))
    } else {
        LLMError::Network(error.to_string())
    }
}

/// Send a request and decode a JSON body, mapping every failure to `LLMError`
pub(crate) async fn send_json<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
    model: &str,
) -> Result<T, LLMError> {
    let response = request.send().await.map_err(transport_error)?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(status_error(status, error_text, model));
    }

    response
        .json()
        .await
        .map_err(|e| LLMError::Provider(format!("Failed to parse response: {}", e)))
}

/// Join a base URL and a path without doubling slashes
pub(crate) fn endpoint_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
