// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Process
//!
//! Request, outcome and error taxonomy of a single processing run.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Implements the processing request/result envelope

use chrono::{DateTime, SecondsFormat, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use super::llm::{GenerationOptions, LLMError, TokenUsage};

/// Input to the processing pipeline.
///
/// The four identifiers are required; a missing or `null` one deserializes to
/// an empty string and is rejected during validation rather than at parse time.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessRequest {
    #[serde(default, deserialize_with = "null_as_default")]
    pub pattern: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub input: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub provider: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub model: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub options: GenerationOptions,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

impl ProcessRequest {
    pub fn new(
        pattern: impl Into<String>,
        input: impl Into<String>,
        provider: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            pattern: pattern.into(),
            input: input.into(),
            provider: provider.into(),
            model: model.into(),
            options: GenerationOptions::default(),
        }
    }

    pub fn with_options(mut self, options: GenerationOptions) -> Self {
        self.options = options;
        self
    }

    /// First missing required field, checked in pattern, input, provider, model order
    pub fn validate(&self) -> Result<(), ProcessError> {
        let fields = [
            ("Pattern", &self.pattern),
            ("Input", &self.input),
            ("Provider", &self.provider),
            ("Model", &self.model),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((label, _)) => Err(ProcessError::Validation(format!("{} is required", label))),
            None => Ok(()),
        }
    }
}

/// Echo of the request identifiers attached to every outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessMetadata {
    pub pattern: String,
    pub provider: String,
    pub model: String,
    #[serde(serialize_with = "serialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl ProcessMetadata {
    pub fn for_request(request: &ProcessRequest) -> Self {
        Self {
            pattern: request.pattern.clone(),
            provider: request.provider.clone(),
            model: request.model.clone(),
            timestamp: Utc::now(),
        }
    }
}

fn serialize_timestamp<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSuccess {
    pub content: String,
    pub usage: TokenUsage,
    /// Wall-clock time of the generation call only
    pub duration_ms: u64,
    pub metadata: ProcessMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessFailure {
    pub error: String,
    pub metadata: ProcessMetadata,
}

/// Outcome of a processing run. Exactly one variant, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessResult {
    Success(ProcessSuccess),
    Failure(ProcessFailure),
}

impl ProcessResult {
    pub fn failure(error: &ProcessError, metadata: ProcessMetadata) -> Self {
        Self::Failure(ProcessFailure {
            error: error.to_string(),
            metadata,
        })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    pub fn metadata(&self) -> &ProcessMetadata {
        match self {
            Self::Success(success) => &success.metadata,
            Self::Failure(failure) => &failure.metadata,
        }
    }
}

// Flat wire shape keyed by a `success` flag
impl Serialize for ProcessResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Success(success) => {
                let mut map = serializer.serialize_map(Some(5))?;
                map.serialize_entry("success", &true)?;
                map.serialize_entry("content", &success.content)?;
                map.serialize_entry("usage", &success.usage)?;
                map.serialize_entry("duration", &success.duration_ms)?;
                map.serialize_entry("metadata", &success.metadata)?;
                map.end()
            }
            Self::Failure(failure) => {
                let mut map = serializer.serialize_map(Some(3))?;
                map.serialize_entry("success", &false)?;
                map.serialize_entry("error", &failure.error)?;
                map.serialize_entry("metadata", &failure.metadata)?;
                map.end()
            }
        }
    }
}

/// Reasons a processing run fails. Rendered into `ProcessFailure::error`.
#[derive(Debug, Error)]
pub enum ProcessError {
    #[error("{0}")]
    Validation(String),

    #[error("Pattern '{0}' not found")]
    PatternNotFound(String),

    #[error("Provider '{0}' not available")]
    ProviderNotAvailable(String),

    #[error("{provider} generation failed: {source}")]
    Generation {
        provider: String,
        #[source]
        source: LLMError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_order() {
        let request = ProcessRequest::new("", "", "", "");
        assert_eq!(request.validate().unwrap_err().to_string(), "Pattern is required");

        let request = ProcessRequest::new("summarize", "  ", "", "");
        assert_eq!(request.validate().unwrap_err().to_string(), "Input is required");

        let request = ProcessRequest::new("summarize", "text", "ollama", "");
        assert_eq!(request.validate().unwrap_err().to_string(), "Model is required");

        let request = ProcessRequest::new("summarize", "text", "ollama", "llama3");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_deserialize_empty() {
        let request: ProcessRequest = serde_json::from_str(r#"{"pattern": "summarize"}"#).unwrap();
        assert_eq!(request.pattern, "summarize");
        assert!(request.input.is_empty());
        assert_eq!(request.options, GenerationOptions::default());
    }

    #[test]
    fn test_null_fields_deserialize_empty() {
        let request: ProcessRequest = serde_json::from_str(
            r#"{"pattern": null, "input": "text", "provider": null, "model": "m", "options": null}"#,
        )
        .unwrap();
        assert!(request.pattern.is_empty());
        assert!(request.provider.is_empty());
        assert_eq!(request.options, GenerationOptions::default());
        assert_eq!(request.validate().unwrap_err().to_string(), "Pattern is required");
    }

    #[test]
    fn test_result_wire_shape() {
        let metadata = ProcessMetadata::for_request(&ProcessRequest::new("p", "i", "ollama", "m"));

        let success = ProcessResult::Success(ProcessSuccess {
            content: "out".to_string(),
            usage: TokenUsage::new(1, 2),
            duration_ms: 15,
            metadata: metadata.clone(),
        });
        let json = serde_json::to_value(&success).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["duration"], 15);
        assert_eq!(json["usage"]["total_tokens"], 3);
        assert_eq!(json["metadata"]["provider"], "ollama");
        assert!(json.get("error").is_none());

        let failure = ProcessResult::failure(
            &ProcessError::ProviderNotAvailable("grok".to_string()),
            metadata,
        );
        let json = serde_json::to_value(&failure).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "Provider 'grok' not available");
        assert!(json.get("content").is_none());
        assert!(json["metadata"]["timestamp"].as_str().unwrap().ends_with('Z'));
    }

    #[test]
    fn test_generation_error_message() {
        let error = ProcessError::Generation {
            provider: "OpenAI".to_string(),
            source: LLMError::RateLimit,
        };
        assert_eq!(error.to_string(), "OpenAI generation failed: Rate limit exceeded");
    }
}
