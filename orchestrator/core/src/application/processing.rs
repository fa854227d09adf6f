// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Processing Pipeline
//!
//! Validates a [`ProcessRequest`], resolves its pattern and provider, builds
//! the prompt and performs exactly one generation call.
//!
//! # Architecture
//!
//! - **Layer:** Application Layer
//! - **Purpose:** Orchestrates a single pattern run across domain services

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::llm::GenerationResult;
use crate::domain::pattern::{Pattern, PatternError, PatternRepository};
use crate::domain::process::{ProcessError, ProcessMetadata, ProcessRequest, ProcessResult, ProcessSuccess};
use crate::infrastructure::llm::ProviderRegistry;

/// Join pattern content, optional user context and the input with blank lines
pub fn build_prompt(pattern: &Pattern, input: &str) -> String {
    if pattern.user_context.is_empty() {
        format!("{}\n\n{}", pattern.content, input)
    } else {
        format!("{}\n\n{}\n\n{}", pattern.content, pattern.user_context, input)
    }
}

pub struct ProcessingPipeline {
    patterns: Arc<dyn PatternRepository>,
    registry: Arc<ProviderRegistry>,
}

impl ProcessingPipeline {
    pub fn new(patterns: Arc<dyn PatternRepository>, registry: Arc<ProviderRegistry>) -> Self {
        Self { patterns, registry }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    pub fn patterns(&self) -> &Arc<dyn PatternRepository> {
        &self.patterns
    }

    /// Run `request` to completion. Every failure is folded into
    /// [`ProcessResult::Failure`].
    pub async fn process(&self, request: ProcessRequest) -> ProcessResult {
        let metadata = ProcessMetadata::for_request(&request);

        match self.run(&request).await {
            Ok((generation, duration_ms)) => {
                info!(
                    pattern = %request.pattern,
                    provider = %request.provider,
                    model = %request.model,
                    duration_ms,
                    "Processing completed"
                );
                ProcessResult::Success(ProcessSuccess {
                    content: generation.content,
                    usage: generation.usage,
                    duration_ms,
                    metadata,
                })
            }
            Err(e) => {
                warn!(
                    pattern = %request.pattern,
                    provider = %request.provider,
                    model = %request.model,
                    "Processing failed: {}",
                    e
                );
                ProcessResult::failure(&e, metadata)
            }
        }
    }

    async fn run(&self, request: &ProcessRequest) -> Result<(GenerationResult, u64), ProcessError> {
        request.validate()?;

        let pattern = self.patterns.get(&request.pattern).await.map_err(|e| match e {
            PatternError::NotFound(name) => ProcessError::PatternNotFound(name),
            other => {
                warn!("Pattern lookup for '{}' failed: {}", request.pattern, other);
                ProcessError::PatternNotFound(request.pattern.clone())
            }
        })?;

        let provider = self
            .registry
            .get(&request.provider)
            .ok_or_else(|| ProcessError::ProviderNotAvailable(request.provider.clone()))?;

        let prompt = build_prompt(&pattern, &request.input);
        debug!(
            "Generating with {}:{} ({} prompt chars)",
            request.provider,
            request.model,
            prompt.chars().count()
        );

        let started = Instant::now();
        let generation = provider
            .generate(&prompt, &request.model, &request.options)
            .await
            .map_err(|source| ProcessError::Generation {
                provider: provider.display_name().to_string(),
                source,
            })?;
        let duration_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        Ok((generation, duration_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_prompt_without_context() {
        let pattern = Pattern::builtin("summarize", "SYS", "");
        assert_eq!(build_prompt(&pattern, "hello"), "SYS\n\nhello");
    }

    #[test]
    fn test_build_prompt_with_context() {
        let pattern = Pattern::builtin("summarize", "SYS", "CTX");
        assert_eq!(build_prompt(&pattern, "hello"), "SYS\n\nCTX\n\nhello");
    }

    #[test]
    fn test_build_prompt_does_not_truncate() {
        let pattern = Pattern::builtin("summarize", "SYS", "");
        let input = "x".repeat(100_000);
        assert_eq!(build_prompt(&pattern, &input).len(), 100_005);
    }
}
