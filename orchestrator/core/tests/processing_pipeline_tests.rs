// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Integration tests for the processing pipeline: validation ordering, lookup
//! failures, prompt assembly and the result envelope.

mod common;

use common::{StubFactory, StubProvider};
use std::sync::Arc;
use unravel_core::application::ProcessingPipeline;
use unravel_core::domain::llm::{GenerationOptions, TokenUsage};
use unravel_core::domain::pattern::Pattern;
use unravel_core::domain::process::{ProcessRequest, ProcessResult};
use unravel_core::infrastructure::llm::ProviderRegistry;
use unravel_core::infrastructure::InMemoryPatternRepository;

fn pipeline_with(local: StubProvider) -> (ProcessingPipeline, Arc<StubProvider>) {
    let factory = StubFactory::new(local);
    let local = factory.local.clone();
    let registry = Arc::new(ProviderRegistry::new(Arc::new(factory)));
    let patterns = Arc::new(InMemoryPatternRepository::new([
        Pattern::builtin("summarize", "SYS", ""),
        Pattern::builtin("extract_wisdom", "EXTRACT", "CTX"),
    ]));
    (ProcessingPipeline::new(patterns, registry), local)
}

fn failure_message(result: &ProcessResult) -> &str {
    match result {
        ProcessResult::Failure(failure) => &failure.error,
        ProcessResult::Success(success) => panic!("expected failure, got {:?}", success),
    }
}

#[tokio::test]
async fn test_missing_fields_fail_without_calling_provider() {
    let (pipeline, local) = pipeline_with(StubProvider::replying("local", "ok"));

    let cases = [
        (ProcessRequest::new("", "hello", "local", "m"), "Pattern is required"),
        (ProcessRequest::new("summarize", "", "local", "m"), "Input is required"),
        (ProcessRequest::new("summarize", "hello", " ", "m"), "Provider is required"),
        (ProcessRequest::new("summarize", "hello", "local", ""), "Model is required"),
    ];

    for (request, expected) in cases {
        let result = pipeline.process(request).await;
        assert_eq!(failure_message(&result), expected);
    }
    assert_eq!(local.call_count(), 0);
}

#[tokio::test]
async fn test_unknown_pattern_fails() {
    let (pipeline, local) = pipeline_with(StubProvider::replying("local", "ok"));

    let result = pipeline.process(ProcessRequest::new("nope", "hello", "local", "m")).await;
    assert_eq!(failure_message(&result), "Pattern 'nope' not found");
    assert_eq!(local.call_count(), 0);
}

#[tokio::test]
async fn test_unregistered_provider_fails() {
    let (pipeline, local) = pipeline_with(StubProvider::replying("local", "ok"));

    let result = pipeline.process(ProcessRequest::new("summarize", "hello", "openai", "gpt-4o")).await;
    let message = failure_message(&result);
    assert!(message.contains("not available"), "{}", message);
    assert!(message.contains("openai"));
    assert_eq!(local.call_count(), 0);
}

#[tokio::test]
async fn test_summarize_with_local_stub() {
    let (pipeline, local) = pipeline_with(StubProvider::replying("local", "A short summary."));

    let request = ProcessRequest::new("summarize", "hello", "local", "llama3.2").with_options(GenerationOptions {
        temperature: 0.0,
        ..GenerationOptions::default()
    });
    let result = pipeline.process(request).await;

    let ProcessResult::Success(success) = result else {
        panic!("expected success");
    };
    assert_eq!(success.content, "A short summary.");
    assert_eq!(success.usage, TokenUsage::default());
    assert_eq!(success.metadata.pattern, "summarize");
    assert_eq!(success.metadata.provider, "local");
    assert_eq!(success.metadata.model, "llama3.2");

    assert_eq!(local.call_count(), 1);
    assert_eq!(local.prompts.lock().as_slice(), ["SYS\n\nhello".to_string()]);
}

#[tokio::test]
async fn test_summarize_fox_sentence() {
    let factory = StubFactory::new(StubProvider::replying("local", "A fox runs."));
    let local = factory.local.clone();
    let registry = Arc::new(ProviderRegistry::new(Arc::new(factory)));
    let patterns = Arc::new(InMemoryPatternRepository::new([Pattern::builtin(
        "summarize",
        "Summarize the following:",
        "",
    )]));
    let pipeline = ProcessingPipeline::new(patterns, registry);

    let request = ProcessRequest::new("summarize", "The quick brown fox.", "local", "llama3.2");
    let result = pipeline.process(request).await;

    let ProcessResult::Success(success) = result else {
        panic!("expected success");
    };
    assert_eq!(success.content, "A fox runs.");
    assert_eq!(success.usage, TokenUsage::default());
    assert_eq!(
        local.prompts.lock().as_slice(),
        ["Summarize the following:\n\nThe quick brown fox.".to_string()]
    );
    assert_eq!(local.call_count(), 1);
}

#[tokio::test]
async fn test_user_context_is_included_in_prompt() {
    let (pipeline, local) = pipeline_with(StubProvider::replying("local", "ok"));

    let result = pipeline.process(ProcessRequest::new("extract_wisdom", "input", "local", "m")).await;
    assert!(result.is_success());
    assert_eq!(local.prompts.lock()[0], "EXTRACT\n\nCTX\n\ninput");
}

#[tokio::test]
async fn test_generation_failure_names_provider() {
    let (pipeline, local) = pipeline_with(StubProvider::failing("local", "model exploded"));

    let result = pipeline.process(ProcessRequest::new("summarize", "hello", "local", "m")).await;
    assert_eq!(
        failure_message(&result),
        "Stub local generation failed: Provider error: model exploded"
    );
    assert_eq!(local.call_count(), 1);
    assert_eq!(result.metadata().provider, "local");
}

#[tokio::test]
async fn test_result_wire_shape() {
    let (pipeline, _) = pipeline_with(StubProvider::replying("local", "done"));

    let success = pipeline.process(ProcessRequest::new("summarize", "hi", "local", "m")).await;
    let json = serde_json::to_value(&success).unwrap();
    assert_eq!(json["success"], true);
    assert_eq!(json["content"], "done");
    assert_eq!(json["usage"]["total_tokens"], 0);
    assert!(json["duration"].is_u64());
    assert!(json["metadata"]["timestamp"].as_str().unwrap().ends_with('Z'));
    assert!(json.get("error").is_none());

    let failure = pipeline.process(ProcessRequest::new("summarize", "", "local", "m")).await;
    let json = serde_json::to_value(&failure).unwrap();
    assert_eq!(json["success"], false);
    assert_eq!(json["error"], "Input is required");
    assert!(json.get("content").is_none());
}
