// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Stub providers and factories shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use unravel_core::domain::llm::{
    GenerationOptions, GenerationResult, LLMError, LLMProvider, ModelDescriptor, ProviderKind, TokenUsage,
};
use unravel_core::infrastructure::llm::{HostedProviderKind, ProviderFactory};

/// Provider that answers with a canned reply (or fails) and records its calls
pub struct StubProvider {
    id: String,
    name: String,
    kind: ProviderKind,
    reply: Result<String, String>,
    fail_listing: bool,
    pub credential: Option<String>,
    pub calls: AtomicUsize,
    pub prompts: Mutex<Vec<String>>,
}

impl StubProvider {
    pub fn replying(id: &str, reply: &str) -> Self {
        Self {
            id: id.to_string(),
            name: format!("Stub {}", id),
            kind: ProviderKind::Local,
            reply: Ok(reply.to_string()),
            fail_listing: false,
            credential: None,
            calls: AtomicUsize::new(0),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(id: &str, message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            fail_listing: true,
            ..Self::replying(id, "")
        }
    }

    pub fn hosted(mut self, credential: &str) -> Self {
        self.kind = ProviderKind::Hosted;
        self.credential = Some(credential.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LLMProvider for StubProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> ProviderKind {
        self.kind
    }

    async fn list_models(&self) -> Result<Vec<ModelDescriptor>, LLMError> {
        if self.fail_listing {
            return Err(LLMError::Network(format!("{} unreachable", self.id)));
        }
        Ok(vec![ModelDescriptor::new("stub-model", "Stub Model", 1024)])
    }

    async fn generate(
        &self,
        prompt: &str,
        _model: &str,
        _options: &GenerationOptions,
    ) -> Result<GenerationResult, LLMError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().push(prompt.to_string());
        match &self.reply {
            Ok(content) => Ok(GenerationResult {
                content: content.clone(),
                usage: TokenUsage::default(),
            }),
            Err(message) => Err(LLMError::Provider(message.clone())),
        }
    }
}

/// Factory handing out stub adapters. Hosted adapters fail when `failing_hosted` is set.
pub struct StubFactory {
    pub local: Arc<StubProvider>,
    pub failing_hosted: bool,
    pub hosted_built: AtomicUsize,
}

impl StubFactory {
    pub fn new(local: StubProvider) -> Self {
        Self {
            local: Arc::new(local),
            failing_hosted: false,
            hosted_built: AtomicUsize::new(0),
        }
    }

    pub fn with_failing_hosted(mut self) -> Self {
        self.failing_hosted = true;
        self
    }
}

impl ProviderFactory for StubFactory {
    fn local(&self) -> Arc<dyn LLMProvider> {
        self.local.clone()
    }

    fn hosted(&self, kind: HostedProviderKind, credential: &str) -> Arc<dyn LLMProvider> {
        self.hosted_built.fetch_add(1, Ordering::SeqCst);
        let stub = if self.failing_hosted {
            StubProvider::failing(kind.id(), "boom")
        } else {
            StubProvider::replying(kind.id(), "hosted reply")
        };
        Arc::new(stub.hosted(credential))
    }
}
