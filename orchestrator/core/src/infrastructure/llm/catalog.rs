// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Static model catalogs
//
// Fallback model tables served when a vendor's listing endpoint is
// unreachable, and per-vendor context-length tables for listings that do not
// report one.

use crate::domain::llm::ModelDescriptor;

#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub name: &'static str,
    pub context_length: u32,
}

const fn entry(id: &'static str, name: &'static str, context_length: u32) -> CatalogEntry {
    CatalogEntry {
        id,
        name,
        context_length,
    }
}

pub const OPENAI_FALLBACK: &[CatalogEntry] = &[
    entry("gpt-4o", "GPT-4o", 128_000),
    entry("gpt-4o-mini", "GPT-4o Mini", 128_000),
    entry("gpt-3.5-turbo", "GPT-3.5 Turbo", 16_384),
];

pub const OPENAI_CONTEXT: &[(&str, u32)] = &[
    ("gpt-4o", 128_000),
    ("gpt-4o-mini", 128_000),
    ("gpt-4-turbo", 128_000),
    ("gpt-4", 8_192),
    ("gpt-3.5-turbo", 16_384),
];

pub const OPENAI_DEFAULT_CONTEXT: u32 = 4_096;

/// Anthropic has no listing endpoint; this table is always served
pub const ANTHROPIC_MODELS: &[CatalogEntry] = &[
    entry("claude-3-5-sonnet-20241022", "Claude 3.5 Sonnet", 200_000),
    entry("claude-3-haiku-20240307", "Claude 3 Haiku", 200_000),
    entry("claude-3-opus-20240229", "Claude 3 Opus", 200_000),
];

pub const OPENROUTER_FALLBACK: &[CatalogEntry] = &[
    entry("anthropic/claude-3.5-sonnet", "Claude 3.5 Sonnet", 200_000),
    entry("openai/gpt-4o", "GPT-4o", 128_000),
    entry("meta-llama/llama-3.1-8b-instruct", "Llama 3.1 8B", 131_072),
];

pub const OPENROUTER_DEFAULT_CONTEXT: u32 = 4_096;

pub const GROK_FALLBACK: &[CatalogEntry] = &[
    entry("grok-beta", "Grok Beta", 131_072),
    entry("grok-vision-beta", "Grok Vision Beta", 8_192),
];

pub const GROK_CONTEXT: &[(&str, u32)] = &[("grok-beta", 131_072), ("grok-vision-beta", 8_192)];

pub const GROK_DEFAULT_CONTEXT: u32 = 8_192;

pub fn descriptors(entries: &[CatalogEntry]) -> Vec<ModelDescriptor> {
    entries
        .iter()
        .map(|e| ModelDescriptor::new(e.id, e.name, e.context_length))
        .collect()
}

/// Exact-id lookup in a context table
pub fn context_length(table: &[(&str, u32)], model_id: &str, default: u32) -> u32 {
    table
        .iter()
        .find(|(id, _)| *id == model_id)
        .map(|(_, length)| *length)
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_length_lookup() {
        assert_eq!(context_length(OPENAI_CONTEXT, "gpt-4", OPENAI_DEFAULT_CONTEXT), 8_192);
        assert_eq!(context_length(OPENAI_CONTEXT, "gpt-4-0613", OPENAI_DEFAULT_CONTEXT), 4_096);
        assert_eq!(context_length(GROK_CONTEXT, "grok-2", GROK_DEFAULT_CONTEXT), 8_192);
    }

    #[test]
    fn test_descriptors() {
        let models = descriptors(ANTHROPIC_MODELS);
        assert_eq!(models.len(), 3);
        assert_eq!(models[0].id, "claude-3-5-sonnet-20241022");
        assert_eq!(models[0].display_name, "Claude 3.5 Sonnet");
        assert!(models.iter().all(|m| m.context_length == 200_000));
    }
}
