// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Pattern
//!
//! A pattern is a named system-prompt template with optional auxiliary
//! context that is applied to user input before generation.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Pattern aggregate, naming rules and repository contract

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Category assigned to built-in patterns whose name ends with `_enhanced`
pub const ENHANCED_CATEGORY: &str = "Enhanced";

/// Category assigned when no keyword matches
pub const FALLBACK_CATEGORY: &str = "Other";

/// Category assigned to custom patterns without metadata
pub const CUSTOM_CATEGORY: &str = "custom";

const DESCRIPTION_LIMIT: usize = 100;

/// Keyword table used to categorize built-in patterns by name
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("Analysis", &["analyze", "extract", "review", "rate", "compare", "check"]),
    ("Writing", &["summarize", "improve", "write", "create_essay", "tweet", "formal"]),
    ("Media", &["youtube", "video", "transcript", "image"]),
    ("Research", &["wisdom", "paper", "research", "find", "identify"]),
    ("Technical", &["code", "coding", "debug", "explain_tech", "security", "threat"]),
    ("Creative", &["create", "generate", "design", "story", "art", "logo"]),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pattern {
    /// Unique key (directory name)
    pub name: String,

    pub display_name: String,

    /// System prompt template
    pub content: String,

    /// Auxiliary context appended after the template, may be empty
    #[serde(default)]
    pub user_context: String,

    pub category: String,

    pub description: String,

    #[serde(default)]
    pub custom: bool,
}

impl Pattern {
    /// Build a built-in pattern, deriving display name, category and description
    pub fn builtin(name: impl Into<String>, content: impl Into<String>, user_context: impl Into<String>) -> Self {
        let name = name.into();
        let content = content.into();
        Self {
            display_name: display_name(&name),
            category: categorize(&name).to_string(),
            description: extract_description(&content),
            name,
            content,
            user_context: user_context.into(),
            custom: false,
        }
    }

    pub fn summary(&self) -> PatternSummary {
        PatternSummary {
            id: self.name.clone(),
            name: self.display_name.clone(),
            description: self.description.clone(),
        }
    }
}

/// Listing entry for the pattern picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSummary {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// Request to create or update a custom pattern
#[derive(Debug, Clone, Deserialize)]
pub struct CustomPatternDraft {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub content: String,
}

/// Persisted sidecar for custom patterns (`metadata.json`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPatternMetadata {
    pub name: String,
    pub category: String,
    pub description: String,
    pub created: String,
    pub updated: String,
    pub custom: bool,
}

#[derive(Debug, Error)]
pub enum PatternError {
    #[error("Pattern '{0}' not found")]
    NotFound(String),

    #[error("Invalid pattern name '{0}': use letters, digits, '_' or '-'")]
    InvalidName(String),

    #[error("Pattern content cannot be empty")]
    EmptyContent,

    #[error("Pattern storage error: {0}")]
    Storage(String),
}

/// Read/write contract for the pattern store.
/// Lookups are read-only from the pipeline's perspective.
#[async_trait]
pub trait PatternRepository: Send + Sync {
    async fn get(&self, name: &str) -> Result<Pattern, PatternError>;

    async fn list(&self) -> Vec<Pattern>;

    async fn count(&self) -> usize;

    async fn save_custom(&self, draft: CustomPatternDraft) -> Result<CustomPatternMetadata, PatternError>;

    async fn delete_custom(&self, name: &str) -> Result<(), PatternError>;
}

/// `extract_wisdom` -> `Extract Wisdom`
pub fn display_name(name: &str) -> String {
    name.replace('_', " ")
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn categorize(name: &str) -> &'static str {
    if name.ends_with("_enhanced") {
        return ENHANCED_CATEGORY;
    }

    let lowered = name.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(category, _)| *category)
        .unwrap_or(FALLBACK_CATEGORY)
}

/// First line that is neither blank, a heading nor a code fence
pub fn extract_description(content: &str) -> String {
    content
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.starts_with('#') && !line.starts_with("```"))
        .map(|line| {
            if line.chars().count() > DESCRIPTION_LIMIT {
                let truncated: String = line.chars().take(DESCRIPTION_LIMIT).collect();
                format!("{}...", truncated)
            } else {
                line.to_string()
            }
        })
        .unwrap_or_else(|| "No description available".to_string())
}

/// Custom pattern names become directory names, so only a safe subset is allowed
pub fn validate_pattern_name(name: &str) -> Result<(), PatternError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(PatternError::InvalidName(name.to_string()))
    }
}

/// Group summaries by category, each group sorted by display name
pub fn group_by_category(patterns: &[Pattern]) -> BTreeMap<String, Vec<PatternSummary>> {
    let mut grouped: BTreeMap<String, Vec<PatternSummary>> = BTreeMap::new();
    for pattern in patterns {
        grouped
            .entry(pattern.category.clone())
            .or_default()
            .push(pattern.summary());
    }
    for summaries in grouped.values_mut() {
        summaries.sort_by(|a, b| a.name.cmp(&b.name));
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name() {
        assert_eq!(display_name("extract_wisdom"), "Extract Wisdom");
        assert_eq!(display_name("summarize"), "Summarize");
        assert_eq!(display_name("rate_ai_response"), "Rate Ai Response");
    }

    #[test]
    fn test_categorize() {
        assert_eq!(categorize("summarize_enhanced"), "Enhanced");
        assert_eq!(categorize("analyze_claims"), "Analysis");
        assert_eq!(categorize("summarize"), "Writing");
        assert_eq!(categorize("youtube_summary"), "Media");
        assert_eq!(categorize("get_youtube_rss"), "Media");
        assert_eq!(categorize("explain_code"), "Technical");
        assert_eq!(categorize("to_flashcards"), "Other");
    }

    #[test]
    fn test_extract_description() {
        let content = "# IDENTITY and PURPOSE\n\n```markdown\nYou are an expert summarizer.\nMore";
        assert_eq!(extract_description(content), "You are an expert summarizer.");

        let long = "x".repeat(120);
        let description = extract_description(&long);
        assert_eq!(description.len(), 103);
        assert!(description.ends_with("..."));

        assert_eq!(extract_description("# Only heading"), "No description available");
    }

    #[test]
    fn test_validate_pattern_name() {
        assert!(validate_pattern_name("my_pattern-2").is_ok());
        assert!(validate_pattern_name("").is_err());
        assert!(validate_pattern_name("../etc").is_err());
        assert!(validate_pattern_name("with space").is_err());
    }

    #[test]
    fn test_group_by_category_sorted() {
        let patterns = vec![
            Pattern::builtin("summarize_paper", "Summarize papers", ""),
            Pattern::builtin("improve_writing", "Improve prose", ""),
            Pattern::builtin("to_flashcards", "Flashcards", ""),
        ];

        let grouped = group_by_category(&patterns);
        let writing = &grouped["Writing"];
        assert_eq!(writing.len(), 2);
        assert_eq!(writing[0].name, "Improve Writing");
        assert_eq!(writing[1].name, "Summarize Paper");
        assert_eq!(grouped["Other"][0].id, "to_flashcards");
    }
}
