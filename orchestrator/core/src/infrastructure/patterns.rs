// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Pattern Repositories
//
// Filesystem layout, one directory per pattern:
//
//   <builtin_dir>/<name>/system.md     template (required)
//   <builtin_dir>/<name>/user.md       auxiliary context (optional)
//   <custom_dir>/<name>/system.md      template (required)
//   <custom_dir>/<name>/metadata.json  CustomPatternMetadata (optional)
//
// Custom patterns shadow built-ins of the same name.

use crate::domain::pattern::{
    display_name, validate_pattern_name, CustomPatternDraft, CustomPatternMetadata, Pattern, PatternError,
    PatternRepository, CUSTOM_CATEGORY,
};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const SYSTEM_FILE: &str = "system.md";
const USER_FILE: &str = "user.md";
const METADATA_FILE: &str = "metadata.json";
const CUSTOM_DESCRIPTION: &str = "Custom pattern";

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn storage_error(context: &str, path: &Path, error: impl std::fmt::Display) -> PatternError {
    PatternError::Storage(format!("{} {}: {}", context, path.display(), error))
}

fn custom_pattern(name: &str, content: String, category: Option<&str>, description: Option<&str>) -> Pattern {
    let non_blank = |value: Option<&str>| value.map(str::trim).filter(|v| !v.is_empty()).map(String::from);
    Pattern {
        name: name.to_string(),
        display_name: display_name(name),
        content,
        user_context: String::new(),
        category: non_blank(category).unwrap_or_else(|| CUSTOM_CATEGORY.to_string()),
        description: non_blank(description).unwrap_or_else(|| CUSTOM_DESCRIPTION.to_string()),
        custom: true,
    }
}

fn sorted(patterns: impl Iterator<Item = Pattern>) -> Vec<Pattern> {
    let mut patterns: Vec<Pattern> = patterns.collect();
    patterns.sort_by(|a, b| a.name.cmp(&b.name));
    patterns
}

/// Sub-directory names of `dir`, sorted. Unreadable entries are skipped.
async fn pattern_dirs(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        match entry.file_type().await {
            Ok(file_type) if file_type.is_dir() => {
                if let Some(name) = entry.file_name().to_str() {
                    names.push(name.to_string());
                }
            }
            Ok(_) => {}
            Err(e) => warn!("Skipping unreadable entry {:?}: {}", entry.path(), e),
        }
    }
    names.sort();
    Ok(names)
}

async fn load_builtin(dir: &Path, name: &str) -> Result<Pattern, PatternError> {
    let pattern_dir = dir.join(name);
    let system_path = pattern_dir.join(SYSTEM_FILE);
    let content = tokio::fs::read_to_string(&system_path)
        .await
        .map_err(|e| storage_error("Failed to read", &system_path, e))?;
    let user_context = tokio::fs::read_to_string(pattern_dir.join(USER_FILE))
        .await
        .unwrap_or_default();
    Ok(Pattern::builtin(name, content, user_context))
}

async fn load_custom(dir: &Path, name: &str) -> Result<Pattern, PatternError> {
    let pattern_dir = dir.join(name);
    let system_path = pattern_dir.join(SYSTEM_FILE);
    let content = tokio::fs::read_to_string(&system_path)
        .await
        .map_err(|e| storage_error("Failed to read", &system_path, e))?;

    let metadata = match tokio::fs::read_to_string(pattern_dir.join(METADATA_FILE)).await {
        Ok(raw) => serde_json::from_str::<CustomPatternMetadata>(&raw)
            .map_err(|e| warn!("Ignoring malformed metadata for custom pattern '{}': {}", name, e))
            .ok(),
        Err(_) => None,
    };

    Ok(custom_pattern(
        name,
        content,
        metadata.as_ref().map(|m| m.category.as_str()),
        metadata.as_ref().map(|m| m.description.as_str()),
    ))
}

/// Pattern store backed by pattern directories on disk
pub struct FilesystemPatternRepository {
    builtin_dir: PathBuf,
    custom_dir: PathBuf,
    index: RwLock<HashMap<String, Pattern>>,
}

impl FilesystemPatternRepository {
    /// Scan both directories and build the in-memory index.
    ///
    /// A missing built-in directory is created and yields no patterns; a
    /// missing custom directory is simply skipped.
    pub async fn load(builtin_dir: impl Into<PathBuf>, custom_dir: impl Into<PathBuf>) -> Result<Self, PatternError> {
        let builtin_dir = builtin_dir.into();
        let custom_dir = custom_dir.into();
        let mut index = HashMap::new();

        match pattern_dirs(&builtin_dir).await {
            Ok(names) => {
                for name in names {
                    match load_builtin(&builtin_dir, &name).await {
                        Ok(pattern) => {
                            index.insert(name, pattern);
                        }
                        Err(e) => warn!("Failed to load pattern {}: {}", name, e),
                    }
                }
            }
            Err(e) => {
                warn!("Pattern directory {:?} unavailable ({}), creating it", builtin_dir, e);
                tokio::fs::create_dir_all(&builtin_dir)
                    .await
                    .map_err(|e| storage_error("Failed to create", &builtin_dir, e))?;
            }
        }

        if let Ok(names) = pattern_dirs(&custom_dir).await {
            for name in names {
                match load_custom(&custom_dir, &name).await {
                    Ok(pattern) => {
                        index.insert(name, pattern);
                    }
                    Err(e) => warn!("Failed to load custom pattern {}: {}", name, e),
                }
            }
        }

        info!("Loaded {} patterns", index.len());

        Ok(Self {
            builtin_dir,
            custom_dir,
            index: RwLock::new(index),
        })
    }
}

#[async_trait]
impl PatternRepository for FilesystemPatternRepository {
    async fn get(&self, name: &str) -> Result<Pattern, PatternError> {
        self.index
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| PatternError::NotFound(name.to_string()))
    }

    async fn list(&self) -> Vec<Pattern> {
        sorted(self.index.read().values().cloned())
    }

    async fn count(&self) -> usize {
        self.index.read().len()
    }

    async fn save_custom(&self, draft: CustomPatternDraft) -> Result<CustomPatternMetadata, PatternError> {
        validate_pattern_name(&draft.name)?;
        if draft.content.trim().is_empty() {
            return Err(PatternError::EmptyContent);
        }

        let pattern_dir = self.custom_dir.join(&draft.name);
        tokio::fs::create_dir_all(&pattern_dir)
            .await
            .map_err(|e| storage_error("Failed to create", &pattern_dir, e))?;

        let metadata_path = pattern_dir.join(METADATA_FILE);
        let previous = tokio::fs::read_to_string(&metadata_path)
            .await
            .ok()
            .and_then(|raw| serde_json::from_str::<CustomPatternMetadata>(&raw).ok());

        let now = now_rfc3339();
        let metadata = CustomPatternMetadata {
            name: draft.name.clone(),
            category: draft
                .category
                .clone()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or_else(|| CUSTOM_CATEGORY.to_string()),
            description: draft.description.clone().unwrap_or_default(),
            created: previous.map(|p| p.created).unwrap_or_else(|| now.clone()),
            updated: now,
            custom: true,
        };

        let system_path = pattern_dir.join(SYSTEM_FILE);
        tokio::fs::write(&system_path, &draft.content)
            .await
            .map_err(|e| storage_error("Failed to write", &system_path, e))?;

        let encoded = serde_json::to_string_pretty(&metadata)
            .map_err(|e| PatternError::Storage(format!("Failed to encode metadata: {}", e)))?;
        tokio::fs::write(&metadata_path, encoded)
            .await
            .map_err(|e| storage_error("Failed to write", &metadata_path, e))?;

        let pattern = custom_pattern(
            &draft.name,
            draft.content,
            Some(&metadata.category),
            Some(&metadata.description),
        );
        self.index.write().insert(draft.name.clone(), pattern);
        info!("Saved custom pattern '{}'", draft.name);

        Ok(metadata)
    }

    async fn delete_custom(&self, name: &str) -> Result<(), PatternError> {
        validate_pattern_name(name)?;

        let is_custom = self.index.read().get(name).is_some_and(|p| p.custom);
        let pattern_dir = self.custom_dir.join(name);
        if !is_custom || !tokio::fs::try_exists(&pattern_dir).await.unwrap_or(false) {
            return Err(PatternError::NotFound(name.to_string()));
        }

        tokio::fs::remove_dir_all(&pattern_dir)
            .await
            .map_err(|e| storage_error("Failed to remove", &pattern_dir, e))?;

        // A shadowed built-in becomes visible again
        let restored = load_builtin(&self.builtin_dir, name).await.ok();
        let mut index = self.index.write();
        match restored {
            Some(builtin) => {
                debug!("Restoring built-in pattern '{}'", name);
                index.insert(name.to_string(), builtin);
            }
            None => {
                index.remove(name);
            }
        }
        info!("Deleted custom pattern '{}'", name);
        Ok(())
    }
}

/// Pattern store held entirely in memory
#[derive(Default)]
pub struct InMemoryPatternRepository {
    patterns: RwLock<HashMap<String, Pattern>>,
}

impl InMemoryPatternRepository {
    pub fn new(patterns: impl IntoIterator<Item = Pattern>) -> Self {
        Self {
            patterns: RwLock::new(patterns.into_iter().map(|p| (p.name.clone(), p)).collect()),
        }
    }
}

#[async_trait]
impl PatternRepository for InMemoryPatternRepository {
    async fn get(&self, name: &str) -> Result<Pattern, PatternError> {
        self.patterns
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| PatternError::NotFound(name.to_string()))
    }

    async fn list(&self) -> Vec<Pattern> {
        sorted(self.patterns.read().values().cloned())
    }

    async fn count(&self) -> usize {
        self.patterns.read().len()
    }

    async fn save_custom(&self, draft: CustomPatternDraft) -> Result<CustomPatternMetadata, PatternError> {
        validate_pattern_name(&draft.name)?;
        if draft.content.trim().is_empty() {
            return Err(PatternError::EmptyContent);
        }

        let now = now_rfc3339();
        let pattern = custom_pattern(
            &draft.name,
            draft.content,
            draft.category.as_deref(),
            draft.description.as_deref(),
        );
        let metadata = CustomPatternMetadata {
            name: draft.name.clone(),
            category: pattern.category.clone(),
            description: draft.description.unwrap_or_default(),
            created: now.clone(),
            updated: now,
            custom: true,
        };
        self.patterns.write().insert(draft.name, pattern);
        Ok(metadata)
    }

    async fn delete_custom(&self, name: &str) -> Result<(), PatternError> {
        let mut patterns = self.patterns.write();
        match patterns.get(name) {
            Some(p) if p.custom => {
                patterns.remove(name);
                Ok(())
            }
            _ => Err(PatternError::NotFound(name.to_string())),
        }
    }
}
