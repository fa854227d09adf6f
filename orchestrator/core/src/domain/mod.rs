// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Layer (`unravel-core`)
//!
//! Pure types and contracts. Nothing in here performs I/O; adapters live in
//! `crate::infrastructure`.
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`llm`] | Provider trait, generation options/results, `LLMError` |
//! | [`pattern`] | Pattern aggregate, naming/category rules, repository trait |
//! | [`process`] | Processing request, `ProcessResult` envelope, `ProcessError` |
//! | [`ingestion`] | Scraped/video content and their source traits |
//! | [`settings`] | Persisted settings document and repository trait |
//! | [`config`] | `UnravelConfigManifest` YAML configuration |

pub mod config;
pub mod ingestion;
pub mod llm;
pub mod pattern;
pub mod process;
pub mod settings;
