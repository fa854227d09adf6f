// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod llm;
pub mod patterns;
pub mod scraper;
pub mod settings_store;
pub mod youtube;

pub use patterns::{FilesystemPatternRepository, InMemoryPatternRepository};
pub use scraper::WebScraper;
pub use settings_store::JsonSettingsRepository;
pub use youtube::YoutubeVideoSource;
