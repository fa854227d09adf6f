// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! System status report: pattern count and provider availability

use chrono::{SecondsFormat, Utc};
use serde::Serialize;

use crate::domain::llm::ProviderStatus;
use crate::domain::pattern::PatternRepository;
use crate::infrastructure::llm::ProviderRegistry;

#[derive(Debug, Clone, Serialize)]
pub struct ProviderSummary {
    pub total: usize,
    pub available: usize,
    pub details: Vec<ProviderStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub status: &'static str,
    pub version: &'static str,
    pub patterns: usize,
    pub providers: ProviderSummary,
    pub timestamp: String,
}

pub async fn status_report(patterns: &dyn PatternRepository, registry: &ProviderRegistry) -> StatusReport {
    let details = registry.list_providers().await;
    let available = details.iter().filter(|p| p.is_available()).count();

    StatusReport {
        status: "online",
        version: env!("CARGO_PKG_VERSION"),
        patterns: patterns.count().await,
        providers: ProviderSummary {
            total: details.len(),
            available,
            details,
        },
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}
