// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod ingestion;
pub mod processing;
pub mod status;

// Re-export use cases for convenience
pub use ingestion::IngestionService;
pub use processing::{build_prompt, ProcessingPipeline};
pub use status::{status_report, StatusReport};
