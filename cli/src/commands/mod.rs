// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the Unravel CLI

pub mod config;
pub mod patterns;
pub mod process;
pub mod providers;

pub use self::config::ConfigCommand;
pub use self::patterns::PatternsArgs;
pub use self::process::ProcessArgs;
pub use self::providers::ProvidersArgs;
