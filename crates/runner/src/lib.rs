// Copyright 2025 Portfolio E2E Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end probe battery for the portfolio backend.
//!
//! The runner exercises a deployed service over HTTP: a health check, a
//! contact submission, four validation rejections, message listing, CORS
//! preflight headers and an email-triggering submission. Every outcome is
//! recorded in a [`RunContext`] and the run verdict is derived from the
//! overall success rate.
//!
//! # Example
//!
//! ```no_run
//! use portfolio_e2e_runner::{run_all_tests, RunContext, RunnerConfig};
//!
//! # async fn example() -> portfolio_e2e_runner::Result<()> {
//! let config = RunnerConfig::new("http://localhost:8001");
//! let mut ctx = RunContext::new();
//! let success = run_all_tests(&mut ctx, &config).await?;
//! let report = ctx.into_report();
//! println!("{} -> {}", report.summary.success_rate, success);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod config;
pub mod context;
pub mod http;
pub mod orchestrator;
pub mod probes;

pub use config::{ConfigError, RunnerConfig};
pub use context::RunContext;
pub use orchestrator::{run_all_tests, run_battery, RunOutcome};

use thiserror::Error;

/// Errors that prevent a run from starting.
#[derive(Debug, Error)]
pub enum RunnerError {
    /// Invalid or unreadable configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP client could not be constructed
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

/// Result type for runner operations.
pub type Result<T> = std::result::Result<T, RunnerError>;
