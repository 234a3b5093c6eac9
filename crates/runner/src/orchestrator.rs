// Copyright 2025 Portfolio E2E Contributors
// SPDX-License-Identifier: Apache-2.0

//! Battery sequencing and run verdict.
//!
//! Probes run strictly one after another. A failed health check aborts the
//! run before any other probe; every later probe runs regardless of the
//! outcome of the previous ones.

use crate::config::RunnerConfig;
use crate::context::RunContext;
use crate::http::ProbeClient;
use crate::probes;
use crate::{Result, RunnerError};
use portfolio_e2e_report::RunReport;
use tracing::{info, warn};

const RULE: &str = "==================================================";

/// Final state of a run.
#[derive(Debug)]
pub struct RunOutcome {
    /// Whether the success rate reached the threshold.
    pub success: bool,
    /// Whether the run stopped after a failed health check.
    pub aborted: bool,
    /// The result log and counters.
    pub context: RunContext,
}

impl RunOutcome {
    /// Consume the outcome into the persisted artifact.
    pub fn into_report(self) -> RunReport {
        self.context.into_report()
    }
}

/// Run the full battery against `config`, recording into `ctx`.
///
/// Returns `Ok(true)` iff the success rate is at least 80%. Probe failures
/// are recorded in `ctx`; only failing to build the HTTP client is an error.
pub async fn run_all_tests(ctx: &mut RunContext, config: &RunnerConfig) -> Result<bool> {
    Ok(run_probes(ctx, config).await?.0)
}

async fn run_probes(ctx: &mut RunContext, config: &RunnerConfig) -> Result<(bool, bool)> {
    let client = ProbeClient::new(config.api_url()).map_err(RunnerError::Client)?;
    info!(api_url = %client.api_url(), "Starting backend probe battery");

    ctx.say("🚀 Starting Portfolio Backend API Tests");
    ctx.say(RULE);
    ctx.say("");

    if !probes::health_check(ctx, &client, config).await {
        warn!("Health check failed, stopping run");
        ctx.say("❌ Health check failed. Stopping tests.");
        return Ok((false, true));
    }

    let contact_id = probes::contact_submission(ctx, &client, config).await;
    let validation_ok = probes::contact_validation(ctx, &client, config).await;
    let list_ok = probes::list_messages(ctx, &client, config).await;
    let cors_ok = probes::cors_headers(ctx, &client, config).await;
    let email_ok = probes::email_submission(ctx, &client, config).await;

    info!(
        contact_id = contact_id.as_deref().unwrap_or("none"),
        validation_ok, list_ok, cors_ok, email_ok, "Probe battery finished"
    );

    let summary = ctx.summary();
    ctx.say(RULE);
    ctx.say(format!(
        "📊 Test Summary: {}/{} tests passed",
        summary.tests_passed, summary.tests_run
    ));
    ctx.say(format!("📈 Success Rate: {:.1}%", summary.success_rate));
    ctx.say(summary.classification().banner());

    info!(
        tests_run = summary.tests_run,
        tests_passed = summary.tests_passed,
        success_rate = summary.success_rate,
        "Run summary"
    );

    Ok((summary.is_success(), false))
}

/// Run the battery in a fresh context and return everything it produced.
pub async fn run_battery(config: &RunnerConfig, quiet: bool) -> Result<RunOutcome> {
    let mut context = if quiet {
        RunContext::quiet()
    } else {
        RunContext::new()
    };
    let (success, aborted) = run_probes(&mut context, config).await?;
    Ok(RunOutcome {
        success,
        aborted,
        context,
    })
}
