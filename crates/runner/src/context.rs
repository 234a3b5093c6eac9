// Copyright 2025 Portfolio E2E Contributors
// SPDX-License-Identifier: Apache-2.0

//! Run accumulator.
//!
//! [`RunContext`] owns the ordered result log and the pass/run counters of a
//! single battery run. Every probe routes each logical assertion through
//! [`RunContext::log_test`] exactly once; it is the sole aggregation point.

use colored::Colorize;
use portfolio_e2e_report::{RunReport, RunSummary, TestResult};
use tracing::{info, warn};

/// Ordered result log and counters of one run.
#[derive(Debug, Default)]
pub struct RunContext {
    results: Vec<TestResult>,
    tests_run: usize,
    tests_passed: usize,
    quiet: bool,
}

impl RunContext {
    /// Create a context that echoes each result to stdout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context that records results without printing them.
    pub fn quiet() -> Self {
        Self {
            quiet: true,
            ..Self::default()
        }
    }

    /// Record one outcome.
    ///
    /// Increments `tests_run`, and `tests_passed` iff `success`, then appends
    /// a timestamped [`TestResult`] and prints it.
    pub fn log_test(
        &mut self,
        name: impl Into<String>,
        success: bool,
        details: impl Into<String>,
        response_data: Option<serde_json::Value>,
    ) {
        self.tests_run += 1;
        if success {
            self.tests_passed += 1;
        }

        let result = TestResult::new(name, success, details, response_data);

        if success {
            info!(test_name = %result.test_name, success, details = %result.details, "Test passed");
        } else {
            warn!(test_name = %result.test_name, success, details = %result.details, "Test failed");
        }

        if !self.quiet {
            print_result(&result);
        }

        self.results.push(result);
    }

    /// Number of logged results.
    pub fn tests_run(&self) -> usize {
        self.tests_run
    }

    /// Number of logged results that passed.
    pub fn tests_passed(&self) -> usize {
        self.tests_passed
    }

    /// Logged results in logging order.
    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    /// Summary of the current state of the log.
    pub fn summary(&self) -> RunSummary {
        RunSummary::new(self.tests_run, self.tests_passed)
    }

    /// Print a line unless quiet.
    pub(crate) fn say(&self, line: impl AsRef<str>) {
        if !self.quiet {
            println!("{}", line.as_ref());
        }
    }

    /// Consume the context into the persisted artifact.
    pub fn into_report(self) -> RunReport {
        RunReport {
            summary: self.summary(),
            test_results: self.results,
        }
    }
}

fn print_result(result: &TestResult) {
    let status = if result.success {
        "✅ PASS".green()
    } else {
        "❌ FAIL".red()
    };
    println!("{status} - {}", result.test_name);
    if !result.details.is_empty() {
        println!("    Details: {}", result.details);
    }
    if !result.success {
        if let Some(rendered) = result.response_data.as_ref().and_then(render_response) {
            println!("    Response: {rendered}");
        }
    }
    println!();
}

/// Strings print bare, everything else as compact JSON. Empty payloads print nothing.
fn render_response(data: &serde_json::Value) -> Option<String> {
    match data {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) if text.is_empty() => None,
        serde_json::Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}
