//! Test result types.
//!
//! This module provides the [`TestResult`] record produced once per logged
//! probe outcome, and the [`RunSummary`] derived from a full result log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Success rate (percent) at or above which a run is considered successful.
pub const SUCCESS_THRESHOLD: f64 = 80.0;

/// Success rate (percent) at or above which a failing run only "has issues".
pub const ISSUES_THRESHOLD: f64 = 60.0;

/// One logged probe outcome.
///
/// `test_name` is not unique: validation sub-cases share the
/// `"Validation - "` prefix. Results keep the order in which they were logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Label identifying the probe or sub-case.
    pub test_name: String,
    /// Verdict for this assertion.
    pub success: bool,
    /// Human-readable explanation, may be empty.
    pub details: String,
    /// Raw response payload captured on failure, if any.
    pub response_data: Option<serde_json::Value>,
    /// Instant at which the outcome was logged.
    pub timestamp: DateTime<Utc>,
}

impl TestResult {
    /// Create a new TestResult stamped with the current instant.
    pub fn new(
        test_name: impl Into<String>,
        success: bool,
        details: impl Into<String>,
        response_data: Option<serde_json::Value>,
    ) -> Self {
        Self {
            test_name: test_name.into(),
            success,
            details: details.into(),
            response_data,
            timestamp: Utc::now(),
        }
    }
}

/// Aggregate counts over a result log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Number of logged results.
    pub tests_run: usize,
    /// Number of logged results with `success == true`.
    pub tests_passed: usize,
    /// `tests_passed / tests_run * 100`, or 0 for an empty run.
    pub success_rate: f64,
    /// Instant at which the summary was computed.
    pub timestamp: DateTime<Utc>,
}

impl RunSummary {
    /// Build a summary from raw counters.
    pub fn new(tests_run: usize, tests_passed: usize) -> Self {
        Self {
            tests_run,
            tests_passed,
            success_rate: success_rate(tests_passed, tests_run),
            timestamp: Utc::now(),
        }
    }

    /// Derive a summary from a result log.
    pub fn from_results(results: &[TestResult]) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self::new(results.len(), passed)
    }

    /// Whether the run meets [`SUCCESS_THRESHOLD`].
    pub fn is_success(&self) -> bool {
        self.success_rate >= SUCCESS_THRESHOLD
    }

    /// Qualitative classification of the run.
    pub fn classification(&self) -> Classification {
        Classification::from_rate(self.success_rate)
    }
}

/// Percentage of passed tests, defined as 0 when nothing ran.
pub fn success_rate(passed: usize, run: usize) -> f64 {
    if run == 0 {
        return 0.0;
    }
    let passed = passed.min(run);
    (passed as f64 / run as f64) * 100.0
}

/// Console-only classification of a run's success rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Rate >= 80%.
    MostlySuccessful,
    /// 60% <= rate < 80%.
    HasIssues,
    /// Rate < 60%.
    SignificantIssues,
}

impl Classification {
    /// Classify a success rate in percent.
    pub fn from_rate(rate: f64) -> Self {
        if rate >= SUCCESS_THRESHOLD {
            Self::MostlySuccessful
        } else if rate >= ISSUES_THRESHOLD {
            Self::HasIssues
        } else {
            Self::SignificantIssues
        }
    }

    /// Banner printed at the end of a run.
    pub fn banner(&self) -> &'static str {
        match self {
            Self::MostlySuccessful => "🎉 Backend tests mostly successful!",
            Self::HasIssues => "⚠️  Backend has some issues that need attention",
            Self::SignificantIssues => "🚨 Backend has significant issues",
        }
    }
}
