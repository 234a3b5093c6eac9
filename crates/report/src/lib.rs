//! Report model for the portfolio backend E2E harness.
//!
//! This crate provides the record types produced by a probe run and the
//! artifacts written once the run finishes.
//!
//! # Quick Start
//!
//! ```no_run
//! use portfolio_e2e_report::{io, RunReport, TestResult};
//!
//! let results = vec![TestResult::new("Health Check Endpoint", true, "Status: 200", None)];
//! let report = RunReport::from_results(results);
//!
//! io::write_report(&report, "backend_test_results.json")?;
//! # Ok::<(), portfolio_e2e_report::ReportError>(())
//! ```
//!
//! # Modules
//!
//! - [`result`] - `TestResult`, `RunSummary` and the success-rate rules
//! - [`io`] - reading and writing the JSON artifact
//! - [`markdown`] - Markdown report generation

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod io;
pub mod markdown;
pub mod result;

pub use result::{
    success_rate, Classification, RunSummary, TestResult, ISSUES_THRESHOLD, SUCCESS_THRESHOLD,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while persisting or loading report artifacts.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Filesystem failure
    #[error("I/O error on {path}: {source}")]
    Io {
        /// File or directory being accessed.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;

/// The persisted artifact: a summary plus the full ordered result log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Aggregate counts computed from `test_results`.
    pub summary: RunSummary,
    /// Every logged result, in logging order.
    pub test_results: Vec<TestResult>,
}

impl RunReport {
    /// Build a report, deriving the summary from the results.
    pub fn from_results(test_results: Vec<TestResult>) -> Self {
        Self {
            summary: RunSummary::from_results(&test_results),
            test_results,
        }
    }

    /// Failed results only, in logging order.
    pub fn failures(&self) -> impl Iterator<Item = &TestResult> {
        self.test_results.iter().filter(|r| !r.success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_summary_matches_results() {
        let report = RunReport::from_results(vec![
            TestResult::new("Health Check Endpoint", false, "Request failed: refused", None),
        ]);
        assert_eq!(report.summary.tests_run, 1);
        assert_eq!(report.summary.tests_passed, 0);
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_empty_report() {
        let report = RunReport::from_results(Vec::new());
        assert_eq!(report.summary.success_rate, 0.0);
        assert!(!report.summary.is_success());
    }

    #[test]
    fn test_report_document_shape() {
        let report = RunReport::from_results(vec![TestResult::new("CORS Headers", true, "", None)]);
        let json = serde_json::to_value(&report).unwrap();
        for key in ["tests_run", "tests_passed", "success_rate", "timestamp"] {
            assert!(json["summary"].get(key).is_some(), "missing summary.{key}");
        }
        assert!(json["test_results"].is_array());
    }
}
