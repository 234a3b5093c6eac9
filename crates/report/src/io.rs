//! I/O operations for report artifacts.
//!
//! This module writes the JSON artifact consumed by CI, reads it back, and
//! writes the optional Markdown rendering.

use crate::markdown;
use crate::{ReportError, Result, RunReport};
use std::fs;
use std::path::Path;

/// Default artifact path.
pub const DEFAULT_REPORT_PATH: &str = "/app/backend_test_results.json";

fn io_error(path: &Path, source: std::io::Error) -> ReportError {
    ReportError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Ensure the parent directory of `path` exists.
fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(|e| io_error(parent, e))
        }
        _ => Ok(()),
    }
}

/// Write the report as pretty JSON, replacing any previous artifact.
pub fn write_report(report: &RunReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(report)?;
    fs::write(path, json).map_err(|e| io_error(path, e))
}

/// Read a report artifact from disk.
pub fn read_report(path: impl AsRef<Path>) -> Result<RunReport> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Write the Markdown rendering of the report.
pub fn write_markdown(report: &RunReport, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    ensure_parent_dir(path)?;
    fs::write(path, markdown::generate_summary(report)).map_err(|e| io_error(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TestResult;

    fn sample_report() -> RunReport {
        RunReport::from_results(vec![
            TestResult::new("Health Check Endpoint", true, "Status: 200", None),
            TestResult::new(
                "Get Contact Messages",
                false,
                "Response is not a list",
                Some(serde_json::json!({"items": []})),
            ),
        ])
    }

    #[test]
    fn test_write_then_read_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        let report = sample_report();

        write_report(&report, &path).unwrap();
        let loaded = read_report(&path).unwrap();

        assert_eq!(loaded, report);
    }

    #[test]
    fn test_write_creates_parent_dirs_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/results.json");

        write_report(&sample_report(), &path).unwrap();
        write_report(&RunReport::from_results(Vec::new()), &path).unwrap();

        let loaded = read_report(&path).unwrap();
        assert_eq!(loaded.summary.tests_run, 0);
        assert!(loaded.test_results.is_empty());
    }

    #[test]
    fn test_written_json_is_indented() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");
        write_report(&sample_report(), &path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.starts_with("{\n  \"summary\""));
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_report(dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ReportError::Io { .. }));
    }

    #[test]
    fn test_write_markdown() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");
        write_markdown(&sample_report(), &path).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("Get Contact Messages"));
    }
}
