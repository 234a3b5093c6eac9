//! Markdown output generation for run reports.

use crate::RunReport;
use std::fmt::Write;

const DETAILS_PREVIEW_LEN: usize = 60;

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

fn preview(text: &str) -> String {
    if text.chars().count() > DETAILS_PREVIEW_LEN {
        let cut: String = text.chars().take(DETAILS_PREVIEW_LEN - 3).collect();
        format!("{cut}...")
    } else {
        text.to_string()
    }
}

/// Generate a markdown summary from a run report.
pub fn generate_summary(report: &RunReport) -> String {
    let mut output = String::new();
    let summary = &report.summary;

    // Writing into a String cannot fail.
    let _ = writeln!(output, "# Backend Test Summary");
    let _ = writeln!(output);
    let _ = writeln!(output, "Generated: {}", summary.timestamp.to_rfc3339());
    let _ = writeln!(output);
    let _ = writeln!(output, "## Results");
    let _ = writeln!(output);
    let _ = writeln!(output, "| Test | Status | Timestamp | Details |");
    let _ = writeln!(output, "|------|--------|-----------|---------|");

    for result in &report.test_results {
        let status = if result.success { "PASS" } else { "FAIL" };
        let _ = writeln!(
            output,
            "| {} | {} | {} | {} |",
            escape_cell(&result.test_name),
            status,
            result.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            escape_cell(&preview(&result.details)),
        );
    }

    let mut failures = report.failures().peekable();
    if failures.peek().is_some() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Failures");
        let _ = writeln!(output);
        for result in failures {
            let _ = writeln!(output, "- **{}**: {}", result.test_name, result.details);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "---");
    let _ = writeln!(
        output,
        "Passed: {}/{} ({:.1}%)",
        summary.tests_passed, summary.tests_run, summary.success_rate
    );
    let _ = writeln!(output, "{}", summary.classification().banner());

    output
}
