//! Plain-data exports
//!
//! JSON and markdown renderings of reports for hand-off to reviewers or the
//! external document renderer. No DOCX/XLSX formatting happens here.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::models::ChangeReport;
use crate::trace::{CoverageSummary, RtmEntry};

/// Serializes any report type to pretty JSON at the given path
pub fn export_json<T: Serialize>(value: &T, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(output_path, json)
        .with_context(|| format!("Failed to write JSON export: {:?}", output_path))?;

    println!("Exported to JSON: {}", output_path.display());
    Ok(())
}

/// Renders a change report as markdown
pub fn change_report_markdown(report: &ChangeReport) -> String {
    let mut output = String::new();

    output.push_str("# Change Impact Analysis\n\n");
    output.push_str(&format!("**Project:** {}\n\n", report.project));

    if report.is_first_baseline {
        output.push_str(
            "No baseline found. This requirement set was saved as the first baseline; \
             no comparison was performed.\n",
        );
        return output;
    }

    if let Some(captured_at) = report.baseline_captured_at {
        output.push_str(&format!(
            "**Compared against baseline from:** {}\n\n",
            captured_at.format("%Y-%m-%d %H:%M:%S UTC")
        ));
    }

    if let Some(summary) = &report.summary {
        output.push_str("## Summary\n\n");
        output.push_str("| Category | Count |\n|---|---|\n");
        output.push_str(&format!("| Added | {} |\n", summary.added));
        output.push_str(&format!("| Removed | {} |\n", summary.removed));
        output.push_str(&format!("| Modified | {} |\n", summary.modified));
        output.push_str(&format!("| Unchanged | {} |\n\n", summary.unchanged));
    }

    if !report.changes.is_empty() {
        output.push_str("## Changes\n\n");
        output.push_str("| Requirement | Change | Detail |\n|---|---|---|\n");
        for record in &report.changes {
            output.push_str(&format!(
                "| {} | {} | {} |\n",
                record.requirement_id, record.change_type, record.description
            ));
        }
        output.push('\n');
    }

    if let Some(impact) = &report.impact {
        output.push_str(&format!("## Impact: {}\n\n", impact.impact_level));
        output.push_str(&impact.recommendations);
        output.push('\n');
    }

    output
}

/// Writes the markdown change report to a file
pub fn export_change_report_markdown(report: &ChangeReport, output_path: &Path) -> Result<()> {
    let output = change_report_markdown(report);
    fs::write(output_path, output)
        .with_context(|| format!("Failed to write change report: {:?}", output_path))?;

    println!("Exported change report: {}", output_path.display());
    Ok(())
}

/// Renders the traceability matrix as markdown
pub fn rtm_markdown(entries: &[RtmEntry], summary: &CoverageSummary) -> String {
    let mut output = String::new();

    output.push_str("# Requirements Traceability Matrix\n\n");
    output.push_str(
        "| Req ID | Requirement | Test Case | Test Description | Expected Result | Status | Coverage |\n",
    );
    output.push_str("|---|---|---|---|---|---|---|\n");

    for entry in entries {
        output.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            entry.requirement_id,
            entry.requirement_description,
            entry.test_case_id,
            entry.test_description,
            entry.expected_result,
            entry.traceability_status,
            entry.coverage
        ));
    }

    output.push_str("\n## Coverage Summary\n\n");
    output.push_str(&format!(
        "Total Requirements: {}\n",
        summary.total_requirements
    ));
    output.push_str(&format!("Total Test Cases: {}\n", summary.total_test_cases));
    output.push_str(&format!("Coverage: {}%\n", summary.coverage_percent));

    output
}

/// Writes the markdown traceability matrix to a file
pub fn export_rtm_markdown(
    entries: &[RtmEntry],
    summary: &CoverageSummary,
    output_path: &Path,
) -> Result<()> {
    let output = rtm_markdown(entries, summary);
    fs::write(output_path, output)
        .with_context(|| format!("Failed to write RTM export: {:?}", output_path))?;

    println!("Exported traceability matrix: {}", output_path.display());
    println!("  Total requirements: {}", summary.total_requirements);
    Ok(())
}
