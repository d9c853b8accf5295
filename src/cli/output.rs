//! Output formatting for CLI

use crate::models::{ImportReport, ProgressPhase, ProgressSnapshot};

/// Format one progress snapshot as a console line.
#[must_use]
pub fn format_progress(snapshot: &ProgressSnapshot) -> String {
    let minutes = snapshot.elapsed_minutes();
    match snapshot.phase {
        ProgressPhase::Started => {
            format!("Number of units (dirs) to import: {}", snapshot.total_units)
        }
        ProgressPhase::Running => format!(
            "{:06} units processed so far in {minutes:.2} minutes",
            snapshot.processed_units
        ),
        ProgressPhase::Finished => format!("Import done in {minutes:.2} minutes"),
    }
}

/// Human-readable run summary, one line per item.
#[must_use]
pub fn format_summary(report: &ImportReport) -> String {
    let mut lines = vec![
        format!(
            "Units: {} total, {} ok, {} failed",
            report.units_total, report.units_succeeded, report.units_failed
        ),
        format!(
            "Records: {} written from {} files ({} create, {} append batches)",
            report.records_written, report.files_read, report.batches_created, report.batches_appended
        ),
    ];

    if report.table_created {
        lines.push("Table created by this run".to_string());
    }

    for failure in &report.failures {
        lines.push(format!("  failed {}: {}", failure.unit, failure.message));
    }

    lines.join("\n")
}

/// Format the report as JSON
#[must_use]
pub fn format_json(report: &ImportReport) -> String {
    serde_json::to_string_pretty(report).unwrap_or_else(|_| "{}".to_string())
}
