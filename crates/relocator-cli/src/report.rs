use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use relocator_core::RelocationReport;
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::Path;

#[derive(Serialize)]
struct ReportRow<'a> {
    filename: &'a str,
    status: String,
    destination: &'a str,
    detail: &'a str,
    run_at: &'a str,
}

#[derive(Serialize)]
struct KeyRow<'a> {
    #[serde(rename = "Serial_Number")]
    serial_number: &'a str,
}

/// Write one CSV row per outcome, stamped with the run time.
pub fn export_report(path: &Path, report: &RelocationReport, run_at: DateTime<Local>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Error creating CSV {}", path.display()))?;
    let run_at = run_at.to_rfc3339();

    for outcome in &report.outcomes {
        writer.serialize(ReportRow {
            filename: &outcome.filename,
            status: outcome.status.to_string(),
            destination: outcome.destination.as_deref().unwrap_or(""),
            detail: outcome.detail.as_deref().unwrap_or(""),
            run_at: &run_at,
        })?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the unique keys, sorted, under a `Serial_Number` header.
pub fn export_keys(path: &Path, keys: &BTreeSet<String>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Error creating CSV {}", path.display()))?;
    if keys.is_empty() {
        writer.write_record(["Serial_Number"])?;
    }
    for key in keys {
        writer.serialize(KeyRow { serial_number: key })?;
    }
    writer.flush()?;
    Ok(())
}
