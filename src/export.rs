//! Spreadsheet export of a finalized log.
//!
//! Writes a CSV next to the finalized JSONL with the same base name, header
//! in schema order. Export failures are warned and swallowed: the log file
//! is already safe on disk and must not be affected.

use crate::logfile;
use crate::record::{Record, FIELD_NAMES};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

fn csv_cell(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => {
            if s.contains([',', '"', '\n']) {
                format!("\"{}\"", s.replace('"', "\"\""))
            } else {
                s.clone()
            }
        }
        other => other.to_string(),
    }
}

fn csv_line(record: &Record) -> Result<String> {
    let value = serde_json::to_value(record).context("serializing record")?;
    let object = value.as_object().context("record is not an object")?;
    let cells: Vec<String> = FIELD_NAMES
        .iter()
        .map(|name| csv_cell(object.get(*name).unwrap_or(&serde_json::Value::Null)))
        .collect();
    Ok(cells.join(","))
}

fn write_csv(log_path: &Path, csv_path: &Path) -> Result<usize> {
    let records = logfile::read_records(log_path);
    let mut out = String::new();
    out.push_str(&FIELD_NAMES.join(","));
    out.push('\n');
    for record in &records {
        out.push_str(&csv_line(record)?);
        out.push('\n');
    }
    std::fs::write(csv_path, out)
        .with_context(|| format!("writing {}", csv_path.display()))?;
    Ok(records.len())
}

/// Export the finalized log to `<base>.csv`. Never propagates failure.
pub fn export_csv(final_log_path: &Path) -> Option<PathBuf> {
    let csv_path = final_log_path.with_extension("csv");
    match write_csv(final_log_path, &csv_path) {
        Ok(count) => {
            info!("exported {count} records to {}", csv_path.display());
            Some(csv_path)
        }
        Err(e) => {
            warn!("export failed ({e}); log remains at {}", final_log_path.display());
            None
        }
    }
}
