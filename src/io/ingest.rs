//! CSV ingest for radial-velocity datasets.
//!
//! One file holds one dataset. The header must name a time, a velocity and an
//! uncertainty column; common spellings are accepted:
//!
//! - time: `t`, `time`, `jd`, `bjd`
//! - velocity: `rv`, `vel`, `velocity`
//! - uncertainty: `rv_err`, `err`, `sigma`, `rv_error`
//!
//! Rows that fail to parse or validate are skipped and reported; the load
//! fails only when no usable row remains.

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;
use tracing::warn;

use crate::domain::Dataset;
use crate::error::EstimateError;

const TIME_ALIASES: [&str; 4] = ["t", "time", "jd", "bjd"];
const RV_ALIASES: [&str; 3] = ["rv", "vel", "velocity"];
const ERR_ALIASES: [&str; 4] = ["rv_err", "err", "sigma", "rv_error"];

/// A row-level error encountered during ingest.
#[derive(Debug, Clone, PartialEq)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct IngestedDataset {
    pub dataset: Dataset,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    pub rows_used: usize,
}

#[derive(Debug, Clone, Copy)]
struct Columns {
    t: usize,
    rv: usize,
    err: usize,
}

/// Load one dataset from a CSV file.
pub fn load_dataset(path: &Path) -> Result<IngestedDataset, EstimateError> {
    let file = File::open(path)
        .map_err(|e| EstimateError::Io(format!("Failed to open CSV '{}': {e}", path.display())))?;
    let ingested = read_dataset(file)
        .map_err(|e| match e {
            EstimateError::Parse(msg) => EstimateError::Parse(format!("{}: {msg}", path.display())),
            other => other,
        })?;

    for err in &ingested.row_errors {
        warn!(file = %path.display(), line = err.line, "skipped row: {}", err.message);
    }
    Ok(ingested)
}

/// Parse a dataset from any CSV reader.
pub fn read_dataset<R: std::io::Read>(input: R) -> Result<IngestedDataset, EstimateError> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(input);

    let headers = reader
        .headers()
        .map_err(|e| EstimateError::Parse(format!("Failed to read CSV headers: {e}")))?
        .clone();
    let cols = resolve_columns(&build_header_map(&headers))?;

    let mut t = Vec::new();
    let mut rv = Vec::new();
    let mut rv_err = Vec::new();
    let mut row_errors = Vec::new();
    let mut rows_read = 0usize;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        match parse_row(&record, cols) {
            Ok((ti, vi, si)) => {
                t.push(ti);
                rv.push(vi);
                rv_err.push(si);
            }
            Err(message) => row_errors.push(RowError { line, message }),
        }
    }

    let rows_used = t.len();
    if rows_used == 0 {
        return Err(EstimateError::Parse(format!(
            "No valid rows in CSV ({rows_read} read, {} rejected).",
            row_errors.len()
        )));
    }

    Ok(IngestedDataset {
        dataset: Dataset::new(t, rv, rv_err)?,
        row_errors,
        rows_read,
        rows_used,
    })
}

fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports often prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

fn resolve_columns(header_map: &HashMap<String, usize>) -> Result<Columns, EstimateError> {
    let find = |aliases: &[&str], what: &str| {
        aliases
            .iter()
            .find_map(|a| header_map.get(*a).copied())
            .ok_or_else(|| {
                EstimateError::Parse(format!(
                    "Missing required {what} column (one of: {}).",
                    aliases.join(", ")
                ))
            })
    };
    Ok(Columns {
        t: find(&TIME_ALIASES, "time")?,
        rv: find(&RV_ALIASES, "velocity")?,
        err: find(&ERR_ALIASES, "uncertainty")?,
    })
}

fn parse_row(record: &StringRecord, cols: Columns) -> Result<(f64, f64, f64), String> {
    let t = parse_field(record, cols.t, "time")?;
    let rv = parse_field(record, cols.rv, "velocity")?;
    let err = parse_field(record, cols.err, "uncertainty")?;
    if err <= 0.0 {
        return Err(format!("Uncertainty must be > 0, got {err}."));
    }
    Ok((t, rv, err))
}

fn parse_field(record: &StringRecord, idx: usize, what: &str) -> Result<f64, String> {
    let raw = record
        .get(idx)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing {what} value."))?;
    let v: f64 = raw
        .parse()
        .map_err(|_| format!("Invalid {what} value `{raw}`."))?;
    if !v.is_finite() {
        return Err(format!("Non-finite {what} value."));
    }
    Ok(v)
}
