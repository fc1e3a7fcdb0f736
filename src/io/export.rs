//! Result exports.
//!
//! - estimate/summary JSON (`serde_json`, pretty-printed)
//! - flattened posterior samples as CSV, one row per sample
//! - datasets as CSV in the same schema `ingest` reads

use std::fs::File;
use std::path::Path;

use nalgebra::DMatrix;
use serde::Serialize;

use crate::domain::Dataset;
use crate::error::EstimateError;

/// Write any serializable result as pretty JSON.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), EstimateError> {
    let file = File::create(path)
        .map_err(|e| EstimateError::Io(format!("Failed to create JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, value)
        .map_err(|e| EstimateError::Io(format!("Failed to write JSON '{}': {e}", path.display())))
}

/// Write flat samples with a header of parameter names.
pub fn write_samples_csv(path: &Path, samples: &DMatrix<f64>, names: &[String]) -> Result<(), EstimateError> {
    let file = File::create(path)
        .map_err(|e| EstimateError::Io(format!("Failed to create samples CSV '{}': {e}", path.display())))?;
    write_samples(file, samples, names)
}

pub(crate) fn write_samples<W: std::io::Write>(
    out: W,
    samples: &DMatrix<f64>,
    names: &[String],
) -> Result<(), EstimateError> {
    if names.len() != samples.ncols() {
        return Err(EstimateError::config(format!(
            "{} column names for {} sample columns",
            names.len(),
            samples.ncols()
        )));
    }
    let io_err = |e: csv::Error| EstimateError::Io(format!("Failed to write samples CSV: {e}"));

    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(names).map_err(io_err)?;
    for row in samples.row_iter() {
        writer
            .write_record(row.iter().map(|v| format!("{v:.10e}")))
            .map_err(io_err)?;
    }
    writer
        .flush()
        .map_err(|e| EstimateError::Io(format!("Failed to flush samples CSV: {e}")))
}

/// Write a dataset as `t,rv,rv_err`.
pub fn write_dataset_csv(path: &Path, data: &Dataset) -> Result<(), EstimateError> {
    let file = File::create(path)
        .map_err(|e| EstimateError::Io(format!("Failed to create dataset CSV '{}': {e}", path.display())))?;
    let io_err = |e: csv::Error| EstimateError::Io(format!("Failed to write dataset CSV: {e}"));

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(["t", "rv", "rv_err"]).map_err(io_err)?;
    for ((t, rv), err) in data.t().iter().zip(data.rv()).zip(data.rv_err()) {
        writer
            .write_record([t.to_string(), rv.to_string(), err.to_string()])
            .map_err(io_err)?;
    }
    writer
        .flush()
        .map_err(|e| EstimateError::Io(format!("Failed to flush dataset CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::ingest::read_dataset;

    #[test]
    fn samples_csv_has_header_and_rows() {
        let m = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.5]);
        let mut buf = Vec::new();
        write_samples(&mut buf, &m, &["a".to_string(), "b".to_string()]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "a,b");
        assert_eq!(lines.len(), 3);
        let last: Vec<f64> = lines[2].split(',').map(|s| s.parse().unwrap()).collect();
        assert_eq!(last, vec![3.0, 4.5]);
    }

    #[test]
    fn samples_csv_rejects_name_mismatch() {
        let m = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        assert!(write_samples(Vec::new(), &m, &["a".to_string()]).is_err());
    }

    #[test]
    fn dataset_csv_reads_back() {
        let d = Dataset::new(vec![1.5, 2.5], vec![0.1, -0.25], vec![0.01, 0.02]).unwrap();
        let path = std::env::temp_dir().join(format!("rv_orbits_dataset_{}.csv", std::process::id()));
        write_dataset_csv(&path, &d).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(read_dataset(text.as_bytes()).unwrap().dataset, d);
    }
}
