//! Spreadsheet Export
//!
//! CSV writers for batch results and single-run reporter tables.

use std::fs;
use std::path::Path;

use pd_records::ModelVars;

use crate::batch::BatchResults;

use super::ExportError;

/// Header row for a batch spreadsheet
///
/// The first, unnamed column is the row index.
pub fn batch_header(results: &BatchResults) -> Vec<String> {
    let mut header = vec![
        String::new(),
        "RunId".to_string(),
        "iteration".to_string(),
        "Step".to_string(),
    ];
    header.extend(results.parameter_names.iter().map(|name| name.to_string()));
    header.extend(ModelVars::COLUMNS.iter().map(|column| column.to_string()));
    header
}

/// Write batch results to any writer
pub fn write_batch<W: std::io::Write>(
    writer: W,
    results: &BatchResults,
) -> Result<(), ExportError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(batch_header(results))?;

    for (index, record) in results.records.iter().enumerate() {
        let mut row = vec![
            index.to_string(),
            record.run_id.to_string(),
            record.iteration.to_string(),
            record.step.to_string(),
        ];
        row.extend(record.parameters.iter().map(|(_, value)| value.to_string()));
        row.extend(record.vars.cells());
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Write batch results to `dir/file_name`, creating `dir` if needed
pub fn write_batch_csv(
    dir: &Path,
    file_name: &str,
    results: &BatchResults,
) -> Result<std::path::PathBuf, ExportError> {
    fs::create_dir_all(dir)?;
    let path = dir.join(file_name);
    let file = fs::File::create(&path)?;
    write_batch(file, results)?;
    Ok(path)
}

/// Write one run's reporter rows, one per step
pub fn write_model_vars_csv(path: &Path, rows: &[ModelVars]) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut csv_writer = csv::Writer::from_path(path)?;
    let mut header = vec!["Step".to_string()];
    header.extend(ModelVars::COLUMNS.iter().map(|column| column.to_string()));
    csv_writer.write_record(&header)?;

    for vars in rows {
        let mut row = vec![vars.step.to_string()];
        row.extend(vars.cells());
        csv_writer.write_record(&row)?;
    }

    csv_writer.flush()?;
    Ok(())
}
