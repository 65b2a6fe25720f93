//! Batch Manifests and Snapshots
//!
//! JSON side files describing what produced a spreadsheet, plus grid dumps.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::fs;
use std::path::Path;
use uuid::Uuid;

use pd_records::GridSnapshot;

use crate::batch::{BatchResults, BatchSettings, ParameterSweep};

use super::ExportError;

/// Record of one batch execution
#[derive(Debug, Clone, Serialize)]
pub struct BatchManifest {
    pub batch_id: Uuid,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
    pub settings: BatchSettings,
    pub sweep: ParameterSweep,
    pub combinations: usize,
    pub runs: usize,
    pub rows: usize,
    pub csv_file: String,
}

impl BatchManifest {
    pub fn new(
        started_at: DateTime<Local>,
        settings: &BatchSettings,
        sweep: &ParameterSweep,
        results: &BatchResults,
        csv_file: impl Into<String>,
    ) -> Self {
        Self {
            batch_id: Uuid::new_v4(),
            started_at,
            finished_at: Local::now(),
            settings: settings.clone(),
            sweep: sweep.clone(),
            combinations: results.combinations,
            runs: results.runs,
            rows: results.records.len(),
            csv_file: csv_file.into(),
        }
    }
}

fn write_pretty_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json)?;
    Ok(())
}

pub fn write_manifest(path: &Path, manifest: &BatchManifest) -> Result<(), ExportError> {
    write_pretty_json(path, manifest)
}

pub fn write_snapshot(path: &Path, snapshot: &GridSnapshot) -> Result<(), ExportError> {
    write_pretty_json(path, snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{ParamName, ParamValue};

    #[test]
    fn test_manifest_round_trips_through_json() {
        let sweep = ParameterSweep::new()
            .fixed(ParamName::Width, ParamValue::Int(10))
            .unwrap();
        let results = BatchResults {
            parameter_names: sweep.names(),
            combinations: 1,
            runs: 3,
            records: Vec::new(),
        };
        let manifest = BatchManifest::new(
            Local::now(),
            &BatchSettings::default(),
            &sweep,
            &results,
            "out.csv",
        );

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.manifest.json");
        write_manifest(&path, &manifest).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["runs"], 3);
        assert_eq!(value["csv_file"], "out.csv");
        assert_eq!(value["settings"]["max_steps"], 25);
        assert_eq!(value["sweep"]["axes"][0]["values"][0], 10);
        assert!(value["batch_id"].is_string());
    }
}
