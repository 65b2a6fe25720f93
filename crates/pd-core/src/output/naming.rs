//! File Naming
//!
//! Batch spreadsheets are named after the experiment design and the time
//! they were written.

use chrono::{DateTime, TimeZone};

/// Default model name at the front of every file
pub const DEFAULT_PREFIX: &str = "PrisonerDilemma";

/// `YYYY-MM-DD-HH-MM-SS.ffffff`, safe in file names
pub fn timestamp_suffix<Tz: TimeZone>(now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    now.format("%Y-%m-%d-%H-%M-%S%.6f").to_string()
}

/// `_iter_{iterations}_steps_{max_steps}_{timestamp}`
pub fn file_name_suffix<Tz: TimeZone>(iterations: u32, max_steps: u64, now: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "_iter_{}_steps_{}_{}",
        iterations,
        max_steps,
        timestamp_suffix(now)
    )
}

/// Spreadsheet name for a batch
pub fn model_data_file_name<Tz: TimeZone>(
    prefix: &str,
    iterations: u32,
    max_steps: u64,
    now: &DateTime<Tz>,
) -> String
where
    Tz::Offset: std::fmt::Display,
{
    format!(
        "{}_model_data{}.csv",
        prefix,
        file_name_suffix(iterations, max_steps, now)
    )
}

/// Manifest name matching a spreadsheet name
pub fn manifest_file_name(csv_file_name: &str) -> String {
    let stem = csv_file_name.strip_suffix(".csv").unwrap_or(csv_file_name);
    format!("{}.manifest.json", stem)
}
