//! Output Generation
//!
//! CSV spreadsheets, batch manifests and grid snapshots.

pub mod manifest;
pub mod naming;
pub mod spreadsheet;

pub use manifest::*;
pub use naming::*;
pub use spreadsheet::*;

/// Errors raised while writing output files
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
