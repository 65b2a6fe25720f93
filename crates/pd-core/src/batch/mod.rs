//! Batch Execution
//!
//! Parameter sweeps and repeated runs over them.

pub mod runner;
pub mod sweep;

pub use runner::{
    batch_run, execute_run, kept_rows, plan_runs, BatchError, BatchRecord, BatchResults,
    BatchSettings, PlannedRun,
};
pub use sweep::{arange, Axis, Combination, ParamName, ParamValue, ParameterSweep, SweepError};
