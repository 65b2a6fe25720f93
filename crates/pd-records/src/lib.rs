//! Shared record types for the spatial prisoner's dilemma.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for all other crates in the workspace.

pub mod moves;
pub mod params;
pub mod snapshot;
pub mod vars;

pub use moves::{Move, PayoffMatrix};
pub use params::{ModelParams, ParamsError, ScheduleType};
pub use snapshot::{CellSnapshot, GridSnapshot};
pub use vars::ModelVars;
