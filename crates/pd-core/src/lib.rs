//! Spatial Iterated Prisoner's Dilemma Engine
//!
//! Public API for the grid model, parameter sweeps and batch export.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;

pub mod batch;
pub mod components;
pub mod config;
pub mod logging;
pub mod model;
pub mod output;
pub mod setup;
pub mod systems;

pub use batch::{
    batch_run, BatchError, BatchRecord, BatchResults, BatchSettings, ParamName, ParamValue,
    ParameterSweep,
};
pub use config::{BatchConfig, ConfigError};
pub use model::{ModelError, PdGrid};

/// Seeded random number generator resource
#[derive(Resource)]
pub struct ModelRng(pub SmallRng);
