//! Model Parameters
//!
//! Everything needed to construct one model run.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::moves::PayoffMatrix;

/// Agent activation regime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ScheduleType {
    /// Agents act one at a time in creation order
    Sequential,
    /// Agents act one at a time, order reshuffled every step
    #[default]
    Random,
    /// Every agent decides, then every agent applies its decision
    Simultaneous,
}

impl ScheduleType {
    pub const ALL: [ScheduleType; 3] = [
        ScheduleType::Sequential,
        ScheduleType::Random,
        ScheduleType::Simultaneous,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ScheduleType::Sequential => "Sequential",
            ScheduleType::Random => "Random",
            ScheduleType::Simultaneous => "Simultaneous",
        }
    }

    /// The next choice after this one, wrapping around
    pub fn cycle(self) -> Self {
        match self {
            ScheduleType::Sequential => ScheduleType::Random,
            ScheduleType::Random => ScheduleType::Simultaneous,
            ScheduleType::Simultaneous => ScheduleType::Sequential,
        }
    }
}

impl fmt::Display for ScheduleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScheduleType {
    type Err = ParamsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ScheduleType::ALL
            .into_iter()
            .find(|schedule| schedule.name() == s)
            .ok_or_else(|| ParamsError::UnknownScheduleType(s.to_string()))
    }
}

/// Errors raised while validating parameters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamsError {
    #[error("unknown schedule type '{0}' (expected Sequential, Random or Simultaneous)")]
    UnknownScheduleType(String),
    #[error("grid dimensions must be positive, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },
}

/// Construction parameters for a single model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    pub width: u32,
    pub height: u32,
    pub schedule_type: ScheduleType,
    pub cooperation_reward: f64,
    pub defected_reward: f64,
    pub defection_reward: f64,
    pub mutual_defection_reward: f64,
    /// Seed for the model RNG; drawn from entropy when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Agents whose cumulative score drops below this die
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survival_threshold: Option<f64>,
    /// Stop the model once the population has converged
    pub halt_on_steady_state: bool,
}

impl Default for ModelParams {
    fn default() -> Self {
        let payoff = PayoffMatrix::default();
        Self {
            width: 50,
            height: 50,
            schedule_type: ScheduleType::default(),
            cooperation_reward: payoff.cooperation_reward,
            defected_reward: payoff.defected_reward,
            defection_reward: payoff.defection_reward,
            mutual_defection_reward: payoff.mutual_defection_reward,
            seed: None,
            survival_threshold: None,
            halt_on_steady_state: false,
        }
    }
}

impl ModelParams {
    pub fn payoff_matrix(&self) -> PayoffMatrix {
        PayoffMatrix {
            cooperation_reward: self.cooperation_reward,
            defected_reward: self.defected_reward,
            defection_reward: self.defection_reward,
            mutual_defection_reward: self.mutual_defection_reward,
        }
    }

    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.width == 0 || self.height == 0 {
            return Err(ParamsError::EmptyGrid {
                width: self.width,
                height: self.height,
            });
        }
        Ok(())
    }

    pub fn agent_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}
