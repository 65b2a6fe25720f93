//! Model State
//!
//! Global resources describing where the model is in its run.

use bevy_ecs::prelude::*;

/// Resource: step counter, model score and halting flags
#[derive(Resource, Debug, Clone)]
pub struct ModelState {
    pub current_step: u64,
    /// Mean score published at the start of every step
    pub score: f64,
    pub running: bool,
    /// Whether the last step reached a steady state
    pub converged: bool,
    pub halt_on_steady_state: bool,
    /// Agents scoring below this die
    pub survival_threshold: Option<f64>,
}

impl ModelState {
    pub fn new(halt_on_steady_state: bool, survival_threshold: Option<f64>) -> Self {
        Self {
            current_step: 0,
            score: 0.0,
            running: true,
            converged: false,
            halt_on_steady_state,
            survival_threshold,
        }
    }

    pub fn advance_step(&mut self) {
        self.current_step += 1;
    }

    /// Whether a cumulative score is too low to survive
    pub fn is_fatal(&self, score: f64) -> bool {
        self.survival_threshold
            .map(|threshold| score < threshold)
            .unwrap_or(false)
    }
}

impl Default for ModelState {
    fn default() -> Self {
        Self::new(false, None)
    }
}
