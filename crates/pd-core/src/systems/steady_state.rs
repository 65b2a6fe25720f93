//! Steady State Detection
//!
//! Marks a step as converged when the population is unanimous or when no
//! live agent switched moves, and halts the model if asked to.

use bevy_ecs::prelude::*;
use tracing::info;

use crate::components::{Alive, ModelState, Strategy};
use crate::systems::reporters::DataCollector;

/// System: evaluate convergence after reporters have run
pub fn detect_steady_state(
    mut state: ResMut<ModelState>,
    collector: Res<DataCollector>,
    agents: Query<(&Strategy, &Alive)>,
) {
    let unanimous = collector.latest().map_or(false, |vars| vars.is_unanimous());
    let frozen = agents
        .iter()
        .filter(|(_, alive)| alive.is_alive())
        .all(|(strategy, _)| !strategy.changed);

    state.converged = unanimous || frozen;

    if state.converged && state.halt_on_steady_state && state.running {
        state.running = false;
        info!(
            step = state.current_step,
            unanimous,
            frozen,
            "steady state reached, halting"
        );
    }
}
