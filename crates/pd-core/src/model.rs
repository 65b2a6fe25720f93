//! Model
//!
//! `PdGrid` owns the ECS world and the per-step schedule, and exposes the
//! operations a run needs: step, run, inspect.

use bevy_ecs::prelude::*;
use rand::rngs::SmallRng;
use rand::SeedableRng;
use tracing::debug;

use pd_records::{CellSnapshot, GridSnapshot, ModelParams, ModelVars, Move, ParamsError};

use crate::components::{Alive, FriendlyNeighbors, GridPos, ModelState, Score, Strategy};
use crate::setup::{random_move, spawn_agents};
use crate::systems::{
    activate_agents, collect_model_vars, detect_steady_state, publish_model_score, Activation,
    DataCollector, Payoffs,
};
use crate::ModelRng;

/// Errors raised while building a model
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("invalid model parameters: {0}")]
    Params(#[from] ParamsError),
}

/// Spatial iterated prisoner's dilemma on a toroidal grid
pub struct PdGrid {
    world: World,
    schedule: Schedule,
    params: ModelParams,
    seed: u64,
}

impl PdGrid {
    /// Create a model with random starting moves
    pub fn new(params: ModelParams) -> Result<Self, ModelError> {
        params.validate()?;
        let seed = params.seed.unwrap_or_else(rand::random);
        let mut rng = SmallRng::seed_from_u64(seed);

        let mut world = World::new();
        let order = spawn_agents(&mut world, params.width, params.height, |_, _| {
            random_move(&mut rng)
        });
        Ok(Self::assemble(world, order, rng, params, seed))
    }

    /// Create a model with chosen starting moves
    pub fn from_layout(
        params: ModelParams,
        layout: impl FnMut(u32, u32) -> Move,
    ) -> Result<Self, ModelError> {
        params.validate()?;
        let seed = params.seed.unwrap_or_else(rand::random);
        let rng = SmallRng::seed_from_u64(seed);

        let mut world = World::new();
        let order = spawn_agents(&mut world, params.width, params.height, layout);
        Ok(Self::assemble(world, order, rng, params, seed))
    }

    fn assemble(
        mut world: World,
        order: Vec<Entity>,
        rng: SmallRng,
        params: ModelParams,
        seed: u64,
    ) -> Self {
        world.insert_resource(ModelRng(rng));
        world.insert_resource(Payoffs(params.payoff_matrix()));
        world.insert_resource(Activation::new(params.schedule_type, order));
        world.insert_resource(ModelState::new(
            params.halt_on_steady_state,
            params.survival_threshold,
        ));
        world.insert_resource(DataCollector::new());

        // Step 0 row
        let mut initial = Schedule::default();
        initial.add_systems(collect_model_vars);
        initial.run(&mut world);

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                publish_model_score,
                activate_agents,
                collect_model_vars,
                detect_steady_state,
            )
                .chain(),
        );

        debug!(
            width = params.width,
            height = params.height,
            schedule = %params.schedule_type,
            seed,
            "model created"
        );

        Self {
            world,
            schedule,
            params,
            seed,
        }
    }

    /// Advance the model by one step
    pub fn step(&mut self) {
        self.world.resource_mut::<ModelState>().advance_step();
        self.schedule.run(&mut self.world);
    }

    /// Advance the model by `steps` steps
    pub fn run(&mut self, steps: u64) {
        for _ in 0..steps {
            self.step();
        }
    }

    pub fn running(&self) -> bool {
        self.world.resource::<ModelState>().running
    }

    /// Whether the last step was a steady state
    pub fn converged(&self) -> bool {
        self.world.resource::<ModelState>().converged
    }

    pub fn current_step(&self) -> u64 {
        self.world.resource::<ModelState>().current_step
    }

    /// Mean score published at the start of the last step
    pub fn score(&self) -> f64 {
        self.world.resource::<ModelState>().score
    }

    pub fn params(&self) -> &ModelParams {
        &self.params
    }

    /// The seed actually used, drawn from entropy when none was given
    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// All reporter rows, one per step starting at step 0
    pub fn model_vars(&self) -> &[ModelVars] {
        self.world.resource::<DataCollector>().rows()
    }

    pub fn latest_vars(&self) -> Option<&ModelVars> {
        self.world.resource::<DataCollector>().latest()
    }

    /// Picture of every cell, row-major
    pub fn snapshot(&mut self) -> GridSnapshot {
        let width = self.params.width;
        let height = self.params.height;
        let mut cells: Vec<Option<CellSnapshot>> = vec![None; self.params.agent_count()];

        let mut query = self
            .world
            .query::<(&GridPos, &Strategy, &Score, &Alive, &FriendlyNeighbors)>();
        for (position, strategy, score, alive, friendly) in query.iter(&self.world) {
            let index = (position.y * width + position.x) as usize;
            cells[index] = Some(CellSnapshot {
                x: position.x,
                y: position.y,
                current_move: strategy.current,
                score: score.0,
                alive: alive.is_alive(),
                friendly_neighbors: friendly.0,
            });
        }

        let state = self.world.resource::<ModelState>();
        GridSnapshot {
            width,
            height,
            step: state.current_step,
            schedule_type: self.params.schedule_type,
            running: state.running,
            cells: cells.into_iter().flatten().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_records::ScheduleType;

    fn small_params(schedule_type: ScheduleType) -> ModelParams {
        ModelParams {
            width: 3,
            height: 3,
            schedule_type,
            seed: Some(11),
            ..ModelParams::default()
        }
    }

    #[test]
    fn test_new_collects_step_zero() {
        let model = PdGrid::new(small_params(ScheduleType::Random)).unwrap();
        assert_eq!(model.current_step(), 0);
        assert_eq!(model.model_vars().len(), 1);
        let vars = model.latest_vars().unwrap();
        assert_eq!(vars.step, 0);
        assert_eq!(vars.is_alive, 9);
        assert_eq!(vars.cooperating + vars.defecting, 9);
        assert_eq!(vars.altruism, 0.0);
        assert!(model.running());
        assert_eq!(model.seed(), 11);
    }

    #[test]
    fn test_rejects_empty_grid() {
        let params = ModelParams {
            height: 0,
            ..ModelParams::default()
        };
        assert!(matches!(PdGrid::new(params), Err(ModelError::Params(_))));
    }

    #[test]
    fn test_all_cooperators_after_one_step() {
        let mut model =
            PdGrid::from_layout(small_params(ScheduleType::Sequential), |_, _| Move::Cooperate)
                .unwrap();
        model.step();

        let vars = model.latest_vars().unwrap();
        assert_eq!(vars.step, 1);
        assert_eq!(vars.cooperating, 9);
        assert_eq!(vars.proportion, 100.0);
        assert_eq!(vars.altruism, 36.0);
        assert_eq!(vars.mean_score, 72.0 / 18.0);
        // Published before the step ran
        assert_eq!(model.score(), 0.0);
        assert!(model.converged());
        assert!(model.running());

        model.step();
        assert_eq!(model.score(), 4.0);
    }

    #[test]
    fn test_simultaneous_lone_defector() {
        let params = small_params(ScheduleType::Simultaneous);
        let mut model = PdGrid::from_layout(params, |x, y| {
            if (x, y) == (1, 1) {
                Move::Defect
            } else {
                Move::Cooperate
            }
        })
        .unwrap();
        model.step();

        let vars = model.latest_vars().unwrap().clone();
        assert_eq!(vars.cooperating, 8);
        assert_eq!(vars.defecting, 1);
        assert!((vars.proportion - 800.0 / 9.0).abs() < 1e-9);
        assert_eq!(vars.altruism, 28.0);

        let snapshot = model.snapshot();
        assert_eq!(snapshot.cell(2, 2).unwrap().current_move, Move::Defect);
        assert_eq!(snapshot.cell(2, 2).unwrap().score, 12.0);
        assert_eq!(snapshot.cell(1, 1).unwrap().current_move, Move::Cooperate);
    }

    #[test]
    fn test_halts_on_steady_state_when_enabled() {
        let params = ModelParams {
            halt_on_steady_state: true,
            ..small_params(ScheduleType::Sequential)
        };
        let mut model = PdGrid::from_layout(params, |_, _| Move::Defect).unwrap();
        model.step();
        assert!(model.converged());
        assert!(!model.running());
    }

    #[test]
    fn test_survival_threshold_kills_everyone() {
        let params = ModelParams {
            survival_threshold: Some(100.0),
            ..small_params(ScheduleType::Random)
        };
        let mut model = PdGrid::new(params).unwrap();
        model.step();
        let vars = model.latest_vars().unwrap();
        assert_eq!(vars.is_alive, 0);
        assert_eq!(vars.proportion, 0.0);
        assert!(model.snapshot().cells.iter().all(|cell| !cell.alive));
    }

    #[test]
    fn test_snapshot_covers_grid() {
        let mut model = PdGrid::new(ModelParams {
            width: 4,
            height: 2,
            seed: Some(3),
            ..ModelParams::default()
        })
        .unwrap();
        model.run(2);
        let snapshot = model.snapshot();
        assert_eq!(snapshot.cells.len(), 8);
        assert_eq!(snapshot.step, 2);
        assert_eq!(snapshot.cell(3, 1).unwrap().x, 3);
        assert_eq!(snapshot.cooperating() as u32, model.latest_vars().unwrap().cooperating);
    }
}
