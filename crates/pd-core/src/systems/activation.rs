//! Activation System
//!
//! Runs every agent's decision and payoff for one step, under the
//! activation regime chosen for the model.
//!
//! A step has two halves per agent:
//! - *decide*: copy the move of the highest-scoring alive agent in the
//!   neighborhood, the agent itself included (ties go to the first one in
//!   neighborhood order);
//! - *advance*: adopt that move and add the payoff against every alive
//!   neighbor.
//!
//! Sequential and Random regimes run both halves back to back for each
//! agent, and an agent that falls below the survival threshold dies at once.
//! The Simultaneous regime runs every decision before any advance, scores
//! against the neighbours' pending moves, and applies deaths only after the
//! whole advance pass.

use bevy_ecs::prelude::*;
use rand::seq::SliceRandom;
use tracing::debug;

use pd_records::{Move, PayoffMatrix, ScheduleType};

use crate::components::{Alive, FriendlyNeighbors, ModelState, Neighborhood, Score, Strategy};
use crate::ModelRng;

/// Resource: payoff table for the run
#[derive(Resource, Debug, Clone, Copy)]
pub struct Payoffs(pub PayoffMatrix);

/// Resource: activation regime and agent order
#[derive(Resource, Debug, Clone)]
pub struct Activation {
    pub schedule_type: ScheduleType,
    /// Creation order; reshuffled in place by the Random regime
    pub order: Vec<Entity>,
}

impl Activation {
    pub fn new(schedule_type: ScheduleType, order: Vec<Entity>) -> Self {
        Self {
            schedule_type,
            order,
        }
    }
}

/// Which neighbor move the payoff is computed against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MoveSource {
    Current,
    Pending,
}

type AgentQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static Neighborhood,
        &'static mut Strategy,
        &'static mut Score,
        &'static mut Alive,
        &'static mut FriendlyNeighbors,
    ),
>;

/// System: activate all agents once
pub fn activate_agents(
    mut activation: ResMut<Activation>,
    mut rng: ResMut<ModelRng>,
    payoffs: Res<Payoffs>,
    state: Res<ModelState>,
    mut agents: AgentQuery,
) {
    for (_, mut strategy, _, _, _) in agents.iter_mut() {
        strategy.changed = false;
    }

    let schedule_type = activation.schedule_type;
    if schedule_type == ScheduleType::Random {
        activation.order.shuffle(&mut rng.0);
    }

    let mut deaths = 0usize;
    match schedule_type {
        ScheduleType::Sequential | ScheduleType::Random => {
            for &entity in &activation.order {
                decide(entity, &mut agents);
                if advance(entity, MoveSource::Current, &payoffs.0, &state, &mut agents) {
                    kill(entity, &mut agents);
                    deaths += 1;
                }
            }
        }
        ScheduleType::Simultaneous => {
            for &entity in &activation.order {
                decide(entity, &mut agents);
            }
            let mut fatal = Vec::new();
            for &entity in &activation.order {
                if advance(entity, MoveSource::Pending, &payoffs.0, &state, &mut agents) {
                    fatal.push(entity);
                }
            }
            deaths = fatal.len();
            for entity in fatal {
                kill(entity, &mut agents);
            }
        }
    }

    if deaths > 0 {
        debug!(step = state.current_step, deaths, "agents fell below survival threshold");
    }
}

/// Pick the move to play next from the best-scoring alive neighbor
fn decide(entity: Entity, agents: &mut AgentQuery) {
    let Ok((neighborhood, _, _, alive, _)) = agents.get(entity) else {
        return;
    };
    if !alive.is_alive() {
        return;
    }

    let mut best: Option<(f64, Move)> = None;
    for &other in &neighborhood.with_center {
        let Ok((_, strategy, score, alive, _)) = agents.get(other) else {
            continue;
        };
        if !alive.is_alive() {
            continue;
        }
        if best.map_or(true, |(best_score, _)| score.0 > best_score) {
            best = Some((score.0, strategy.current));
        }
    }

    if let Some((_, chosen)) = best {
        if let Ok((_, mut strategy, _, _, _)) = agents.get_mut(entity) {
            strategy.next = Some(chosen);
        }
    }
}

/// Apply the decided move and collect payoffs; returns true if the new
/// score is fatal
fn advance(
    entity: Entity,
    source: MoveSource,
    payoffs: &PayoffMatrix,
    state: &ModelState,
    agents: &mut AgentQuery,
) -> bool {
    let Ok((neighborhood, strategy, _, alive, _)) = agents.get(entity) else {
        return false;
    };
    if !alive.is_alive() {
        return false;
    }

    let own = strategy.pending();
    let mut gained = 0.0;
    let mut friendly = 0u32;
    for &other in &neighborhood.around {
        let Ok((_, neighbor, _, alive, _)) = agents.get(other) else {
            continue;
        };
        if !alive.is_alive() {
            continue;
        }
        let theirs = match source {
            MoveSource::Current => neighbor.current,
            MoveSource::Pending => neighbor.pending(),
        };
        gained += payoffs.payoff(own, theirs);
        if theirs.is_cooperating() {
            friendly += 1;
        }
    }

    let Ok((_, mut strategy, mut score, _, mut friendly_neighbors)) = agents.get_mut(entity)
    else {
        return false;
    };
    strategy.changed = strategy.current != own;
    strategy.current = own;
    score.0 += gained;
    friendly_neighbors.0 = friendly;

    state.is_fatal(score.0)
}

fn kill(entity: Entity, agents: &mut AgentQuery) {
    if let Ok((_, _, _, mut alive, _)) = agents.get_mut(entity) {
        alive.0 = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    use crate::setup::spawn_agents;

    fn build_world(
        size: u32,
        schedule_type: ScheduleType,
        state: ModelState,
        layout: impl FnMut(u32, u32) -> Move,
    ) -> (World, Vec<Entity>) {
        let mut world = World::new();
        let order = spawn_agents(&mut world, size, size, layout);
        world.insert_resource(Activation::new(schedule_type, order.clone()));
        world.insert_resource(ModelRng(SmallRng::seed_from_u64(1)));
        world.insert_resource(Payoffs(PayoffMatrix::default()));
        world.insert_resource(state);
        (world, order)
    }

    fn run_once(world: &mut World) {
        let mut schedule = Schedule::default();
        schedule.add_systems(activate_agents);
        schedule.run(world);
    }

    #[test]
    fn test_all_cooperators_stay_cooperating() {
        let (mut world, order) =
            build_world(3, ScheduleType::Sequential, ModelState::default(), |_, _| {
                Move::Cooperate
            });
        run_once(&mut world);

        for entity in order {
            let strategy = world.get::<Strategy>(entity).unwrap();
            assert_eq!(strategy.current, Move::Cooperate);
            assert!(!strategy.changed);
            assert_eq!(world.get::<Score>(entity).unwrap().0, 8.0);
            assert_eq!(world.get::<FriendlyNeighbors>(entity).unwrap().0, 8);
        }
    }

    #[test]
    fn test_simultaneous_scores_against_pending_moves() {
        // Lone defector in the middle; every agent copies its (-1, -1)
        // neighbor on the first step because all scores are tied at zero.
        let (mut world, order) =
            build_world(3, ScheduleType::Simultaneous, ModelState::default(), |x, y| {
                if (x, y) == (1, 1) {
                    Move::Defect
                } else {
                    Move::Cooperate
                }
            });
        run_once(&mut world);

        let grid_index = |x: usize, y: usize| order[x * 3 + y];
        let new_defector = grid_index(2, 2);
        let old_defector = grid_index(1, 1);

        let defector = world.get::<Strategy>(new_defector).unwrap();
        assert_eq!(defector.current, Move::Defect);
        assert!(defector.changed);
        assert_eq!(world.get::<Score>(new_defector).unwrap().0, 12.0);

        let reformed = world.get::<Strategy>(old_defector).unwrap();
        assert_eq!(reformed.current, Move::Cooperate);
        assert!(reformed.changed);
        assert_eq!(world.get::<Score>(old_defector).unwrap().0, 6.5);
        assert_eq!(world.get::<FriendlyNeighbors>(old_defector).unwrap().0, 7);
    }

    #[test]
    fn test_sequential_sees_earlier_agents_this_step() {
        // Lone defector at (2, 2). On a 3x3 torus every neighborhood holds
        // the whole grid, so once (0, 0) copies the defector and scores 9.5
        // every later agent copies (0, 0) and faces one more defector.
        let (mut world, order) =
            build_world(3, ScheduleType::Sequential, ModelState::default(), |x, y| {
                if (x, y) == (2, 2) {
                    Move::Defect
                } else {
                    Move::Cooperate
                }
            });
        run_once(&mut world);

        let scores: Vec<f64> = order
            .iter()
            .map(|&entity| world.get::<Score>(entity).unwrap().0)
            .collect();
        assert_eq!(scores, vec![9.5, 7.0, 4.5, 2.0, -0.5, -3.0, -5.5, -8.0, -8.0]);
        for &entity in &order {
            assert_eq!(world.get::<Strategy>(entity).unwrap().current, Move::Defect);
        }
        assert_eq!(world.resource::<Activation>().order, order);
    }

    #[test]
    fn test_random_reshuffles_every_step() {
        let (mut world, order) =
            build_world(3, ScheduleType::Random, ModelState::default(), |_, _| {
                Move::Cooperate
            });
        run_once(&mut world);
        let first = world.resource::<Activation>().order.clone();
        run_once(&mut world);
        let second = world.resource::<Activation>().order.clone();

        assert_ne!(first, second);
        for shuffled in [&first, &second] {
            let mut sorted = shuffled.clone();
            sorted.sort();
            let mut expected = order.clone();
            expected.sort();
            assert_eq!(sorted, expected);
        }
    }

    #[test]
    fn test_simultaneous_deaths_apply_after_advance() {
        // Every agent faces eight defectors and scores -8 whatever the order
        let (mut world, order) = build_world(
            3,
            ScheduleType::Simultaneous,
            ModelState::new(false, Some(-7.5)),
            |_, _| Move::Defect,
        );
        run_once(&mut world);

        for &entity in &order {
            assert_eq!(world.get::<Score>(entity).unwrap().0, -8.0);
            assert!(!world.get::<Alive>(entity).unwrap().is_alive());
        }
    }

    #[test]
    fn test_agents_below_threshold_die() {
        let (mut world, order) = build_world(
            3,
            ScheduleType::Random,
            ModelState::new(false, Some(-5.0)),
            |_, _| Move::Defect,
        );
        run_once(&mut world);

        // The first agent to act sees eight live defectors and scores -8;
        // once it is dead later agents see fewer opponents.
        let first_dead = order
            .iter()
            .filter(|&&entity| !world.get::<Alive>(entity).unwrap().is_alive())
            .count();
        assert!(first_dead >= 1);

        // Dead agents keep their last score and stop playing
        let scores_before: Vec<f64> = order
            .iter()
            .map(|&entity| world.get::<Score>(entity).unwrap().0)
            .collect();
        let dead_before: Vec<bool> = order
            .iter()
            .map(|&entity| !world.get::<Alive>(entity).unwrap().is_alive())
            .collect();
        run_once(&mut world);
        for (i, &entity) in order.iter().enumerate() {
            if dead_before[i] {
                assert_eq!(world.get::<Score>(entity).unwrap().0, scores_before[i]);
            }
        }
    }

    #[test]
    fn test_dead_agents_are_invisible() {
        let (mut world, order) =
            build_world(3, ScheduleType::Sequential, ModelState::default(), |_, _| {
                Move::Cooperate
            });
        for &entity in &order[1..] {
            world.get_mut::<Alive>(entity).unwrap().0 = false;
        }
        run_once(&mut world);

        assert_eq!(world.get::<Score>(order[0]).unwrap().0, 0.0);
        assert_eq!(world.get::<FriendlyNeighbors>(order[0]).unwrap().0, 0);
        assert_eq!(world.get::<Score>(order[1]).unwrap().0, 0.0);
    }
}
