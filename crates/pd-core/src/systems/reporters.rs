//! Reporter System
//!
//! Model-level measurements collected once at creation and after every step.

use bevy_ecs::prelude::*;

use pd_records::ModelVars;

use crate::components::{Alive, FriendlyNeighbors, ModelState, Score, Strategy};

/// Resource: every reporter row collected so far, indexed by step
#[derive(Resource, Debug, Default)]
pub struct DataCollector {
    rows: Vec<ModelVars>,
}

impl DataCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, vars: ModelVars) {
        self.rows.push(vars);
    }

    pub fn rows(&self) -> &[ModelVars] {
        &self.rows
    }

    pub fn latest(&self) -> Option<&ModelVars> {
        self.rows.last()
    }
}

/// Total score over twice the population, or over 1 when empty
pub fn mean_score<'a>(scores: impl IntoIterator<Item = &'a Score>) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for score in scores {
        total += score.0;
        count += 1;
    }
    let denominator = if count == 0 { 1.0 } else { 2.0 * count as f64 };
    total / denominator
}

/// Evaluate all reporters over a population
pub fn measure<'a>(
    step: u64,
    agents: impl IntoIterator<Item = (&'a Strategy, &'a Score, &'a Alive, &'a FriendlyNeighbors)>,
) -> ModelVars {
    let mut vars = ModelVars {
        step,
        ..ModelVars::default()
    };
    let mut scores = Vec::new();

    for (strategy, score, alive, friendly) in agents {
        scores.push(*score);
        if !alive.is_alive() {
            continue;
        }
        vars.is_alive += 1;
        if strategy.is_cooperating() {
            vars.cooperating += 1;
            vars.altruism += friendly.0 as f64 / 2.0;
        } else {
            vars.defecting += 1;
        }
    }

    let alive = vars.is_alive.max(1) as f64;
    vars.proportion = vars.cooperating as f64 / alive * 100.0;
    vars.mean_score = mean_score(&scores);
    vars
}

/// System: publish the model score before agents act
pub fn publish_model_score(mut state: ResMut<ModelState>, scores: Query<&Score>) {
    state.score = mean_score(scores.iter());
}

/// System: append a reporter row for the current step
pub fn collect_model_vars(
    state: Res<ModelState>,
    mut collector: ResMut<DataCollector>,
    agents: Query<(&Strategy, &Score, &Alive, &FriendlyNeighbors)>,
) {
    let vars = measure(state.current_step, agents.iter());
    collector.record(vars);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pd_records::Move;

    fn agent(
        mv: Move,
        score: f64,
        alive: bool,
        friendly: u32,
    ) -> (Strategy, Score, Alive, FriendlyNeighbors) {
        (
            Strategy::new(mv),
            Score(score),
            Alive(alive),
            FriendlyNeighbors(friendly),
        )
    }

    #[test]
    fn test_measure_counts_alive_only() {
        let population = vec![
            agent(Move::Cooperate, 4.0, true, 3),
            agent(Move::Cooperate, 2.0, true, 1),
            agent(Move::Defect, 6.0, true, 2),
            agent(Move::Cooperate, -4.0, false, 8),
        ];
        let vars = measure(5, population.iter().map(|(s, sc, a, f)| (s, sc, a, f)));

        assert_eq!(vars.step, 5);
        assert_eq!(vars.is_alive, 3);
        assert_eq!(vars.cooperating, 2);
        assert_eq!(vars.defecting, 1);
        assert!((vars.proportion - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(vars.altruism, 2.0);
        // Dead agents still count toward the mean score
        assert_eq!(vars.mean_score, 8.0 / 8.0);
    }

    #[test]
    fn test_measure_empty_population() {
        let vars = measure(0, std::iter::empty());
        assert_eq!(vars.is_alive, 0);
        assert_eq!(vars.proportion, 0.0);
        assert_eq!(vars.mean_score, 0.0);
        assert!(vars.is_unanimous());
    }

    #[test]
    fn test_collector_keeps_order() {
        let mut collector = DataCollector::new();
        assert!(collector.latest().is_none());
        collector.record(ModelVars { step: 0, ..ModelVars::default() });
        collector.record(ModelVars { step: 1, ..ModelVars::default() });
        assert_eq!(collector.rows().len(), 2);
        assert_eq!(collector.latest().unwrap().step, 1);
    }
}
