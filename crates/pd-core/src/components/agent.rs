//! Agent Components
//!
//! Components for individual agents: position, strategy, score, liveness.

use bevy_ecs::prelude::*;
use pd_records::Move;

/// Marker component identifying an entity as an agent
#[derive(Component, Debug, Clone, Default)]
pub struct Agent;

/// Fixed cell occupied by an agent
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPos {
    pub x: u32,
    pub y: u32,
}

impl GridPos {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// The move an agent is playing and the one it has decided on
#[derive(Component, Debug, Clone)]
pub struct Strategy {
    pub current: Move,
    /// Set by the decision half of a step, applied by the advance half
    pub next: Option<Move>,
    /// Whether the last advance switched moves
    pub changed: bool,
}

impl Strategy {
    pub fn new(initial: Move) -> Self {
        Self {
            current: initial,
            next: None,
            changed: false,
        }
    }

    /// The move neighbors see while a simultaneous step is in flight
    pub fn pending(&self) -> Move {
        self.next.unwrap_or(self.current)
    }

    pub fn is_cooperating(&self) -> bool {
        self.current.is_cooperating()
    }
}

/// Cumulative payoff
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct Score(pub f64);

/// Whether an agent still takes part in the game
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alive(pub bool);

impl Default for Alive {
    fn default() -> Self {
        Self(true)
    }
}

impl Alive {
    pub fn is_alive(&self) -> bool {
        self.0
    }
}

/// Cooperating neighbors seen at the last payoff
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FriendlyNeighbors(pub u32);

/// Cached Moore neighborhood of an agent
///
/// Both lists follow the grid's neighborhood order; `with_center` is used
/// to pick a role model, `around` to play the game.
#[derive(Component, Debug, Clone, Default)]
pub struct Neighborhood {
    pub with_center: Vec<Entity>,
    pub around: Vec<Entity>,
}

/// Bundle for spawning a complete agent
#[derive(Bundle)]
pub struct AgentBundle {
    pub agent: Agent,
    pub position: GridPos,
    pub strategy: Strategy,
    pub score: Score,
    pub alive: Alive,
    pub friendly: FriendlyNeighbors,
    pub neighborhood: Neighborhood,
}

impl AgentBundle {
    pub fn new(x: u32, y: u32, initial: Move) -> Self {
        Self {
            agent: Agent,
            position: GridPos::new(x, y),
            strategy: Strategy::new(initial),
            score: Score::default(),
            alive: Alive::default(),
            friendly: FriendlyNeighbors::default(),
            neighborhood: Neighborhood::default(),
        }
    }
}
