//! Moves and Payoffs
//!
//! The two strategies an agent can play and the reward table keyed on
//! (own move, neighbor move).

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single prisoner's dilemma move
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Move {
    #[serde(rename = "C")]
    Cooperate,
    #[serde(rename = "D")]
    Defect,
}

impl Move {
    /// One-letter code used in exports and snapshots
    pub fn code(self) -> &'static str {
        match self {
            Move::Cooperate => "C",
            Move::Defect => "D",
        }
    }

    pub fn is_cooperating(self) -> bool {
        matches!(self, Move::Cooperate)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Reward for one pairwise encounter, keyed on (my_move, other_move)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayoffMatrix {
    /// (C, C)
    pub cooperation_reward: f64,
    /// (C, D): the sucker's payoff
    pub defected_reward: f64,
    /// (D, C): the temptation
    pub defection_reward: f64,
    /// (D, D)
    pub mutual_defection_reward: f64,
}

impl PayoffMatrix {
    pub fn payoff(&self, own: Move, other: Move) -> f64 {
        match (own, other) {
            (Move::Cooperate, Move::Cooperate) => self.cooperation_reward,
            (Move::Cooperate, Move::Defect) => self.defected_reward,
            (Move::Defect, Move::Cooperate) => self.defection_reward,
            (Move::Defect, Move::Defect) => self.mutual_defection_reward,
        }
    }
}

impl Default for PayoffMatrix {
    fn default() -> Self {
        Self {
            cooperation_reward: 1.0,
            defected_reward: -0.5,
            defection_reward: 1.5,
            mutual_defection_reward: -1.0,
        }
    }
}
