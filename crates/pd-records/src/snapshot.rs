//! Grid Snapshots
//!
//! Serializable picture of the whole grid, used by the dashboard and for
//! end-of-run JSON dumps.

use serde::{Deserialize, Serialize};

use crate::moves::Move;
use crate::params::ScheduleType;

/// One cell of the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub x: u32,
    pub y: u32,
    #[serde(rename = "move")]
    pub current_move: Move,
    pub score: f64,
    pub alive: bool,
    #[serde(default)]
    pub friendly_neighbors: u32,
}

/// Full grid state at a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    pub width: u32,
    pub height: u32,
    pub step: u64,
    pub schedule_type: ScheduleType,
    pub running: bool,
    /// Cells in row-major order (index = y * width + x)
    pub cells: Vec<CellSnapshot>,
}

impl GridSnapshot {
    pub fn cell(&self, x: u32, y: u32) -> Option<&CellSnapshot> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get((y * self.width + x) as usize)
    }

    pub fn cooperating(&self) -> usize {
        self.cells
            .iter()
            .filter(|cell| cell.alive && cell.current_move.is_cooperating())
            .count()
    }
}
