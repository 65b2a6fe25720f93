//! ECS Components
//!
//! All components and resources for the prisoner's dilemma grid.

pub mod agent;
pub mod grid;
pub mod state;

pub use agent::*;
pub use grid::*;
pub use state::*;
