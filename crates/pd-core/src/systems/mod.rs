//! ECS Systems
//!
//! Systems for agent activation, reporters and steady-state detection.

pub mod activation;
pub mod reporters;
pub mod steady_state;

// Re-export commonly used systems
pub use activation::{activate_agents, Activation, Payoffs};
pub use reporters::{collect_model_vars, mean_score, measure, publish_model_score, DataCollector};
pub use steady_state::detect_steady_state;
