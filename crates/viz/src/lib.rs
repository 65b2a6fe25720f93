//! Dashboard layer: Bevy-based renderer for a live model.

pub mod canvas;
pub mod charts;
pub mod controls;
pub mod model_runner;
pub mod overlay;
pub mod plugin;

pub use plugin::DashboardPlugin;
