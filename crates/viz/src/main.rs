//! Prisoner's Dilemma Dashboard
//!
//! Run with: cargo run -p viz
//!
//! Examples:
//!   cargo run -p viz -- --auto-start
//!   cargo run -p viz -- --seed 7 --steps-per-second 10 --max-steps 200

use bevy::prelude::*;
use clap::Parser;
use viz::model_runner::DashboardConfig;
use viz::DashboardPlugin;

/// Interactive dashboard for the spatial prisoner's dilemma
#[derive(Parser, Debug)]
#[command(name = "viz")]
#[command(about = "Interactive dashboard for the spatial prisoner's dilemma")]
struct Args {
    /// Random seed; every reset reuses it when given
    #[arg(long)]
    seed: Option<u64>,

    /// Playback speed
    #[arg(long, default_value_t = 4.0)]
    steps_per_second: f32,

    /// Start playing on launch
    #[arg(long)]
    auto_start: bool,

    /// Pause playback at this step (0 = never)
    #[arg(long, default_value_t = 0)]
    max_steps: u64,
}

fn main() {
    let args = Args::parse();

    App::new()
        .insert_resource(DashboardConfig {
            seed: args.seed,
            steps_per_second: args.steps_per_second,
            auto_start: args.auto_start,
            max_steps: args.max_steps,
        })
        .add_plugins(DashboardPlugin)
        .run();
}
