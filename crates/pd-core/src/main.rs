//! Single Run CLI
//!
//! Runs one spatial prisoner's dilemma model and writes its reporter rows
//! and final grid.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use pd_core::output::{write_model_vars_csv, write_snapshot};
use pd_core::{logging, PdGrid};
use pd_records::{ModelParams, ScheduleType};

/// Command line arguments for a single model run
#[derive(Parser, Debug)]
#[command(name = "pd_grid")]
#[command(about = "Run one spatial prisoner's dilemma model")]
#[command(allow_negative_numbers = true)]
struct Args {
    #[arg(long, default_value_t = 50)]
    width: u32,

    #[arg(long, default_value_t = 50)]
    height: u32,

    /// Sequential, Random or Simultaneous
    #[arg(long, default_value_t = ScheduleType::Random)]
    schedule: ScheduleType,

    /// Payoff for mutual cooperation
    #[arg(long, default_value_t = 1.0)]
    cooperation_reward: f64,

    /// Payoff for cooperating against a defector
    #[arg(long, default_value_t = -0.5)]
    defected_reward: f64,

    /// Payoff for defecting against a cooperator
    #[arg(long, default_value_t = 1.5)]
    defection_reward: f64,

    /// Payoff for mutual defection
    #[arg(long, default_value_t = -1.0)]
    mutual_defection_reward: f64,

    /// Random seed for reproducibility
    #[arg(long)]
    seed: Option<u64>,

    /// Number of steps to simulate
    #[arg(long, default_value_t = 25)]
    steps: u64,

    /// Agents whose score falls below this die
    #[arg(long)]
    survival_threshold: Option<f64>,

    /// Stop early once the population has converged
    #[arg(long)]
    halt_on_steady_state: bool,

    /// Per-step reporter CSV
    #[arg(long, default_value = "output/model_vars.csv")]
    vars_csv: PathBuf,

    /// Final grid as JSON
    #[arg(long)]
    snapshot: Option<PathBuf>,

    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn params(&self) -> ModelParams {
        ModelParams {
            width: self.width,
            height: self.height,
            schedule_type: self.schedule,
            cooperation_reward: self.cooperation_reward,
            defected_reward: self.defected_reward,
            defection_reward: self.defection_reward,
            mutual_defection_reward: self.mutual_defection_reward,
            seed: self.seed,
            survival_threshold: self.survival_threshold,
            halt_on_steady_state: self.halt_on_steady_state,
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(&args.log_level);

    let mut model = match PdGrid::new(args.params()) {
        Ok(model) => model,
        Err(e) => {
            error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    println!("Spatial Prisoner's Dilemma");
    println!("==========================");
    println!("Grid: {}x{}", args.width, args.height);
    println!("Scheduler: {}", args.schedule);
    println!("Seed: {}", model.seed());
    println!("Steps: {}", args.steps);
    println!();

    let report_every = (args.steps / 5).max(1);
    while model.running() && model.current_step() < args.steps {
        model.step();
        let step = model.current_step();
        if step % report_every == 0 {
            if let Some(vars) = model.latest_vars() {
                info!(
                    step,
                    cooperating = vars.cooperating,
                    defecting = vars.defecting,
                    "progress"
                );
            }
        }
    }
    if !model.running() {
        info!(step = model.current_step(), "model halted at steady state");
    }

    if let Err(e) = write_model_vars_csv(&args.vars_csv, model.model_vars()) {
        error!("Could not write {}: {}", args.vars_csv.display(), e);
        return ExitCode::FAILURE;
    }
    info!("Wrote {}", args.vars_csv.display());

    if let Some(path) = &args.snapshot {
        let snapshot = model.snapshot();
        if let Err(e) = write_snapshot(path, &snapshot) {
            error!("Could not write {}: {}", path.display(), e);
            return ExitCode::FAILURE;
        }
        info!("Wrote {}", path.display());
    }

    if let Some(vars) = model.latest_vars() {
        println!();
        println!("Final step {}", vars.step);
        println!("  Cooperating: {}", vars.cooperating);
        println!("  Defecting:   {}", vars.defecting);
        println!("  Proportion:  {:.2}%", vars.proportion);
        println!("  Mean score:  {:.3}", vars.mean_score);
    }
    ExitCode::SUCCESS
}
