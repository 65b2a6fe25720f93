//! Batch Run CLI
//!
//! Sweeps the model over the experiment design in a TOML file and writes
//! one spreadsheet row per kept step of every run.

use chrono::Local;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use pd_core::config::DEFAULT_BATCH_PATH;
use pd_core::output::{
    manifest_file_name, model_data_file_name, write_batch_csv, write_manifest, BatchManifest,
};
use pd_core::{batch_run, logging, BatchConfig};

/// Command line arguments for a batch sweep
#[derive(Parser, Debug)]
#[command(name = "batch_run")]
#[command(about = "Sweep the prisoner's dilemma over a parameter grid")]
#[command(allow_negative_numbers = true)]
struct Args {
    /// Experiment design; built-in defaults when the file is missing
    #[arg(long, default_value = DEFAULT_BATCH_PATH)]
    config: PathBuf,

    /// Repetitions of every combination
    #[arg(long)]
    iterations: Option<u32>,

    /// Step budget per run
    #[arg(long)]
    max_steps: Option<u64>,

    /// Data collection period (-1 = final step only)
    #[arg(long)]
    period: Option<i64>,

    /// Base seed; run r uses seed + r
    #[arg(long)]
    seed: Option<u64>,

    /// Worker threads
    #[arg(long)]
    jobs: Option<usize>,

    #[arg(long)]
    output_dir: Option<PathBuf>,

    #[arg(long)]
    prefix: Option<String>,

    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn apply(&self, config: &mut BatchConfig) {
        if let Some(iterations) = self.iterations {
            config.batch.iterations = iterations;
        }
        if let Some(max_steps) = self.max_steps {
            config.batch.max_steps = max_steps;
        }
        if let Some(period) = self.period {
            config.batch.data_collection_period = period;
        }
        if self.seed.is_some() {
            config.batch.seed = self.seed;
        }
        if self.jobs.is_some() {
            config.batch.jobs = self.jobs;
        }
        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        if let Some(prefix) = &self.prefix {
            config.output.prefix = prefix.clone();
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init(&args.log_level);

    let mut config = if args.config.exists() {
        match BatchConfig::load(&args.config) {
            Ok(config) => config,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        BatchConfig::load_or_default(&args.config)
    };
    args.apply(&mut config);

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &BatchConfig) -> Result<(), Box<dyn std::error::Error>> {
    let sweep = config.parameter_sweep()?;
    let settings = &config.batch;

    println!("Prisoner's Dilemma Batch Run");
    println!("============================");
    println!("Parameters: {}", sweep.names().join(", "));
    println!("Combinations: {}", sweep.len());
    println!("Iterations: {}", settings.iterations);
    println!("Max steps: {}", settings.max_steps);
    println!();

    let started_at = Local::now();
    let results = batch_run(&sweep, &config.model, settings)?;

    let file_name = model_data_file_name(
        &config.output.prefix,
        settings.iterations,
        settings.max_steps,
        &Local::now(),
    );
    let csv_path = write_batch_csv(&config.output.dir, &file_name, &results)?;
    info!("Wrote {}", csv_path.display());

    if config.output.manifest {
        let manifest = BatchManifest::new(started_at, settings, &sweep, &results, &file_name);
        let manifest_path = config.output.dir.join(manifest_file_name(&file_name));
        write_manifest(&manifest_path, &manifest)?;
        info!(batch_id = %manifest.batch_id, "Wrote {}", manifest_path.display());
    }

    println!();
    println!("Runs: {}", results.runs);
    println!("Rows: {}", results.records.len());
    println!("Output: {}", csv_path.display());
    Ok(())
}
