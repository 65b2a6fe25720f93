//! Batch Runner
//!
//! Repeats the model over every sweep combination, fanning runs out over a
//! rayon pool, and keeps the reporter rows the collection period asks for.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use pd_records::{ModelParams, ModelVars};

use crate::batch::sweep::{Combination, ParamName, ParamValue, ParameterSweep, SweepError};
use crate::model::{ModelError, PdGrid};

/// Errors raised by a batch run
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    #[error("iterations must be at least 1")]
    NoIterations,
    #[error("data collection period must be -1 or positive, got {0}")]
    InvalidPeriod(i64),
    #[error("sweep produced no combinations")]
    EmptySweep,
    #[error(transparent)]
    Sweep(#[from] SweepError),
    #[error("run {run_id} failed: {source}")]
    Model {
        run_id: usize,
        #[source]
        source: ModelError,
    },
    #[error("could not build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// How a batch is executed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchSettings {
    /// Repetitions of every combination
    pub iterations: u32,
    /// Step budget per run
    pub max_steps: u64,
    /// -1 keeps only the final step; n keeps every n-th step and the final one
    pub data_collection_period: i64,
    /// Run `r` is seeded with `seed + r`; falls back to the model seed, then
    /// entropy
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Worker threads; rayon's default when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jobs: Option<usize>,
}

impl Default for BatchSettings {
    fn default() -> Self {
        Self {
            iterations: 50,
            max_steps: 25,
            data_collection_period: -1,
            seed: None,
            jobs: None,
        }
    }
}

impl BatchSettings {
    pub fn validate(&self) -> Result<(), BatchError> {
        if self.iterations == 0 {
            return Err(BatchError::NoIterations);
        }
        if self.data_collection_period == 0 || self.data_collection_period < -1 {
            return Err(BatchError::InvalidPeriod(self.data_collection_period));
        }
        Ok(())
    }

    /// Seed for a given run id
    pub fn run_seed(&self, run_id: usize) -> Option<u64> {
        self.seed.map(|base| base.wrapping_add(run_id as u64))
    }
}

/// One entry of the run list
#[derive(Debug, Clone)]
pub struct PlannedRun {
    pub run_id: usize,
    pub iteration: u32,
    pub combination: Combination,
}

/// One kept reporter row of one run
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRecord {
    pub run_id: usize,
    pub iteration: u32,
    pub step: u64,
    /// Swept parameter values, in sweep order
    pub parameters: Vec<(ParamName, ParamValue)>,
    pub vars: ModelVars,
}

/// Everything a batch produced
#[derive(Debug, Clone)]
pub struct BatchResults {
    /// Swept parameter names, in column order
    pub parameter_names: Vec<&'static str>,
    pub combinations: usize,
    pub runs: usize,
    pub records: Vec<BatchRecord>,
}

/// Iteration outer, combination inner; run ids count up from 0
pub fn plan_runs(sweep: &ParameterSweep, iterations: u32) -> Vec<PlannedRun> {
    let combinations = sweep.combinations();
    let mut runs = Vec::with_capacity(combinations.len() * iterations as usize);
    for iteration in 0..iterations {
        for combination in &combinations {
            runs.push(PlannedRun {
                run_id: runs.len(),
                iteration,
                combination: combination.clone(),
            });
        }
    }
    runs
}

/// Indices of the rows to keep out of `row_count` collected rows
pub fn kept_rows(row_count: usize, period: i64) -> Vec<usize> {
    if row_count == 0 {
        return Vec::new();
    }
    let last = row_count - 1;
    if period < 0 {
        return vec![last];
    }
    let period = period as usize;
    let mut rows: Vec<usize> = (0..row_count).step_by(period).collect();
    if rows.last() != Some(&last) {
        rows.push(last);
    }
    rows
}

/// Run one planned configuration to completion
pub fn execute_run(
    run: &PlannedRun,
    base: &ModelParams,
    settings: &BatchSettings,
) -> Result<Vec<BatchRecord>, BatchError> {
    let mut params = run.combination.apply(base)?;
    // A seed in the base parameters stands in for a missing batch seed
    params.seed = settings
        .run_seed(run.run_id)
        .or_else(|| base.seed.map(|seed| seed.wrapping_add(run.run_id as u64)));

    let mut model = PdGrid::new(params).map_err(|source| BatchError::Model {
        run_id: run.run_id,
        source,
    })?;
    while model.running() && model.current_step() < settings.max_steps {
        model.step();
    }

    let rows = model.model_vars();
    Ok(kept_rows(rows.len(), settings.data_collection_period)
        .into_iter()
        .map(|index| BatchRecord {
            run_id: run.run_id,
            iteration: run.iteration,
            step: rows[index].step,
            parameters: run.combination.values.clone(),
            vars: rows[index].clone(),
        })
        .collect())
}

/// Run the whole sweep, each combination layered over `base`
///
/// Results come back in run-list order regardless of worker count.
pub fn batch_run(
    sweep: &ParameterSweep,
    base: &ModelParams,
    settings: &BatchSettings,
) -> Result<BatchResults, BatchError> {
    settings.validate()?;
    if sweep.is_empty() {
        return Err(BatchError::EmptySweep);
    }

    let runs = plan_runs(sweep, settings.iterations);
    let total = runs.len();
    info!(
        combinations = sweep.len(),
        iterations = settings.iterations,
        runs = total,
        max_steps = settings.max_steps,
        "starting batch"
    );

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(jobs) = settings.jobs {
        builder = builder.num_threads(jobs.max(1));
    }
    let pool = builder.build()?;

    let finished = AtomicUsize::new(0);
    let report_every = (total / 10).max(1);
    let per_run: Vec<Vec<BatchRecord>> = pool.install(|| {
        runs.par_iter()
            .map(|run| {
                let records = execute_run(run, base, settings)?;
                let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
                if done % report_every == 0 || done == total {
                    info!("{}/{} runs complete", done, total);
                }
                Ok(records)
            })
            .collect::<Result<Vec<_>, BatchError>>()
    })?;

    let records: Vec<BatchRecord> = per_run.into_iter().flatten().collect();
    info!(rows = records.len(), "batch finished");

    Ok(BatchResults {
        parameter_names: sweep.names(),
        combinations: sweep.len(),
        runs: total,
        records,
    })
}
