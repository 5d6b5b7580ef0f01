use std::num::NonZeroUsize;
use std::thread;

use anyhow::{anyhow, ensure, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{validate_config, TyperConfig};
use crate::engine::generate_trajectory;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchSummary {
    pub runs: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub truncated_runs: usize,
}

#[derive(Debug, Clone, Copy)]
struct RunOutcome {
    total_time: f64,
    truncated: bool,
}

fn rng_for_run(seed: Option<u64>, run: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(run as u64)),
        None => StdRng::from_entropy(),
    }
}

/// Reduce a set of run times to descriptive statistics.
pub fn summarize(times: &[f64]) -> Option<BatchSummary> {
    if times.is_empty() {
        return None;
    }

    let n = times.len() as f64;
    let mean = times.iter().sum::<f64>() / n;
    let variance = times.iter().map(|t| (t - mean).powi(2)).sum::<f64>() / n;
    let min = times.iter().copied().fold(f64::INFINITY, f64::min);
    let max = times.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    Some(BatchSummary {
        runs: times.len(),
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
        truncated_runs: 0,
    })
}

/// Run the engine `runs` times with fixed parameters and summarize total times.
///
/// Each run owns its RNG; with a seed, run `i` uses `seed + i`, so results do
/// not depend on how runs are spread across threads.
pub fn run_batch(
    target_text: &str,
    target_wpm: f64,
    layout_name: &str,
    cfg: &TyperConfig,
    runs: usize,
    seed: Option<u64>,
) -> Result<BatchSummary> {
    ensure!(runs > 0, "runs must be > 0");
    validate_config(cfg)?;

    let workers = thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
        .min(runs);
    let chunk_len = runs.div_ceil(workers);
    let run_indices: Vec<usize> = (0..runs).collect();

    let outcomes: Vec<RunOutcome> = thread::scope(|scope| -> Result<Vec<RunOutcome>> {
        let handles: Vec<_> = run_indices
            .chunks(chunk_len)
            .map(|chunk| {
                scope.spawn(move || -> Result<Vec<RunOutcome>> {
                    chunk
                        .iter()
                        .map(|&run| {
                            let mut rng = rng_for_run(seed, run);
                            let trajectory = generate_trajectory(
                                target_text,
                                target_wpm,
                                layout_name,
                                cfg.clone(),
                                &mut rng,
                            )?;
                            Ok(RunOutcome {
                                total_time: trajectory.total_time,
                                truncated: trajectory.truncated,
                            })
                        })
                        .collect()
                })
            })
            .collect();

        let mut out = Vec::with_capacity(runs);
        for handle in handles {
            let chunk = handle
                .join()
                .map_err(|_| anyhow!("batch worker thread panicked"))??;
            out.extend(chunk);
        }
        Ok(out)
    })?;

    let times: Vec<f64> = outcomes.iter().map(|o| o.total_time).collect();
    let mut summary = summarize(&times).ok_or_else(|| anyhow!("batch produced no runs"))?;
    summary.truncated_runs = outcomes.iter().filter(|o| o.truncated).count();

    tracing::debug!(
        runs = summary.runs,
        mean = summary.mean,
        std_dev = summary.std_dev,
        truncated = summary.truncated_runs,
        "batch finished"
    );

    Ok(summary)
}
