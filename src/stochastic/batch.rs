//! Monte Carlo batches of random-walk paths

use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{EngineResult, SimulationError};
use crate::projection::SimulationParameters;
use super::walk::RandomWalkSimulator;

/// Distribution of final balances over many paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloSummary {
    pub instrument: String,
    pub runs: u32,
    pub seed: u64,
    pub mean_final_balance: f64,
    pub std_dev_final_balance: f64,
    pub p5: f64,
    pub p50: f64,
    pub p95: f64,
    /// Share of paths ending below the total amount contributed
    pub probability_of_loss: f64,
    /// Final balance of the path earning the sample mean every month
    pub mean_path_final_balance: f64,
}

/// Percentile of a sorted slice with linear interpolation
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

/// Run `runs` independent paths in parallel
///
/// Path `i` uses a generator seeded with `seed + i`, so the summary does
/// not depend on thread scheduling.
pub fn run_monte_carlo(
    simulator: &RandomWalkSimulator,
    params: &SimulationParameters,
    runs: u32,
    seed: u64,
) -> EngineResult<MonteCarloSummary> {
    if runs == 0 {
        return Err(SimulationError::InvalidParameter {
            field: "runs",
            reason: "at least one run is required".to_string(),
        });
    }

    let mut finals: Vec<f64> = (0..runs)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(seed.wrapping_add(i as u64));
            simulator.simulate(params, &mut rng).map(|r| r.final_balance)
        })
        .collect::<EngineResult<Vec<f64>>>()?;

    finals.sort_by(|a, b| a.total_cmp(b));

    let n = finals.len() as f64;
    let mean = finals.iter().sum::<f64>() / n;
    let variance = finals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let contributed = params.total_contributed();
    let losses = finals.iter().filter(|&&v| v < contributed).count();

    let summary = MonteCarloSummary {
        instrument: params.instrument.name(),
        runs,
        seed,
        mean_final_balance: mean,
        std_dev_final_balance: variance.sqrt(),
        p5: percentile_sorted(&finals, 5.0),
        p50: percentile_sorted(&finals, 50.0),
        p95: percentile_sorted(&finals, 95.0),
        probability_of_loss: losses as f64 / n,
        mean_path_final_balance: simulator.mean_path_final_balance(params)?,
    };

    info!(
        "{}: {} paths, mean final balance {:.2}",
        summary.instrument, runs, summary.mean_final_balance
    );
    Ok(summary)
}
