//! Stochastic model for the simulated volatile assets

mod batch;
mod samples;
mod walk;

pub use batch::{run_monte_carlo, MonteCarloSummary};
pub use samples::{
    AssetId, AssetReturnSample, AssetSamples, BITCOIN, BUILTIN_ASSETS, ETHEREUM, SOLANA,
};
pub use walk::{RandomWalkSimulator, MIN_MONTHLY_RETURN};
