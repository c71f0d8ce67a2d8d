//! Random-walk simulator for volatile assets
//!
//! Each month draws one return from a normal distribution with the mean
//! and population standard deviation of the asset's sample, then applies
//! the same recurrence as the fixed-income model. Only the first two
//! moments are used; the sample's skew and fat tails are not reproduced.

use rand::Rng;
use rand_distr::Distribution;

use crate::error::{EngineResult, SimulationError};
use crate::projection::{roll_forward, Instrument, SimulationParameters, SimulationResult};
use super::samples::{AssetId, AssetSamples};

/// Worst monthly return that can be drawn (total loss)
pub const MIN_MONTHLY_RETURN: f64 = -1.0;

/// Simulator for the volatile instruments
#[derive(Debug, Clone, Default)]
pub struct RandomWalkSimulator {
    samples: AssetSamples,
}

impl RandomWalkSimulator {
    pub fn new(samples: AssetSamples) -> Self {
        Self { samples }
    }

    pub fn samples(&self) -> &AssetSamples {
        &self.samples
    }

    /// Simulate one path using randomness from `rng`
    pub fn simulate<R: Rng + ?Sized>(
        &self,
        params: &SimulationParameters,
        rng: &mut R,
    ) -> EngineResult<SimulationResult> {
        params.validate()?;
        let asset = volatile_asset(params)?;

        let normal = self.samples.get(asset).distribution()?;
        let (series, final_balance) = roll_forward(params, |_| {
            normal.sample(&mut *rng).max(MIN_MONTHLY_RETURN)
        });

        Ok(SimulationResult::from_series(params, series, final_balance, 0.0))
    }

    /// Final balance when every month earns exactly the sample mean
    pub fn mean_path_final_balance(&self, params: &SimulationParameters) -> EngineResult<f64> {
        params.validate()?;
        let mean = self.samples.get(volatile_asset(params)?).mean();
        let (_, final_balance) = roll_forward(params, |_| mean);
        Ok(final_balance)
    }
}

fn volatile_asset(params: &SimulationParameters) -> EngineResult<&AssetId> {
    match &params.instrument {
        Instrument::Volatile(asset) => Ok(asset),
        Instrument::FixedIncome(kind) => Err(SimulationError::InvalidInstrument(format!(
            "{kind} is not a volatile asset"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::projection::FixedIncomeKind;
    use crate::stochastic::AssetReturnSample;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(asset: &str, months: u32) -> SimulationParameters {
        SimulationParameters::new(Instrument::Volatile(AssetId::new(asset)), 10_000.0, 500.0, months)
            .starting(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let simulator = RandomWalkSimulator::default();
        let a = simulator.simulate(&params("bitcoin", 24), &mut StdRng::seed_from_u64(7)).unwrap();
        let b = simulator.simulate(&params("bitcoin", 24), &mut StdRng::seed_from_u64(7)).unwrap();
        let c = simulator.simulate(&params("bitcoin", 24), &mut StdRng::seed_from_u64(8)).unwrap();

        assert_eq!(a, b);
        assert_ne!(a.series, c.series);
        assert_eq!(a.series.len(), 24);
        assert_eq!(a.total_contributed, 22_000.0);
    }

    #[test]
    fn test_zero_volatility_matches_mean_path() {
        let mut samples = AssetSamples::builtin();
        samples.insert(AssetReturnSample::new("flat", vec![0.02, 0.02, 0.02]));
        let simulator = RandomWalkSimulator::new(samples);
        let params = params("flat", 12);

        let result = simulator.simulate(&params, &mut StdRng::seed_from_u64(1)).unwrap();
        let expected = simulator.mean_path_final_balance(&params).unwrap();
        assert_relative_eq!(result.final_balance, expected, epsilon = 1e-9);
        assert_relative_eq!(
            result.total_return,
            expected - 10_000.0 - 6_000.0,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_unknown_asset_uses_default_sample() {
        let simulator = RandomWalkSimulator::default();
        let result = simulator
            .simulate(&params("dogecoin", 6), &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(result.series.len(), 6);
        assert_eq!(result.instrument, Instrument::Volatile(AssetId::new("dogecoin")));
    }

    #[test]
    fn test_empty_horizon() {
        let simulator = RandomWalkSimulator::default();
        let result = simulator
            .simulate(&params("solana", 0), &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert!(result.series.is_empty());
        assert_eq!(result.final_balance, 10_000.0);
        assert_eq!(result.total_return, 0.0);
    }

    #[test]
    fn test_balance_never_negative() {
        let mut samples = AssetSamples::builtin();
        samples.insert(AssetReturnSample::new("wild", vec![-0.9, 0.9, -0.9, 0.9]));
        let simulator = RandomWalkSimulator::new(samples);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..200 {
            let result = simulator.simulate(&params("wild", 24), &mut rng).unwrap();
            assert!(result.series.iter().all(|r| r.balance >= 0.0));
        }
    }

    #[test]
    fn test_fixed_income_rejected() {
        let simulator = RandomWalkSimulator::default();
        let params = SimulationParameters::new(
            Instrument::FixedIncome(FixedIncomeKind::Cdi),
            1.0,
            1.0,
            1,
        );
        assert!(matches!(
            simulator.simulate(&params, &mut StdRng::seed_from_u64(0)),
            Err(SimulationError::InvalidInstrument(_))
        ));
    }
}
