//! Comparison runner for one set of investment inputs
//!
//! Holds one rate snapshot and the asset samples, then projects every
//! fixed-income instrument and every requested volatile asset against
//! them. Simulations are independent and read nothing from each other.

use chrono::{Local, NaiveDate};
use log::info;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EngineResult;
use crate::projection::{
    FixedIncomeKind, Instrument, ProjectionConfig, ProjectionEngine, SimulationParameters,
    SimulationResult, DEFAULT_REAL_SPREAD_PERCENT,
};
use crate::rates::RateSnapshot;
use crate::stochastic::{AssetId, AssetSamples, RandomWalkSimulator, BUILTIN_ASSETS};
use crate::tax::TaxSelection;

/// Investor inputs shared by every instrument of a comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInputs {
    pub initial_principal: f64,
    pub monthly_contribution: f64,
    pub horizon_months: u32,
    pub cdi_tax: TaxSelection,
    pub ipca_tax: TaxSelection,
    pub real_spread_percent: f64,
    pub start_date: NaiveDate,
    pub assets: Vec<AssetId>,
}

impl Default for ComparisonInputs {
    fn default() -> Self {
        Self {
            initial_principal: 10_000.0,
            monthly_contribution: 1_000.0,
            horizon_months: 120,
            cdi_tax: TaxSelection::Rate(17.5),
            ipca_tax: TaxSelection::Rate(15.0),
            real_spread_percent: DEFAULT_REAL_SPREAD_PERCENT,
            start_date: Local::now().date_naive(),
            assets: BUILTIN_ASSETS.iter().map(AssetId::new).collect(),
        }
    }
}

impl ComparisonInputs {
    /// Parameters for one instrument, with its tax rate resolved
    pub fn parameters(&self, instrument: Instrument) -> SimulationParameters {
        let tax_rate = match &instrument {
            Instrument::FixedIncome(FixedIncomeKind::Cdi) => {
                self.cdi_tax.resolve(self.start_date, self.horizon_months)
            }
            Instrument::FixedIncome(FixedIncomeKind::IpcaPlus) => {
                self.ipca_tax.resolve(self.start_date, self.horizon_months)
            }
            _ => 0.0,
        };

        SimulationParameters::new(
            instrument,
            self.initial_principal,
            self.monthly_contribution,
            self.horizon_months,
        )
        .with_tax_rate(tax_rate)
        .with_real_spread(self.real_spread_percent)
        .starting(self.start_date)
    }
}

/// Result of one instrument within a comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstrumentOutcome {
    /// Display name, e.g. "CDI 103%"
    pub label: String,
    /// Sheet name used for exports, e.g. "CDI_103%"
    pub sheet_name: String,
    /// Tax rate applied, `None` for untaxed instruments
    pub tax_rate_percent: Option<f64>,
    pub initial_principal: f64,
    pub result: SimulationResult,
}

/// All outcomes of one comparison, in instrument order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comparison {
    pub snapshot: RateSnapshot,
    pub inputs: ComparisonInputs,
    pub outcomes: Vec<InstrumentOutcome>,
}

/// Runs every instrument against one rate snapshot
#[derive(Debug, Clone)]
pub struct ComparisonRunner {
    engine: ProjectionEngine,
    simulator: RandomWalkSimulator,
}

impl ComparisonRunner {
    pub fn new(engine: ProjectionEngine, simulator: RandomWalkSimulator) -> Self {
        Self { engine, simulator }
    }

    /// Runner with default product terms and built-in samples
    pub fn with_snapshot(snapshot: RateSnapshot) -> Self {
        Self::new(
            ProjectionEngine::new(snapshot, ProjectionConfig::default()),
            RandomWalkSimulator::new(AssetSamples::builtin()),
        )
    }

    pub fn engine(&self) -> &ProjectionEngine {
        &self.engine
    }

    pub fn simulator(&self) -> &RandomWalkSimulator {
        &self.simulator
    }

    /// Project the three fixed-income instruments
    pub fn run_fixed_income(&self, inputs: &ComparisonInputs) -> EngineResult<Vec<InstrumentOutcome>> {
        FixedIncomeKind::ALL
            .iter()
            .map(|&kind| {
                let params = inputs.parameters(Instrument::FixedIncome(kind));
                let result = self.engine.project(&params)?;
                Ok(self.outcome(&params, result))
            })
            .collect()
    }

    /// Simulate one path for every requested volatile asset
    pub fn run_volatile<R: Rng + ?Sized>(
        &self,
        inputs: &ComparisonInputs,
        rng: &mut R,
    ) -> EngineResult<Vec<InstrumentOutcome>> {
        inputs
            .assets
            .iter()
            .map(|asset| {
                let params = inputs.parameters(Instrument::Volatile(asset.clone()));
                let result = self.simulator.simulate(&params, &mut *rng)?;
                Ok(self.outcome(&params, result))
            })
            .collect()
    }

    /// Run every instrument; fixed income first, then the volatile assets
    pub fn run<R: Rng + ?Sized>(&self, inputs: &ComparisonInputs, rng: &mut R) -> EngineResult<Comparison> {
        let mut outcomes = self.run_fixed_income(inputs)?;
        outcomes.extend(self.run_volatile(inputs, rng)?);

        info!(
            "compared {} instruments over {} months",
            outcomes.len(),
            inputs.horizon_months
        );

        Ok(Comparison {
            snapshot: *self.engine.snapshot(),
            inputs: inputs.clone(),
            outcomes,
        })
    }

    fn outcome(&self, params: &SimulationParameters, result: SimulationResult) -> InstrumentOutcome {
        let (label, sheet_name, tax_rate_percent) = match &params.instrument {
            Instrument::FixedIncome(FixedIncomeKind::Cdi) => {
                let pct = self.engine.config().cdi_multiplier * 100.0;
                (
                    format!("CDI {pct:.0}%"),
                    format!("CDI_{pct:.0}%"),
                    Some(params.tax_rate_percent),
                )
            }
            Instrument::FixedIncome(FixedIncomeKind::Lci) => {
                let pct = self.engine.config().lci_multiplier * 100.0;
                (format!("LCI {pct:.0}%"), format!("LCI_{pct:.0}%"), None)
            }
            Instrument::FixedIncome(FixedIncomeKind::IpcaPlus) => {
                let label = format!("IPCA+{:.1}%", params.real_spread_percent);
                (label.clone(), label, Some(params.tax_rate_percent))
            }
            Instrument::Volatile(asset) => (asset.display_name(), asset.display_name(), None),
        };

        InstrumentOutcome {
            label,
            sheet_name,
            tax_rate_percent,
            initial_principal: params.initial_principal,
            result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn inputs(months: u32) -> ComparisonInputs {
        ComparisonInputs {
            horizon_months: months,
            start_date: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn test_runs_all_six_instruments() {
        let runner = ComparisonRunner::with_snapshot(RateSnapshot::fallback());
        let comparison = runner.run(&inputs(12), &mut StdRng::seed_from_u64(5)).unwrap();

        let labels: Vec<&str> = comparison.outcomes.iter().map(|o| o.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["CDI 103%", "LCI 91%", "IPCA+10.0%", "Bitcoin", "Ethereum", "Solana"]
        );
        assert_eq!(comparison.outcomes[0].sheet_name, "CDI_103%");
        assert_eq!(comparison.outcomes[0].tax_rate_percent, Some(17.5));
        assert_eq!(comparison.outcomes[1].tax_rate_percent, None);
        assert_eq!(comparison.outcomes[2].tax_rate_percent, Some(15.0));

        for outcome in &comparison.outcomes {
            assert_eq!(outcome.result.series.len(), 12);
            assert_eq!(outcome.result.total_contributed, 22_000.0);
        }
    }

    #[test]
    fn test_fixed_income_independent_of_rng() {
        let runner = ComparisonRunner::with_snapshot(RateSnapshot::fallback());
        let a = runner.run(&inputs(36), &mut StdRng::seed_from_u64(1)).unwrap();
        let b = runner.run(&inputs(36), &mut StdRng::seed_from_u64(2)).unwrap();

        for i in 0..3 {
            assert_eq!(a.outcomes[i].result, b.outcomes[i].result);
        }
    }

    #[test]
    fn test_tax_by_term() {
        let runner = ComparisonRunner::with_snapshot(RateSnapshot::fallback());
        let by_term = |months| {
            let mut inputs = inputs(months);
            inputs.cdi_tax = TaxSelection::ByTerm;
            inputs.ipca_tax = TaxSelection::ByTerm;
            runner.run_fixed_income(&inputs).unwrap()
        };

        // 2026-10-18 + 5 months is 151 days, + 6 months is 182 days
        let short = by_term(5);
        assert_eq!(short[0].tax_rate_percent, Some(22.5));
        assert_eq!(short[2].tax_rate_percent, Some(22.5));

        let half_year = by_term(6);
        assert_eq!(half_year[0].tax_rate_percent, Some(20.0));
        assert_eq!(half_year[2].tax_rate_percent, Some(20.0));

        let long = by_term(36);
        assert_eq!(long[0].tax_rate_percent, Some(15.0));
        assert_eq!(long[1].tax_rate_percent, None);
    }

    #[test]
    fn test_higher_spread_higher_balance() {
        let runner = ComparisonRunner::with_snapshot(RateSnapshot::fallback());
        let results: Vec<f64> = [4.0, 6.0, 8.0]
            .iter()
            .map(|&spread| {
                let inputs = ComparisonInputs {
                    real_spread_percent: spread,
                    ..inputs(120)
                };
                runner.run_fixed_income(&inputs).unwrap()[2].result.final_balance
            })
            .collect();

        assert!(results[0] < results[1] && results[1] < results[2]);
    }

    #[test]
    fn test_empty_horizon_comparison() {
        let runner = ComparisonRunner::with_snapshot(RateSnapshot::fallback());
        let comparison = runner.run(&inputs(0), &mut StdRng::seed_from_u64(0)).unwrap();
        for outcome in &comparison.outcomes {
            assert!(outcome.result.series.is_empty());
            assert_eq!(outcome.result.final_balance, 10_000.0);
            assert_eq!(outcome.result.total_return, 0.0);
        }
    }
}
