//! Deterministic compounding model for fixed-income instruments

use log::debug;

use crate::error::{EngineResult, SimulationError};
use crate::rates::RateSnapshot;
use super::params::{FixedIncomeKind, Instrument, SimulationParameters};
use super::series::SimulationResult;
use super::state::roll_forward;

/// Business days used to annualize the daily reference rate
pub const BUSINESS_DAYS_PER_YEAR: u32 = 252;

/// Share of the reference rate paid by the taxable product (103%)
pub const DEFAULT_CDI_MULTIPLIER: f64 = 1.03;

/// Share of the reference rate paid by the tax-exempt product (91%)
pub const DEFAULT_LCI_MULTIPLIER: f64 = 0.91;

/// Product terms of the fixed-income instruments
#[derive(Debug, Clone)]
pub struct ProjectionConfig {
    /// Compounding periods per year for the daily reference rate
    pub business_days_per_year: u32,

    /// Multiplier applied to the annualized reference rate (taxable product)
    pub cdi_multiplier: f64,

    /// Multiplier applied to the annualized reference rate (exempt product)
    pub lci_multiplier: f64,
}

impl Default for ProjectionConfig {
    fn default() -> Self {
        Self {
            business_days_per_year: BUSINESS_DAYS_PER_YEAR,
            cdi_multiplier: DEFAULT_CDI_MULTIPLIER,
            lci_multiplier: DEFAULT_LCI_MULTIPLIER,
        }
    }
}

/// `(1 + daily)^days - 1`
pub fn annualize_daily_rate(daily: f64, days: u32) -> f64 {
    (1.0 + daily).powi(days as i32) - 1.0
}

/// Monthly rate equivalent to an annual rate: `(1 + annual)^(1/12) - 1`
pub fn monthly_from_annual(annual: f64) -> f64 {
    (1.0 + annual).powf(1.0 / 12.0) - 1.0
}

/// Main projection engine for fixed-income instruments
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    snapshot: RateSnapshot,
    config: ProjectionConfig,
}

impl ProjectionEngine {
    /// Create a new projection engine over a rate snapshot
    pub fn new(snapshot: RateSnapshot, config: ProjectionConfig) -> Self {
        Self { snapshot, config }
    }

    pub fn snapshot(&self) -> &RateSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    /// Annualized reference rate
    pub fn annual_reference_rate(&self) -> f64 {
        annualize_daily_rate(
            self.snapshot.daily_reference_rate,
            self.config.business_days_per_year,
        )
    }

    /// Effective monthly growth rate of a fixed-income product
    pub fn monthly_rate(&self, kind: FixedIncomeKind, params: &SimulationParameters) -> f64 {
        match kind {
            FixedIncomeKind::Cdi => {
                let gross_annual = self.annual_reference_rate() * self.config.cdi_multiplier;
                let net_annual = gross_annual * (1.0 - params.tax_rate_percent / 100.0);
                monthly_from_annual(net_annual)
            }
            FixedIncomeKind::Lci => {
                monthly_from_annual(self.annual_reference_rate() * self.config.lci_multiplier)
            }
            FixedIncomeKind::IpcaPlus => {
                let real_monthly = params.real_spread_percent / 100.0 / 12.0;
                (1.0 + self.snapshot.monthly_index_rate) * (1.0 + real_monthly) - 1.0
            }
        }
    }

    /// Run projection for one fixed-income instrument
    pub fn project(&self, params: &SimulationParameters) -> EngineResult<SimulationResult> {
        params.validate()?;

        let kind = match &params.instrument {
            Instrument::FixedIncome(kind) => *kind,
            Instrument::Volatile(asset) => {
                return Err(SimulationError::InvalidInstrument(format!(
                    "{asset} is not a fixed-income instrument"
                )))
            }
        };

        let monthly_rate = self.monthly_rate(kind, params);
        debug!(
            "{kind}: monthly rate {monthly_rate:.8} over {} months",
            params.horizon_months
        );

        let (series, nominal_final) = roll_forward(params, |_| monthly_rate);

        let tax = match kind {
            FixedIncomeKind::IpcaPlus => self.real_gain_tax(params, nominal_final),
            FixedIncomeKind::Cdi | FixedIncomeKind::Lci => 0.0,
        };

        Ok(SimulationResult::from_series(
            params,
            series,
            nominal_final - tax,
            tax,
        ))
    }

    /// Tax on the inflation-adjusted gain over the whole horizon
    ///
    /// A real loss gives a negative tax, credited to the final balance.
    fn real_gain_tax(&self, params: &SimulationParameters, nominal_final: f64) -> f64 {
        let invested = params.total_contributed();
        if params.horizon_months == 0 || invested <= 0.0 {
            return 0.0;
        }

        let inflation =
            (1.0 + self.snapshot.monthly_index_rate).powi(params.horizon_months as i32) - 1.0;
        let gross_gain = nominal_final / invested - 1.0;
        let real_gain = (1.0 + gross_gain) / (1.0 + inflation) - 1.0;

        real_gain * params.tax_rate_percent / 100.0 * invested
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stochastic::AssetId;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn engine() -> ProjectionEngine {
        ProjectionEngine::new(RateSnapshot::new(0.0039, 0.0040), ProjectionConfig::default())
    }

    fn params(kind: FixedIncomeKind, months: u32) -> SimulationParameters {
        SimulationParameters::new(Instrument::FixedIncome(kind), 10_000.0, 1_000.0, months)
            .starting(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap())
    }

    #[test]
    fn test_cdi_scenario() {
        let engine = engine();
        let params = params(FixedIncomeKind::Cdi, 12).with_tax_rate(17.5);

        let annual = engine.annual_reference_rate();
        assert!(annual > 1.66 && annual < 1.67, "annualized CDI was {}", annual);

        let expected_monthly = (1.0 + annual * 1.03 * 0.825).powf(1.0 / 12.0) - 1.0;
        assert_relative_eq!(
            engine.monthly_rate(FixedIncomeKind::Cdi, &params),
            expected_monthly,
            epsilon = 1e-12
        );

        let result = engine.project(&params).unwrap();
        assert_eq!(result.series.len(), 12);
        for (i, record) in result.series.iter().enumerate() {
            assert_eq!(record.month, i as u32 + 1);
            assert_eq!(record.balance, (record.balance * 100.0).round() / 100.0);
        }
        assert_eq!(result.series[0].label, "11/2026");
        assert_eq!(result.series[11].label, "10/2027");
        assert_eq!(result.last_balance(), Some(42_728.91));
        assert_relative_eq!(result.final_balance, 42_728.914, epsilon = 1e-2);
        assert_relative_eq!(result.total_return, 42_728.914 - 22_000.0, epsilon = 1e-2);
        assert_eq!(result.tax_withheld, 0.0);
    }

    #[test]
    fn test_lci_ignores_tax() {
        let engine = engine();
        let untaxed = engine.project(&params(FixedIncomeKind::Lci, 24)).unwrap();

        for rate in [12.5, 15.0, 17.5, 22.5, 100.0] {
            let taxed = engine
                .project(&params(FixedIncomeKind::Lci, 24).with_tax_rate(rate))
                .unwrap();
            assert_eq!(taxed.total_return, untaxed.total_return);
            assert_eq!(taxed.series, untaxed.series);
        }
        assert_relative_eq!(
            engine.project(&params(FixedIncomeKind::Lci, 12)).unwrap().final_balance,
            44_139.762,
            epsilon = 1e-2
        );
    }

    #[test]
    fn test_ipca_taxes_real_gain_at_end() {
        let engine = engine();
        let params = params(FixedIncomeKind::IpcaPlus, 12).with_tax_rate(15.0);

        let monthly = engine.monthly_rate(FixedIncomeKind::IpcaPlus, &params);
        assert_relative_eq!(monthly, 1.004 * (1.0 + 0.10 / 12.0) - 1.0, epsilon = 1e-12);

        let result = engine.project(&params).unwrap();
        // Series is gross; tax comes off the final balance only
        assert_eq!(result.last_balance(), Some(24_440.02));
        assert_relative_eq!(result.tax_withheld, 194.525, epsilon = 1e-2);
        assert_relative_eq!(result.final_balance, 24_245.491, epsilon = 1e-2);
        assert_relative_eq!(
            result.total_return,
            result.final_balance - result.total_contributed,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_ipca_real_loss_credits_tax() {
        // Spread of zero: nominal growth equals inflation, contributions earn less
        let engine = engine();
        let params = params(FixedIncomeKind::IpcaPlus, 24)
            .with_tax_rate(22.5)
            .with_real_spread(0.0);

        let result = engine.project(&params).unwrap();
        assert!(result.tax_withheld < 0.0);
        assert_relative_eq!(result.tax_withheld, -260.8872, epsilon = 1e-3);
        assert_relative_eq!(result.final_balance, 36_403.4453, epsilon = 1e-3);
        assert_eq!(result.last_balance(), Some(36_142.56));
        assert!(result.final_balance > 36_142.56);
    }

    #[test]
    fn test_deterministic_repeatable() {
        let engine = engine();
        for kind in FixedIncomeKind::ALL {
            let params = params(kind, 60).with_tax_rate(15.0);
            let first = engine.project(&params).unwrap();
            let second = engine.project(&params).unwrap();
            assert_eq!(first, second);
            assert_eq!(
                serde_json::to_string(&first).unwrap(),
                serde_json::to_string(&second).unwrap()
            );
        }
    }

    #[test]
    fn test_balance_non_decreasing() {
        let engine = engine();
        for kind in FixedIncomeKind::ALL {
            let result = engine.project(&params(kind, 120).with_tax_rate(22.5)).unwrap();
            for pair in result.series.windows(2) {
                assert!(pair[1].balance >= pair[0].balance, "{kind} balance decreased");
            }
        }
    }

    #[test]
    fn test_contribution_accounting() {
        let engine = engine();
        for kind in FixedIncomeKind::ALL {
            for months in [0, 1, 12, 37] {
                let result = engine.project(&params(kind, months).with_tax_rate(17.5)).unwrap();
                assert_eq!(result.total_contributed, 10_000.0 + 1_000.0 * months as f64);
                assert_eq!(result.total_contributions, 1_000.0 * months as f64);
            }
        }
    }

    #[test]
    fn test_empty_horizon() {
        let engine = engine();
        for kind in FixedIncomeKind::ALL {
            let result = engine.project(&params(kind, 0).with_tax_rate(15.0)).unwrap();
            assert!(result.series.is_empty());
            assert_eq!(result.last_balance(), None);
            assert_eq!(result.final_balance, 10_000.0);
            assert_eq!(result.total_return, 0.0);
            assert_eq!(result.tax_withheld, 0.0);
        }
    }

    #[test]
    fn test_zero_amounts() {
        let engine = engine();
        let params = SimulationParameters::new(
            Instrument::FixedIncome(FixedIncomeKind::IpcaPlus),
            0.0,
            0.0,
            12,
        )
        .with_tax_rate(15.0);

        let result = engine.project(&params).unwrap();
        assert_eq!(result.series.len(), 12);
        assert!(result.series.iter().all(|r| r.balance == 0.0));
        assert_eq!(result.final_balance, 0.0);
    }

    #[test]
    fn test_volatile_instrument_rejected() {
        let engine = engine();
        let params = SimulationParameters::new(
            Instrument::Volatile(AssetId::new("bitcoin")),
            1_000.0,
            0.0,
            12,
        );
        assert!(matches!(
            engine.project(&params),
            Err(SimulationError::InvalidInstrument(_))
        ));
    }

    #[test]
    fn test_custom_multiplier() {
        let config = ProjectionConfig {
            cdi_multiplier: 1.0,
            ..Default::default()
        };
        let plain = ProjectionEngine::new(RateSnapshot::new(0.0004, 0.004), config);
        let premium = ProjectionEngine::new(RateSnapshot::new(0.0004, 0.004), ProjectionConfig::default());

        let params = params(FixedIncomeKind::Cdi, 12).with_tax_rate(15.0);
        assert!(
            premium.project(&params).unwrap().final_balance
                > plain.project(&params).unwrap().final_balance
        );
    }
}
