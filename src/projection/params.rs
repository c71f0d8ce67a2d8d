//! Instruments and per-call simulation parameters

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineResult, SimulationError};
use crate::stochastic::AssetId;

/// Default real spread of the index-linked instrument, in percent a year
pub const DEFAULT_REAL_SPREAD_PERCENT: f64 = 10.0;

/// Longest horizon accepted from user input: 30 years
pub const MAX_HORIZON_MONTHS: u32 = 360;

/// Fixed-income products priced by the deterministic model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FixedIncomeKind {
    /// Reference-rate linked, taxable
    Cdi,
    /// Reference-rate linked, tax exempt
    Lci,
    /// Price-index linked plus real spread, taxable on real gain
    IpcaPlus,
}

impl FixedIncomeKind {
    pub const ALL: [FixedIncomeKind; 3] = [Self::Cdi, Self::Lci, Self::IpcaPlus];

    pub fn is_taxable(&self) -> bool {
        !matches!(self, FixedIncomeKind::Lci)
    }
}

impl fmt::Display for FixedIncomeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FixedIncomeKind::Cdi => "CDI",
            FixedIncomeKind::Lci => "LCI",
            FixedIncomeKind::IpcaPlus => "IPCA+",
        };
        f.write_str(name)
    }
}

/// Any product the simulator can project
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Instrument {
    FixedIncome(FixedIncomeKind),
    Volatile(AssetId),
}

impl Instrument {
    pub fn name(&self) -> String {
        match self {
            Instrument::FixedIncome(kind) => kind.to_string(),
            Instrument::Volatile(asset) => asset.display_name(),
        }
    }
}

impl FromStr for Instrument {
    type Err = SimulationError;

    /// Accepts `cdi`, `lci`, `ipca+`, a known asset id, or `crypto:<id>`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_ascii_lowercase();
        match key.as_str() {
            "cdi" => Ok(Instrument::FixedIncome(FixedIncomeKind::Cdi)),
            "lci" => Ok(Instrument::FixedIncome(FixedIncomeKind::Lci)),
            "ipca+" | "ipca" => Ok(Instrument::FixedIncome(FixedIncomeKind::IpcaPlus)),
            _ => {
                if let Some(id) = key.strip_prefix("crypto:").filter(|id| !id.is_empty()) {
                    Ok(Instrument::Volatile(AssetId::new(id)))
                } else if AssetId::new(&key).is_builtin() {
                    Ok(Instrument::Volatile(AssetId::new(&key)))
                } else {
                    Err(SimulationError::InvalidInstrument(s.to_string()))
                }
            }
        }
    }
}

/// Inputs of one simulation call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    pub instrument: Instrument,

    /// Amount invested at month 0
    pub initial_principal: f64,

    /// Amount added at the end of every month
    pub monthly_contribution: f64,

    /// Number of months to project
    pub horizon_months: u32,

    /// Income tax in percent; ignored by tax-exempt and volatile instruments
    pub tax_rate_percent: f64,

    /// Annual real spread in percent; index-linked instrument only
    pub real_spread_percent: f64,

    /// Reference date for calendar labels
    pub start_date: NaiveDate,
}

impl SimulationParameters {
    pub fn new(
        instrument: Instrument,
        initial_principal: f64,
        monthly_contribution: f64,
        horizon_months: u32,
    ) -> Self {
        Self {
            instrument,
            initial_principal,
            monthly_contribution,
            horizon_months,
            tax_rate_percent: 0.0,
            real_spread_percent: DEFAULT_REAL_SPREAD_PERCENT,
            start_date: Local::now().date_naive(),
        }
    }

    pub fn with_tax_rate(mut self, percent: f64) -> Self {
        self.tax_rate_percent = percent;
        self
    }

    pub fn with_real_spread(mut self, percent: f64) -> Self {
        self.real_spread_percent = percent;
        self
    }

    pub fn starting(mut self, date: NaiveDate) -> Self {
        self.start_date = date;
        self
    }

    /// Sum of the monthly contributions over the horizon
    pub fn total_contributions(&self) -> f64 {
        self.monthly_contribution * self.horizon_months as f64
    }

    /// Principal plus all contributions
    pub fn total_contributed(&self) -> f64 {
        self.initial_principal + self.total_contributions()
    }

    pub fn validate(&self) -> EngineResult<()> {
        check_amount("initial_principal", self.initial_principal)?;
        check_amount("monthly_contribution", self.monthly_contribution)?;

        if !(0.0..=100.0).contains(&self.tax_rate_percent) {
            return Err(SimulationError::InvalidParameter {
                field: "tax_rate_percent",
                reason: format!("{} is outside 0..=100", self.tax_rate_percent),
            });
        }
        if !self.real_spread_percent.is_finite() {
            return Err(SimulationError::InvalidParameter {
                field: "real_spread_percent",
                reason: "must be finite".to_string(),
            });
        }
        Ok(())
    }
}

fn check_amount(field: &'static str, value: f64) -> EngineResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimulationError::InvalidParameter {
            field,
            reason: format!("{value} must be a non-negative amount"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_instruments() {
        assert_eq!(
            "CDI".parse::<Instrument>().unwrap(),
            Instrument::FixedIncome(FixedIncomeKind::Cdi)
        );
        assert_eq!(
            "ipca+".parse::<Instrument>().unwrap(),
            Instrument::FixedIncome(FixedIncomeKind::IpcaPlus)
        );
        assert_eq!(
            "bitcoin".parse::<Instrument>().unwrap(),
            Instrument::Volatile(AssetId::new("bitcoin"))
        );
        assert_eq!(
            "crypto:dogecoin".parse::<Instrument>().unwrap(),
            Instrument::Volatile(AssetId::new("dogecoin"))
        );
    }

    #[test]
    fn test_unknown_instrument_fails_fast() {
        let err = "poupanca".parse::<Instrument>().unwrap_err();
        assert!(matches!(err, SimulationError::InvalidInstrument(ref s) if s == "poupanca"));
        assert!(err.to_string().contains("invalid instrument kind"));
        assert!("crypto:".parse::<Instrument>().is_err());
    }

    #[test]
    fn test_contribution_totals() {
        let params = SimulationParameters::new(
            Instrument::FixedIncome(FixedIncomeKind::Lci),
            10_000.0,
            1_000.0,
            12,
        );
        assert_eq!(params.total_contributions(), 12_000.0);
        assert_eq!(params.total_contributed(), 22_000.0);
    }

    #[test]
    fn test_validation() {
        let base = SimulationParameters::new(
            Instrument::FixedIncome(FixedIncomeKind::Cdi),
            0.0,
            0.0,
            0,
        );
        assert!(base.validate().is_ok());
        assert!(base.clone().with_tax_rate(120.0).validate().is_err());

        let mut negative = base.clone();
        negative.initial_principal = -1.0;
        assert!(matches!(
            negative.validate(),
            Err(SimulationError::InvalidParameter { field: "initial_principal", .. })
        ));

        let mut nan = base;
        nan.monthly_contribution = f64::NAN;
        assert!(nan.validate().is_err());
    }
}
