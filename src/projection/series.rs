//! Monthly balance series and simulation results

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::params::{Instrument, SimulationParameters};

/// Round to whole cents
pub fn round_to_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// "MM/YYYY" label of the month `months` after `start`
pub fn calendar_label(start: NaiveDate, months: u32) -> String {
    start
        .checked_add_months(Months::new(months))
        .map(|d| d.format("%m/%Y").to_string())
        .unwrap_or_default()
}

/// Balance at the end of one projected month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRecord {
    /// Projection month, 1-indexed
    pub month: u32,
    /// Calendar month, "MM/YYYY"
    pub label: String,
    /// Balance rounded to cents
    pub balance: f64,
}

impl MonthlyRecord {
    pub fn new(month: u32, start_date: NaiveDate, balance: f64) -> Self {
        Self {
            month,
            label: calendar_label(start_date, month),
            balance: round_to_cents(balance),
        }
    }
}

/// Complete output of one simulation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub instrument: Instrument,

    /// Monthly balances in month order
    pub series: Vec<MonthlyRecord>,

    /// Final balance minus everything put in
    pub total_return: f64,

    /// Balance at the end of the horizon, net of any end-of-horizon tax
    pub final_balance: f64,

    /// Monthly contribution times horizon
    pub total_contributions: f64,

    /// Principal plus contributions
    pub total_contributed: f64,

    /// Tax deducted at the end of the horizon (index-linked only; negative on a real loss)
    pub tax_withheld: f64,
}

impl SimulationResult {
    pub fn from_series(
        params: &SimulationParameters,
        series: Vec<MonthlyRecord>,
        final_balance: f64,
        tax_withheld: f64,
    ) -> Self {
        let total_contributions = params.total_contributions();
        Self {
            instrument: params.instrument.clone(),
            series,
            total_return: final_balance - params.initial_principal - total_contributions,
            final_balance,
            total_contributions,
            total_contributed: params.total_contributed(),
            tax_withheld,
        }
    }

    /// Recorded balance of the last month, if any
    pub fn last_balance(&self) -> Option<f64> {
        self.series.last().map(|r| r.balance)
    }

    pub fn balances(&self) -> Vec<f64> {
        self.series.iter().map(|r| r.balance).collect()
    }
}
