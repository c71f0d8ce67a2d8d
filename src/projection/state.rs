//! Running balance shared by the deterministic and stochastic models

use super::params::SimulationParameters;
use super::series::MonthlyRecord;

/// Balance of an investment at a point in time during projection
#[derive(Debug, Clone)]
pub struct BalanceState {
    /// Current projection month (0 before the first month)
    pub month: u32,

    /// Unrounded balance at the end of `month`
    pub balance: f64,
}

impl BalanceState {
    /// State at month 0
    pub fn from_params(params: &SimulationParameters) -> Self {
        Self {
            month: 0,
            balance: params.initial_principal,
        }
    }

    /// Grow the balance by one month and add the contribution
    pub fn advance_month(&mut self, monthly_rate: f64, contribution: f64) {
        self.month += 1;
        self.balance = self.balance * (1.0 + monthly_rate) + contribution;
    }
}

/// Run the monthly recurrence over the whole horizon
///
/// `rate_for_month` is called once per month, in order. Returns the
/// recorded series and the unrounded final balance (the principal when the
/// horizon is empty).
pub fn roll_forward<F>(params: &SimulationParameters, mut rate_for_month: F) -> (Vec<MonthlyRecord>, f64)
where
    F: FnMut(u32) -> f64,
{
    let mut state = BalanceState::from_params(params);
    let mut series = Vec::with_capacity(params.horizon_months as usize);

    for month in 1..=params.horizon_months {
        state.advance_month(rate_for_month(month), params.monthly_contribution);
        series.push(MonthlyRecord::new(month, params.start_date, state.balance));
    }

    (series, state.balance)
}
