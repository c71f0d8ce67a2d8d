//! Regressive income-tax schedule for taxable fixed-income products

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

/// Rates offered for direct selection, in percent
pub const TAX_RATE_MENU: [f64; 4] = [22.5, 17.5, 15.0, 12.5];

/// Income-tax rate for a holding term, in percent
///
/// | term (days) | rate  |
/// |-------------|-------|
/// | <= 180      | 22.5% |
/// | 181-360     | 20.0% |
/// | 361-720     | 17.5% |
/// | > 720       | 15.0% |
pub fn resolve_income_tax_rate(term_days: i64) -> f64 {
    if term_days <= 180 {
        22.5
    } else if term_days <= 360 {
        20.0
    } else if term_days <= 720 {
        17.5
    } else {
        15.0
    }
}

/// Calendar days between `start` and `start + months`
pub fn term_days(start: NaiveDate, months: u32) -> i64 {
    start
        .checked_add_months(Months::new(months))
        .map(|end| (end - start).num_days())
        // Out of calendar range: approximate with 30-day months
        .unwrap_or(months as i64 * 30)
}

/// How the tax rate of a taxable instrument is chosen
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TaxSelection {
    /// Explicit rate in percent
    Rate(f64),
    /// Regressive schedule applied to the investment horizon
    ByTerm,
}

impl TaxSelection {
    /// Rate in percent for a horizon starting at `start`
    pub fn resolve(&self, start: NaiveDate, horizon_months: u32) -> f64 {
        match self {
            TaxSelection::Rate(rate) => *rate,
            TaxSelection::ByTerm => resolve_income_tax_rate(term_days(start, horizon_months)),
        }
    }

    /// Whether `rate` is one of the menu entries
    pub fn is_menu_rate(rate: f64) -> bool {
        TAX_RATE_MENU.iter().any(|r| (r - rate).abs() < 1e-9)
    }
}

impl std::str::FromStr for TaxSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Ok(TaxSelection::ByTerm);
        }
        let rate: f64 = s
            .trim_end_matches('%')
            .parse()
            .map_err(|_| format!("'{s}' is not a tax rate"))?;
        if Self::is_menu_rate(rate) {
            Ok(TaxSelection::Rate(rate))
        } else {
            Err(format!("tax rate must be one of {TAX_RATE_MENU:?} or 'auto', got {rate}"))
        }
    }
}
