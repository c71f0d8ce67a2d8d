//! Projection engine for fixed-income instruments and shared result types

mod engine;
mod params;
mod series;
mod state;

pub use engine::{
    annualize_daily_rate, monthly_from_annual, ProjectionConfig, ProjectionEngine,
    BUSINESS_DAYS_PER_YEAR, DEFAULT_CDI_MULTIPLIER, DEFAULT_LCI_MULTIPLIER,
};
pub use params::{
    FixedIncomeKind, Instrument, SimulationParameters, DEFAULT_REAL_SPREAD_PERCENT,
    MAX_HORIZON_MONTHS,
};
pub use series::{calendar_label, round_to_cents, MonthlyRecord, SimulationResult};
pub use state::{roll_forward, BalanceState};
