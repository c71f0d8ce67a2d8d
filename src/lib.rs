//! Investment Simulator - Monthly balance projections for Brazilian fixed income and crypto
//!
//! This library provides:
//! - Benchmark rate lookup (CDI, IPCA) with session caching and fallbacks
//! - Deterministic compounding for CDI, LCI and IPCA+ products, with income tax
//! - Random-walk simulation of volatile assets from illustrative return samples
//! - Monte Carlo batches, summary tables and CSV workbook export

pub mod error;
pub mod projection;
pub mod rates;
pub mod report;
pub mod scenario;
pub mod stochastic;
pub mod tax;

// Re-export commonly used types
pub use error::{EngineResult, RateError, SimulationError};
pub use projection::{
    FixedIncomeKind, Instrument, MonthlyRecord, ProjectionConfig, ProjectionEngine,
    SimulationParameters, SimulationResult,
};
pub use rates::{RateProvider, RateSnapshot};
pub use scenario::{Comparison, ComparisonInputs, ComparisonRunner};
pub use stochastic::{AssetId, AssetSamples, RandomWalkSimulator};
pub use tax::{resolve_income_tax_rate, TaxSelection};
