//! Error types for the projection engine and market data

use thiserror::Error;

/// Errors raised by the projection engine, the stochastic model and exports
#[derive(Debug, Error)]
pub enum SimulationError {
    #[error("invalid instrument kind: {0}")]
    InvalidInstrument(String),

    #[error("invalid parameter {field}: {reason}")]
    InvalidParameter { field: &'static str, reason: String },

    #[error("invalid return distribution for {asset}: {reason}")]
    Distribution { asset: String, reason: String },

    #[error("asset sample file is malformed: {0}")]
    MalformedSamples(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while fetching market data
///
/// These never abort a simulation: the rate provider turns them into
/// fallback values plus a warning.
#[derive(Debug, Error)]
pub enum RateError {
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("series {0} returned no observations")]
    EmptySeries(u32),

    #[error("could not parse value {value:?} from series {series}")]
    Parse { series: u32, value: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("market data disabled (offline mode)")]
    Offline,
}

pub type EngineResult<T> = std::result::Result<T, SimulationError>;
