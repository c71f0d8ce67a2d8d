//! Benchmark rates and spot prices consumed by the projection engine

mod provider;
mod source;

pub use provider::{
    QuoteOrigin, RateProvider, RateQuote, RateSnapshot, SpotQuotes,
    FALLBACK_DAILY_REFERENCE_RATE, FALLBACK_MONTHLY_INDEX_RATE,
};
pub use source::{
    parse_series_body, parse_spot_body, HttpMarketData, MarketDataConfig, MarketDataSource,
    OfflineMarketData, CDI_SERIES, IPCA_SERIES,
};
