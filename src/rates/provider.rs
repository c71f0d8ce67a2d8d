//! Session-scoped rate provider with fallbacks

use std::cell::OnceCell;
use std::collections::HashMap;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::source::{MarketDataSource, CDI_SERIES, IPCA_SERIES};

/// Daily reference rate used when the lookup fails (0.39% a day)
pub const FALLBACK_DAILY_REFERENCE_RATE: f64 = 0.0039;

/// Monthly index rate used when the lookup fails (0.40% a month)
pub const FALLBACK_MONTHLY_INDEX_RATE: f64 = 0.0040;

/// Rates shared by every simulation of one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSnapshot {
    /// Daily reference (CDI) rate as a decimal fraction
    pub daily_reference_rate: f64,
    /// Monthly price-index (IPCA) rate as a decimal fraction
    pub monthly_index_rate: f64,
}

impl RateSnapshot {
    pub fn new(daily_reference_rate: f64, monthly_index_rate: f64) -> Self {
        Self {
            daily_reference_rate,
            monthly_index_rate,
        }
    }

    /// Snapshot built from the documented fallback constants
    pub fn fallback() -> Self {
        Self::new(FALLBACK_DAILY_REFERENCE_RATE, FALLBACK_MONTHLY_INDEX_RATE)
    }
}

/// Where a quoted rate came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuoteOrigin {
    Fetched,
    Override,
    /// Lookup failed; carries the warning shown to the user
    Fallback(String),
}

/// A rate and its origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateQuote {
    pub value: f64,
    pub origin: QuoteOrigin,
}

impl RateQuote {
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, QuoteOrigin::Fallback(_))
    }
}

/// Spot prices keyed by asset id, empty when the lookup failed
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpotQuotes {
    pub prices: HashMap<String, f64>,
    pub warning: Option<String>,
}

/// Rate provider for one simulation session
///
/// Each lookup reaches the source at most once; later calls return the
/// memoized quote. Create a new provider to refresh.
pub struct RateProvider<S: MarketDataSource> {
    source: S,
    daily_override: Option<f64>,
    index_override: Option<f64>,
    daily: OnceCell<RateQuote>,
    index: OnceCell<RateQuote>,
    spot: OnceCell<SpotQuotes>,
}

impl<S: MarketDataSource> RateProvider<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            daily_override: None,
            index_override: None,
            daily: OnceCell::new(),
            index: OnceCell::new(),
            spot: OnceCell::new(),
        }
    }

    /// Use a fixed daily reference rate (decimal fraction) instead of fetching
    pub fn with_daily_override(mut self, rate: Option<f64>) -> Self {
        self.daily_override = rate;
        self
    }

    /// Use a fixed monthly index rate (decimal fraction) instead of fetching
    pub fn with_index_override(mut self, rate: Option<f64>) -> Self {
        self.index_override = rate;
        self
    }

    /// Latest daily reference rate as a decimal fraction
    pub fn daily_reference_rate(&self) -> &RateQuote {
        self.daily.get_or_init(|| {
            self.quote(
                "CDI",
                CDI_SERIES,
                self.daily_override,
                FALLBACK_DAILY_REFERENCE_RATE,
                "0.39% a day",
            )
        })
    }

    /// Latest monthly price-index rate as a decimal fraction
    pub fn monthly_index_rate(&self) -> &RateQuote {
        self.index.get_or_init(|| {
            self.quote(
                "IPCA",
                IPCA_SERIES,
                self.index_override,
                FALLBACK_MONTHLY_INDEX_RATE,
                "0.40% a month",
            )
        })
    }

    /// Spot prices for the given assets, fetched once per session
    ///
    /// The asset list of the first call is the one that gets fetched.
    pub fn spot_prices(&self, asset_ids: &[&str]) -> &SpotQuotes {
        self.spot.get_or_init(|| match self.source.spot_prices(asset_ids) {
            Ok(prices) => SpotQuotes {
                prices,
                warning: None,
            },
            Err(e) => {
                let message = format!("Could not fetch spot prices ({e}); prices unavailable.");
                warn!("{message}");
                SpotQuotes {
                    prices: HashMap::new(),
                    warning: Some(message),
                }
            }
        })
    }

    pub fn snapshot(&self) -> RateSnapshot {
        RateSnapshot::new(
            self.daily_reference_rate().value,
            self.monthly_index_rate().value,
        )
    }

    /// Warnings collected from lookups made so far
    pub fn warnings(&self) -> Vec<String> {
        let rate_warnings = [self.daily.get(), self.index.get()]
            .into_iter()
            .flatten()
            .filter_map(|q| match &q.origin {
                QuoteOrigin::Fallback(msg) => Some(msg.clone()),
                _ => None,
            });
        let spot_warning = self.spot.get().and_then(|s| s.warning.clone());
        rate_warnings.chain(spot_warning).collect()
    }

    fn quote(
        &self,
        name: &str,
        series: u32,
        override_rate: Option<f64>,
        fallback: f64,
        fallback_desc: &str,
    ) -> RateQuote {
        if let Some(value) = override_rate {
            info!("{name} rate overridden: {value}");
            return RateQuote {
                value,
                origin: QuoteOrigin::Override,
            };
        }

        match self.source.latest_observation(series) {
            Ok(percent) => {
                let value = percent / 100.0;
                info!("{name} rate fetched from series {series}: {value}");
                RateQuote {
                    value,
                    origin: QuoteOrigin::Fetched,
                }
            }
            Err(e) => {
                let message =
                    format!("Could not fetch {name} ({e}); using default {fallback_desc}.");
                warn!("{message}");
                RateQuote {
                    value: fallback,
                    origin: QuoteOrigin::Fallback(message),
                }
            }
        }
    }
}
