//! Market data sources: central-bank time series and crypto spot prices

use std::collections::HashMap;
use std::time::Duration;

use log::debug;
use serde::Deserialize;

use crate::error::RateError;

/// Central-bank series id of the daily CDI rate
pub const CDI_SERIES: u32 = 12;

/// Central-bank series id of the monthly IPCA rate
pub const IPCA_SERIES: u32 = 433;

/// Endpoints and limits for market data requests
#[derive(Debug, Clone)]
pub struct MarketDataConfig {
    /// Time-series URL template; `{series}` is replaced by the series id
    pub series_url: String,
    /// Spot price endpoint (without query string)
    pub spot_url: String,
    /// Quote currency for spot prices
    pub vs_currency: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            series_url: "https://api.bcb.gov.br/dados/serie/bcdata.sgs.{series}/dados/ultimos/1?formato=json"
                .to_string(),
            spot_url: "https://api.coingecko.com/api/v3/simple/price".to_string(),
            vs_currency: "brl".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Anything that can answer market data lookups
///
/// `latest_observation` returns the raw published value, in percentage
/// points. Unit conversion happens in the rate provider.
pub trait MarketDataSource {
    fn latest_observation(&self, series: u32) -> Result<f64, RateError>;

    fn spot_prices(&self, asset_ids: &[&str]) -> Result<HashMap<String, f64>, RateError>;
}

impl<T: MarketDataSource + ?Sized> MarketDataSource for Box<T> {
    fn latest_observation(&self, series: u32) -> Result<f64, RateError> {
        (**self).latest_observation(series)
    }

    fn spot_prices(&self, asset_ids: &[&str]) -> Result<HashMap<String, f64>, RateError> {
        (**self).spot_prices(asset_ids)
    }
}

/// One observation of a central-bank series
#[derive(Debug, Deserialize)]
struct SeriesObservation {
    #[serde(rename = "data")]
    _date: Option<String>,
    #[serde(rename = "valor")]
    value: String,
}

/// Parse the body of a time-series response, taking the first observation
pub fn parse_series_body(series: u32, body: &str) -> Result<f64, RateError> {
    let observations: Vec<SeriesObservation> =
        serde_json::from_str(body).map_err(|e| RateError::Malformed(e.to_string()))?;

    let first = observations.first().ok_or(RateError::EmptySeries(series))?;

    // The API publishes "0,055131" in some formats and "0.055131" in others
    let normalized = first.value.trim().replace(',', ".");
    normalized.parse::<f64>().ok().filter(|v| v.is_finite()).ok_or_else(|| {
        RateError::Parse {
            series,
            value: first.value.clone(),
        }
    })
}

/// Parse a spot price response of the form `{"bitcoin": {"brl": 123.4}}`
pub fn parse_spot_body(
    body: &str,
    asset_ids: &[&str],
    vs_currency: &str,
) -> Result<HashMap<String, f64>, RateError> {
    let value: serde_json::Value =
        serde_json::from_str(body).map_err(|e| RateError::Malformed(e.to_string()))?;

    let mut prices = HashMap::new();
    for id in asset_ids {
        let price = value
            .get(id)
            .and_then(|entry| entry.get(vs_currency))
            .and_then(|p| p.as_f64());
        match price {
            Some(p) => {
                prices.insert(id.to_string(), p);
            }
            None => debug!("no {vs_currency} price for {id} in spot response"),
        }
    }

    if prices.is_empty() && !asset_ids.is_empty() {
        return Err(RateError::Malformed(format!(
            "no {vs_currency} prices for {}",
            asset_ids.join(",")
        )));
    }

    Ok(prices)
}

/// Blocking HTTP client for the public endpoints
pub struct HttpMarketData {
    client: reqwest::blocking::Client,
    config: MarketDataConfig,
}

impl HttpMarketData {
    pub fn new(config: MarketDataConfig) -> Result<Self, RateError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("investment_simulator/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client, config })
    }

    fn get_text(&self, url: &str) -> Result<String, RateError> {
        debug!("GET {url}");
        let response = self.client.get(url).send()?.error_for_status()?;
        Ok(response.text()?)
    }
}

impl MarketDataSource for HttpMarketData {
    fn latest_observation(&self, series: u32) -> Result<f64, RateError> {
        let url = self.config.series_url.replace("{series}", &series.to_string());
        let body = self.get_text(&url)?;
        parse_series_body(series, &body)
    }

    fn spot_prices(&self, asset_ids: &[&str]) -> Result<HashMap<String, f64>, RateError> {
        let url = format!(
            "{}?ids={}&vs_currencies={}",
            self.config.spot_url,
            asset_ids.join(","),
            self.config.vs_currency
        );
        let body = self.get_text(&url)?;
        parse_spot_body(&body, asset_ids, &self.config.vs_currency)
    }
}

/// Source that never reaches the network
///
/// Every lookup fails with [`RateError::Offline`], so the provider falls
/// back to its documented defaults.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineMarketData;

impl MarketDataSource for OfflineMarketData {
    fn latest_observation(&self, _series: u32) -> Result<f64, RateError> {
        Err(RateError::Offline)
    }

    fn spot_prices(&self, _asset_ids: &[&str]) -> Result<HashMap<String, f64>, RateError> {
        Err(RateError::Offline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_series_first_observation() {
        let body = r#"[{"data":"16/10/2026","valor":"0.055131"},{"data":"17/10/2026","valor":"9"}]"#;
        let value = parse_series_body(CDI_SERIES, body).unwrap();
        assert!((value - 0.055131).abs() < 1e-12);
    }

    #[test]
    fn test_parse_series_comma_decimal() {
        let body = r#"[{"data":"01/09/2026","valor":"0,44"}]"#;
        let value = parse_series_body(IPCA_SERIES, body).unwrap();
        assert!((value - 0.44).abs() < 1e-12);
    }

    #[test]
    fn test_parse_series_failures() {
        assert!(matches!(parse_series_body(12, "[]"), Err(RateError::EmptySeries(12))));
        assert!(matches!(parse_series_body(12, "<html>"), Err(RateError::Malformed(_))));
        assert!(matches!(
            parse_series_body(12, r#"[{"data":"x","valor":"n/a"}]"#),
            Err(RateError::Parse { series: 12, .. })
        ));
        assert!(matches!(parse_series_body(12, r#"[{"data":"x"}]"#), Err(RateError::Malformed(_))));
    }

    #[test]
    fn test_parse_spot_named_keys() {
        let body = r#"{"bitcoin":{"brl":612345.5},"ethereum":{"brl":21000}}"#;
        let prices = parse_spot_body(body, &["bitcoin", "ethereum", "solana"], "brl").unwrap();
        assert_eq!(prices.len(), 2);
        assert_eq!(prices["bitcoin"], 612345.5);
        assert_eq!(prices["ethereum"], 21000.0);
        assert!(!prices.contains_key("solana"));
    }

    #[test]
    fn test_parse_spot_missing_currency() {
        let body = r#"{"bitcoin":{"usd":100000}}"#;
        assert!(parse_spot_body(body, &["bitcoin"], "brl").is_err());
    }

    #[test]
    fn test_offline_source_fails() {
        assert!(matches!(OfflineMarketData.latest_observation(CDI_SERIES), Err(RateError::Offline)));
        assert!(OfflineMarketData.spot_prices(&["bitcoin"]).is_err());
    }
}
