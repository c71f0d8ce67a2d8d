//! Illustrative monthly return samples for the simulated crypto-assets
//!
//! Samples can also be loaded from a CSV file with `asset,return` rows.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use log::{debug, info};
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::error::{EngineResult, SimulationError};

pub const BITCOIN: &str = "bitcoin";
pub const ETHEREUM: &str = "ethereum";
pub const SOLANA: &str = "solana";

/// Asset ids with a built-in sample, in display order
pub const BUILTIN_ASSETS: [&str; 3] = [BITCOIN, ETHEREUM, SOLANA];

/// Lower-case identifier of a volatile asset (e.g. `bitcoin`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AssetId(String);

impl AssetId {
    pub fn new(id: impl AsRef<str>) -> Self {
        Self(id.as_ref().trim().to_ascii_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_builtin(&self) -> bool {
        BUILTIN_ASSETS.contains(&self.0.as_str())
    }

    /// Capitalized name for tables and sheet labels
    pub fn display_name(&self) -> String {
        let mut chars = self.0.chars();
        match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fixed ordered sample of monthly returns for one asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetReturnSample {
    pub asset: String,
    pub returns: Vec<f64>,
}

impl AssetReturnSample {
    pub fn new(asset: impl Into<String>, returns: Vec<f64>) -> Self {
        Self {
            asset: asset.into(),
            returns,
        }
    }

    /// Arithmetic mean of the returns
    pub fn mean(&self) -> f64 {
        if self.returns.is_empty() {
            return 0.0;
        }
        self.returns.iter().sum::<f64>() / self.returns.len() as f64
    }

    /// Population standard deviation of the returns
    pub fn std_dev(&self) -> f64 {
        if self.returns.is_empty() {
            return 0.0;
        }
        let mean = self.mean();
        let variance = self
            .returns
            .iter()
            .map(|r| (r - mean).powi(2))
            .sum::<f64>()
            / self.returns.len() as f64;
        variance.sqrt()
    }

    /// Normal distribution with the sample's first two moments
    pub fn distribution(&self) -> EngineResult<Normal<f64>> {
        Normal::new(self.mean(), self.std_dev()).map_err(|e| SimulationError::Distribution {
            asset: self.asset.clone(),
            reason: e.to_string(),
        })
    }
}

/// Return samples keyed by asset id, with a default for unknown assets
#[derive(Debug, Clone)]
pub struct AssetSamples {
    samples: HashMap<AssetId, AssetReturnSample>,
    default: AssetReturnSample,
}

impl AssetSamples {
    /// Built-in illustrative samples (twelve months each)
    pub fn builtin() -> Self {
        let mut samples = HashMap::new();
        for sample in [
            AssetReturnSample::new(
                BITCOIN,
                vec![0.12, -0.08, 0.25, -0.15, 0.05, 0.18, -0.10, 0.07, 0.30, -0.20, 0.10, 0.02],
            ),
            AssetReturnSample::new(
                ETHEREUM,
                vec![0.15, -0.12, 0.30, -0.20, 0.08, 0.22, -0.15, 0.10, 0.35, -0.25, 0.12, 0.01],
            ),
            AssetReturnSample::new(
                SOLANA,
                vec![0.25, -0.20, 0.45, -0.30, 0.10, 0.35, -0.25, 0.15, 0.60, -0.35, 0.20, -0.05],
            ),
        ] {
            samples.insert(AssetId::new(&sample.asset), sample);
        }

        Self {
            samples,
            default: Self::default_sample(),
        }
    }

    /// Sample used for any asset without its own entry
    pub fn default_sample() -> AssetReturnSample {
        AssetReturnSample::new(
            "default",
            vec![0.05, -0.03, 0.08, -0.05, 0.02, 0.06, -0.04, 0.03, 0.10, -0.07, 0.04, 0.01],
        )
    }

    /// Sample for an asset, falling back to the default sample
    pub fn get(&self, asset: &AssetId) -> &AssetReturnSample {
        match self.samples.get(asset) {
            Some(sample) => sample,
            None => {
                debug!("no return sample for {asset}, using default sample");
                &self.default
            }
        }
    }

    pub fn contains(&self, asset: &AssetId) -> bool {
        self.samples.contains_key(asset)
    }

    /// Add or replace a sample
    pub fn insert(&mut self, sample: AssetReturnSample) {
        self.samples.insert(AssetId::new(&sample.asset), sample);
    }

    /// Asset ids with their own sample, sorted
    pub fn asset_ids(&self) -> Vec<AssetId> {
        let mut ids: Vec<AssetId> = self.samples.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Built-in samples overridden by the assets listed in a CSV file
    pub fn from_csv_path(path: &Path) -> EngineResult<Self> {
        let file = File::open(path)?;
        let samples = Self::from_csv_reader(file)?;
        info!("loaded return samples from {}", path.display());
        Ok(samples)
    }

    /// Built-in samples overridden by CSV rows of `asset,return`
    ///
    /// Returns for the same asset keep their file order. An asset named
    /// `default` replaces the fallback sample.
    pub fn from_csv_reader<R: Read>(reader: R) -> EngineResult<Self> {
        let mut reader = csv::Reader::from_reader(reader);
        let mut loaded: Vec<AssetReturnSample> = Vec::new();

        for (line, result) in reader.records().enumerate() {
            let record = result?;
            if record.len() < 2 {
                return Err(SimulationError::MalformedSamples(format!(
                    "row {} has {} columns, expected 2",
                    line + 1,
                    record.len()
                )));
            }

            let asset = AssetId::new(&record[0]);
            let value: f64 = record[1].trim().parse().map_err(|_| {
                SimulationError::MalformedSamples(format!(
                    "row {}: '{}' is not a return",
                    line + 1,
                    &record[1]
                ))
            })?;

            match loaded.iter_mut().find(|s| s.asset == asset.as_str()) {
                Some(sample) => sample.returns.push(value),
                None => loaded.push(AssetReturnSample::new(asset.as_str(), vec![value])),
            }
        }

        let mut samples = Self::builtin();
        for sample in loaded {
            debug!("{}: {} returns loaded", sample.asset, sample.returns.len());
            if sample.asset == "default" {
                samples.default = sample;
            } else {
                samples.insert(sample);
            }
        }
        Ok(samples)
    }
}

impl Default for AssetSamples {
    fn default() -> Self {
        Self::builtin()
    }
}
