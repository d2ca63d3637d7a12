//! Scan configuration loaded from TOML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration:
//!
//! ```toml
//! [store]
//! kind = "csv"            # or "parquet"
//! path = "prices.csv"
//!
//! [warmup]
//! daily_buffer_days = 250
//! weekly_buffer_days = 600
//! latest_daily_extra_days = 30
//! latest_weekly_extra_days = 100
//!
//! [scan]
//! parallel = true
//! horizons = [5, 10, 20, 60]
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use signalscan_core::data::{CsvStore, ParquetStore};
use signalscan_core::PriceStore;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("reading config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serializing config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    Csv,
    Parquet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub kind: StoreKind,
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::Csv,
            path: PathBuf::from("prices.csv"),
        }
    }
}

impl StoreConfig {
    pub fn open(&self) -> Box<dyn PriceStore> {
        match self.kind {
            StoreKind::Csv => Box::new(CsvStore::new(&self.path)),
            StoreKind::Parquet => Box::new(ParquetStore::new(&self.path)),
        }
    }
}

/// Calendar-day buffers that pull the fetch start back far enough for the
/// moving averages to warm up.
///
/// These are calendar approximations of trading-day counts. Long holiday
/// clusters can still leave the earliest requested rows under-warmed; such
/// rows carry undefined indicators and simply do not signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarmupConfig {
    pub daily_buffer_days: u32,
    pub weekly_buffer_days: u32,
    pub latest_daily_extra_days: u32,
    pub latest_weekly_extra_days: u32,
}

impl Default for WarmupConfig {
    fn default() -> Self {
        Self {
            daily_buffer_days: 250,
            weekly_buffer_days: 600,
            latest_daily_extra_days: 30,
            latest_weekly_extra_days: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    /// Evaluate securities on the rayon pool.
    pub parallel: bool,
    /// Forward horizons, in bars of the strategy's granularity.
    pub horizons: Vec<usize>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            parallel: true,
            horizons: vec![5, 10, 20, 60],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub store: StoreConfig,
    pub warmup: WarmupConfig,
    pub scan: ScanSettings,
}

impl ScanConfig {
    /// Load and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: ScanConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let horizons = &self.scan.horizons;
        if horizons.is_empty() {
            return Err(ConfigError::Invalid("scan.horizons must not be empty".into()));
        }
        if horizons.contains(&0) {
            return Err(ConfigError::Invalid("scan.horizons must be positive".into()));
        }
        if horizons.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Invalid(
                "scan.horizons must be strictly increasing".into(),
            ));
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("store.path must not be empty".into()));
        }
        Ok(())
    }
}
