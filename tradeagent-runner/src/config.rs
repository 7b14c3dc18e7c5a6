//! Agent configuration, loaded from TOML.
//!
//! ```toml
//! [data]
//! ticker = "AAPL"
//! source = "yahoo"        # yahoo | csv | synthetic
//! period = "6mo"
//! interval = "1d"
//! live_period = "5d"
//! live_interval = "5m"
//!
//! [indicators]
//! fast_sma = 5
//! slow_sma = 20
//!
//! [strategy]
//! kind = "sma_macd_rsi"   # or "rsi_only"
//! oversold = 30.0
//! overbought = 70.0
//!
//! [output]
//! dir = "results"
//! ```
//!
//! Every section and field is optional. No credentials are read.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use tradeagent_core::{IndicatorConfig, Pipeline, RsiThresholds, Strategy};

use crate::data::{DataSource, Interval, Period};

/// Errors from loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Complete agent configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub data: DataConfig,
    pub indicators: IndicatorConfig,
    pub strategy: StrategyConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// `None` until the user picks a ticker.
    pub ticker: Option<String>,
    pub source: DataSource,
    /// Required when `source = "csv"`.
    pub csv_path: Option<PathBuf>,
    /// Lookback for the historical backtest.
    pub period: Period,
    pub interval: Interval,
    /// Lookback for the latest-signal check.
    pub live_period: Period,
    pub live_interval: Interval,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            ticker: None,
            source: DataSource::Yahoo,
            csv_path: None,
            period: Period::SixMonths,
            interval: Interval::OneDay,
            live_period: Period::FiveDays,
            live_interval: Interval::FiveMinutes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyConfig {
    pub kind: Strategy,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        let thresholds = RsiThresholds::default();
        Self {
            kind: Strategy::default(),
            oversold: thresholds.oversold,
            overbought: thresholds.overbought,
        }
    }
}

impl StrategyConfig {
    pub fn thresholds(&self) -> RsiThresholds {
        RsiThresholds {
            oversold: self.oversold,
            overbought: self.overbought,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root directory for saved artifacts.
    pub dir: PathBuf,
    /// Sharpe annualisation. Derived from the interval when absent.
    pub periods_per_year: Option<f64>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("results"),
            periods_per_year: None,
        }
    }
}

impl AgentConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline(self.data.interval)
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        if let Some(ticker) = &self.data.ticker {
            if ticker.trim().is_empty() {
                return Err(ConfigError::Invalid("ticker must not be blank".into()));
            }
        }
        if self.data.source == DataSource::Csv && self.data.csv_path.is_none() {
            return Err(ConfigError::Invalid(
                "source = \"csv\" requires csv_path".into(),
            ));
        }
        Ok(())
    }

    /// The selected ticker, trimmed and upper-cased. `None` when unset or blank.
    pub fn ticker(&self) -> Option<String> {
        self.data
            .ticker
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_ascii_uppercase)
    }

    /// Pipeline for bars of the given interval.
    pub fn pipeline(&self, interval: Interval) -> Pipeline {
        let periods_per_year = self
            .output
            .periods_per_year
            .unwrap_or_else(|| interval.periods_per_year());
        Pipeline::new(self.strategy.kind)
            .with_indicators(self.indicators)
            .with_thresholds(self.strategy.thresholds())
            .with_periods_per_year(periods_per_year)
    }
}
