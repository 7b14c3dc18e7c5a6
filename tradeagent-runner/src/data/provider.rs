//! Data provider trait, lookback/bar-size enums and structured error types.
//!
//! The DataProvider trait abstracts over data sources (Yahoo Finance, CSV
//! import, synthetic) so we can swap implementations and mock for tests.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use tradeagent_core::domain::{Bar, BarError, BarSeries};
use tradeagent_core::PipelineError;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no bars returned for '{symbol}'")]
    EmptyResult { symbol: String },

    #[error("malformed bars for '{symbol}': {source}")]
    MalformedBars {
        symbol: String,
        #[source]
        source: BarError,
    },

    #[error("invalid CSV row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// True when the provider answered but handed back nothing usable.
    pub fn is_empty_result(&self) -> bool {
        matches!(
            self,
            DataError::EmptyResult { .. } | DataError::MalformedBars { .. }
        )
    }

    /// Map to the core taxonomy: empty or malformed results become
    /// `EmptySeries`, every other failure is `DataUnavailable`.
    pub fn into_pipeline(self) -> PipelineError {
        if self.is_empty_result() {
            PipelineError::EmptySeries { len: 0 }
        } else {
            PipelineError::DataUnavailable(self.to_string())
        }
    }
}

/// Where the data came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    #[default]
    Yahoo,
    Csv,
    Synthetic,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Yahoo => "yahoo",
            DataSource::Csv => "csv",
            DataSource::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DataSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yahoo" => Ok(DataSource::Yahoo),
            "csv" => Ok(DataSource::Csv),
            "synthetic" => Ok(DataSource::Synthetic),
            other => Err(format!(
                "unknown data source '{other}'. Valid: yahoo, csv, synthetic"
            )),
        }
    }
}

/// How far back to fetch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[default]
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Period {
    pub const ALL: [Period; 11] = [
        Period::OneDay,
        Period::FiveDays,
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
        Period::TenYears,
        Period::YearToDate,
        Period::Max,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneDay => "1d",
            Period::FiveDays => "5d",
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
            Period::TenYears => "10y",
            Period::YearToDate => "ytd",
            Period::Max => "max",
        }
    }

    /// Calendar span ending at `end`. `None` means unbounded (`max`).
    pub fn span_ending(&self, end: chrono::DateTime<chrono::Utc>) -> Option<Duration> {
        use chrono::{Datelike, TimeZone, Utc};

        let days = match self {
            Period::OneDay => 1,
            Period::FiveDays => 5,
            Period::OneMonth => 30,
            Period::ThreeMonths => 91,
            Period::SixMonths => 182,
            Period::OneYear => 365,
            Period::TwoYears => 730,
            Period::FiveYears => 1826,
            Period::TenYears => 3652,
            Period::YearToDate => {
                let jan1 = Utc.with_ymd_and_hms(end.year(), 1, 1, 0, 0, 0).single()?;
                return Some(end - jan1);
            }
            Period::Max => return None,
        };
        Some(Duration::days(days))
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Period::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| {
                format!("unknown period '{s}'. Valid: 1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max")
            })
    }
}

/// Bar size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "2m")]
    TwoMinutes,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "60m")]
    SixtyMinutes,
    #[serde(rename = "90m")]
    NinetyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[default]
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "5d")]
    FiveDays,
    #[serde(rename = "1wk")]
    OneWeek,
    #[serde(rename = "1mo")]
    OneMonth,
    #[serde(rename = "3mo")]
    ThreeMonths,
}

/// Regular US session length in minutes.
const SESSION_MINUTES: i64 = 390;
const TRADING_DAYS_PER_YEAR: f64 = 252.0;

impl Interval {
    pub const ALL: [Interval; 13] = [
        Interval::OneMinute,
        Interval::TwoMinutes,
        Interval::FiveMinutes,
        Interval::FifteenMinutes,
        Interval::ThirtyMinutes,
        Interval::SixtyMinutes,
        Interval::NinetyMinutes,
        Interval::OneHour,
        Interval::OneDay,
        Interval::FiveDays,
        Interval::OneWeek,
        Interval::OneMonth,
        Interval::ThreeMonths,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMinute => "1m",
            Interval::TwoMinutes => "2m",
            Interval::FiveMinutes => "5m",
            Interval::FifteenMinutes => "15m",
            Interval::ThirtyMinutes => "30m",
            Interval::SixtyMinutes => "60m",
            Interval::NinetyMinutes => "90m",
            Interval::OneHour => "1h",
            Interval::OneDay => "1d",
            Interval::FiveDays => "5d",
            Interval::OneWeek => "1wk",
            Interval::OneMonth => "1mo",
            Interval::ThreeMonths => "3mo",
        }
    }

    /// Nominal bar length. Months are approximated as 30 and 91 days.
    pub fn step(&self) -> Duration {
        match self {
            Interval::OneMinute => Duration::minutes(1),
            Interval::TwoMinutes => Duration::minutes(2),
            Interval::FiveMinutes => Duration::minutes(5),
            Interval::FifteenMinutes => Duration::minutes(15),
            Interval::ThirtyMinutes => Duration::minutes(30),
            Interval::SixtyMinutes | Interval::OneHour => Duration::minutes(60),
            Interval::NinetyMinutes => Duration::minutes(90),
            Interval::OneDay => Duration::days(1),
            Interval::FiveDays => Duration::days(5),
            Interval::OneWeek => Duration::weeks(1),
            Interval::OneMonth => Duration::days(30),
            Interval::ThreeMonths => Duration::days(91),
        }
    }

    pub fn is_intraday(&self) -> bool {
        self.step() < Duration::days(1)
    }

    /// Bars per trading year, for annualising return statistics.
    pub fn periods_per_year(&self) -> f64 {
        match self {
            Interval::OneDay => TRADING_DAYS_PER_YEAR,
            Interval::FiveDays => TRADING_DAYS_PER_YEAR / 5.0,
            Interval::OneWeek => 52.0,
            Interval::OneMonth => 12.0,
            Interval::ThreeMonths => 4.0,
            intraday => {
                let per_session = SESSION_MINUTES as f64 / intraday.step().num_minutes() as f64;
                TRADING_DAYS_PER_YEAR * per_session
            }
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Interval::ALL
            .into_iter()
            .find(|i| i.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown interval '{s}'. Valid: 1m, 2m, 5m, 15m, 30m, 60m, 90m, 1h, 1d, 5d, 1wk, 1mo, 3mo"
                )
            })
    }
}

/// Trait for bar series providers.
///
/// Implementations handle the specifics of one source. An empty or
/// malformed result is reported as `EmptyResult`/`MalformedBars`, never as
/// a series the pipeline would choke on.
pub trait DataProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch bars for `ticker` covering `period` at `interval` resolution.
    fn fetch(&self, ticker: &str, period: Period, interval: Interval)
        -> Result<BarSeries, DataError>;
}

/// Sort, de-duplicate and validate raw bars into a series.
///
/// Bars sharing a timestamp keep the first occurrence.
pub fn build_series(ticker: &str, mut bars: Vec<Bar>) -> Result<BarSeries, DataError> {
    if bars.is_empty() {
        return Err(DataError::EmptyResult {
            symbol: ticker.to_string(),
        });
    }
    bars.sort_by_key(|b| b.timestamp);
    bars.dedup_by_key(|b| b.timestamp);
    BarSeries::new(ticker, bars).map_err(|source| DataError::MalformedBars {
        symbol: ticker.to_string(),
        source,
    })
}
