//! CSV import provider.
//!
//! Reads `timestamp,open,high,low,close,volume` files. Timestamps may be
//! RFC 3339 (`2024-01-02T14:30:00Z`), `YYYY-MM-DD HH:MM:SS` (taken as UTC)
//! or a bare `YYYY-MM-DD` date. The requested period trims the file to its
//! trailing window; the interval is whatever the file holds.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::provider::{build_series, DataError, DataProvider, Interval, Period};
use tradeagent_core::domain::{Bar, BarSeries};

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

/// Bar series from a local CSV file.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    path: PathBuf,
}

impl CsvProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl DataProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch(
        &self,
        ticker: &str,
        period: Period,
        _interval: Interval,
    ) -> Result<BarSeries, DataError> {
        let file = std::fs::File::open(&self.path)?;
        let bars = read_bars(file)?;
        debug!(path = %self.path.display(), rows = bars.len(), "read CSV bars");
        let series = build_series(ticker, bars)?;
        trim_to_period(series, period)
    }
}

/// Parse every row of a CSV stream into bars (unsorted, unvalidated).
pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut bars = Vec::new();

    for (i, record) in rdr.deserialize::<CsvRow>().enumerate() {
        // Row 1 is the header.
        let row = i + 2;
        let r = record?;
        let timestamp = parse_timestamp(&r.timestamp).ok_or_else(|| DataError::InvalidRow {
            row,
            reason: format!("unrecognised timestamp '{}'", r.timestamp),
        })?;
        let volume = match r.volume {
            Some(v) if v.is_finite() && v >= 0.0 => v.round() as u64,
            Some(v) => {
                return Err(DataError::InvalidRow {
                    row,
                    reason: format!("invalid volume {v}"),
                })
            }
            None => 0,
        };
        bars.push(Bar {
            timestamp,
            open: r.open,
            high: r.high,
            low: r.low,
            close: r.close,
            volume,
        });
    }

    Ok(bars)
}

pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(ndt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(ndt.and_utc());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

/// Keep only bars inside `period`, measured back from the last bar.
fn trim_to_period(series: BarSeries, period: Period) -> Result<BarSeries, DataError> {
    let Some(last) = series.last().map(|b| b.timestamp) else {
        return Ok(series);
    };
    let Some(span) = period.span_ending(last) else {
        return Ok(series);
    };
    let cutoff = last - span;
    let ticker = series.symbol().to_string();
    let kept: Vec<Bar> = series
        .into_bars()
        .into_iter()
        .filter(|b| b.timestamp > cutoff)
        .collect();
    build_series(&ticker, kept)
}
