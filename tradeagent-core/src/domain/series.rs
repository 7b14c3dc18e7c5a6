//! Bar series: the validated, time-ordered input to the pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::bar::{Bar, BarError};

/// Ordered bars for one instrument.
///
/// Construction validates the series invariants once, so every downstream
/// stage can index freely:
/// - timestamps strictly increasing
/// - no NaN or infinite price fields
/// - `close > 0` (per-step returns divide by the previous close)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSeries {
    symbol: String,
    bars: Vec<Bar>,
}

impl BarSeries {
    pub fn new(symbol: impl Into<String>, bars: Vec<Bar>) -> Result<Self, BarError> {
        for (index, bar) in bars.iter().enumerate() {
            if bar.is_void() {
                return Err(BarError::VoidBar { index });
            }
            if !bar.is_finite() {
                return Err(BarError::NonFiniteBar { index });
            }
            if bar.close <= 0.0 {
                return Err(BarError::NonPositiveClose {
                    index,
                    close: bar.close,
                });
            }
            if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
                return Err(BarError::NonIncreasingTimestamp {
                    index,
                    timestamp: bar.timestamp,
                });
            }
        }
        Ok(Self {
            symbol: symbol.into(),
            bars,
        })
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Bar> {
        self.bars.get(index)
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    /// Close prices in series order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn timestamps(&self) -> Vec<DateTime<Utc>> {
        self.bars.iter().map(|b| b.timestamp).collect()
    }

    /// Index of the bar stamped exactly `timestamp`, if any.
    pub fn position_of(&self, timestamp: DateTime<Utc>) -> Option<usize> {
        self.bars
            .binary_search_by_key(&timestamp, |b| b.timestamp)
            .ok()
    }

    pub fn get_at(&self, timestamp: DateTime<Utc>) -> Option<&Bar> {
        self.position_of(timestamp).map(|i| &self.bars[i])
    }

    pub fn into_bars(self) -> Vec<Bar> {
        self.bars
    }
}

/// Build a validated daily series from close prices, for tests and benches.
///
/// open = previous close (or close on the first bar), high/low = max/min of
/// open and close ± 1.0, volume = 1000, one bar per day from 2024-01-02.
pub fn series_from_closes(symbol: &str, closes: &[f64]) -> Result<BarSeries, BarError> {
    use chrono::TimeZone;

    let base = Utc
        .with_ymd_and_hms(2024, 1, 2, 0, 0, 0)
        .single()
        .unwrap_or_default();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000,
            }
        })
        .collect();
    BarSeries::new(symbol, bars)
}
