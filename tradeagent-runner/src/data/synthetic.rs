//! Deterministic synthetic bars for offline development and tests.
//!
//! A random walk from 100.0, seeded from the ticker via BLAKE3 so the same
//! ticker always yields the same series. Timestamps step by the requested
//! interval back from a fixed anchor; daily bars skip weekends and intraday
//! bars stay inside the 14:30 to 21:00 UTC regular session.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{build_series, DataError, DataProvider, Interval, Period};
use tradeagent_core::domain::{Bar, BarSeries};

/// Upper bound on generated bars, so `max` at one-minute resolution stays bounded.
pub const MAX_SYNTHETIC_BARS: usize = 20_000;

pub struct SyntheticProvider {
    anchor: DateTime<Utc>,
}

impl SyntheticProvider {
    /// Series end at `anchor` (the last bar is at or before it).
    pub fn new(anchor: DateTime<Utc>) -> Self {
        Self { anchor }
    }

    pub fn anchor(&self) -> DateTime<Utc> {
        self.anchor
    }
}

impl Default for SyntheticProvider {
    fn default() -> Self {
        let anchor = Utc
            .with_ymd_and_hms(2024, 12, 31, 21, 0, 0)
            .single()
            .unwrap_or_default();
        Self::new(anchor)
    }
}

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        ticker: &str,
        period: Period,
        interval: Interval,
    ) -> Result<BarSeries, DataError> {
        let timestamps = synthetic_timestamps(self.anchor, period, interval);
        build_series(ticker, random_walk(ticker, &timestamps, interval))
    }
}

/// 14:30 to 21:00 UTC, in minutes since midnight.
const SESSION_MINUTES: std::ops::Range<u32> = 870..1260;

fn in_session(ts: DateTime<Utc>) -> bool {
    SESSION_MINUTES.contains(&(ts.hour() * 60 + ts.minute()))
}

fn is_weekend(ts: DateTime<Utc>) -> bool {
    matches!(ts.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Ascending timestamps covering `period` back from `anchor`.
fn synthetic_timestamps(
    anchor: DateTime<Utc>,
    period: Period,
    interval: Interval,
) -> Vec<DateTime<Utc>> {
    let step = interval.step();
    let start = period.span_ending(anchor).map(|span| anchor - span);

    let mut out = Vec::new();
    let mut t = anchor;
    while out.len() < MAX_SYNTHETIC_BARS {
        if start.is_some_and(|s| t <= s) {
            break;
        }
        let keep = if interval.is_intraday() {
            !is_weekend(t) && in_session(t)
        } else if interval == Interval::OneDay {
            !is_weekend(t)
        } else {
            true
        };
        if keep {
            out.push(t);
        }
        t -= step;
    }
    out.reverse();
    out
}

fn random_walk(ticker: &str, timestamps: &[DateTime<Utc>], interval: Interval) -> Vec<Bar> {
    // Deterministic seed from ticker name
    let seed: [u8; 32] = *blake3::hash(ticker.as_bytes()).as_bytes();
    let mut rng = StdRng::from_seed(seed);

    // Per-bar move scaled to the bar length relative to one day.
    let days = interval.step().num_minutes() as f64 / (24.0 * 60.0);
    let amplitude = (0.03 * days.sqrt()).clamp(0.001, 0.15);

    let mut price = 100.0_f64;
    timestamps
        .iter()
        .map(|&timestamp| {
            let ret: f64 = rng.gen_range(-amplitude..amplitude);
            let open = price;
            let close = (price * (1.0 + ret)).max(0.01);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..amplitude / 3.0));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..amplitude / 3.0));
            let volume = rng.gen_range(500_000..5_000_000u64);
            price = close;
            Bar {
                timestamp,
                open,
                high,
                low,
                close,
                volume,
            }
        })
        .collect()
}
