//! Indicator engine.
//!
//! Indicators are pure functions: bar history in, numeric series out. They
//! are computed once per pipeline invocation and assembled into an
//! [`IndicatorFrame`] that the signal rules read by index.

pub mod ema;
pub mod frame;
pub mod macd;
pub mod rsi;
pub mod sma;

pub use ema::Ema;
pub use frame::{IndicatorConfig, IndicatorFrame, IndicatorSnapshot};
pub use macd::{Macd, MacdOutput};
pub use rsi::Rsi;
pub use sma::Sma;

use crate::domain::Bar;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce an output series of the
/// same length. Values inside the warm-up window are `None`, never a sentinel
/// number, so an undefined value cannot be compared as if it were real.
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "rsi_14").
    fn name(&self) -> &str;

    /// Number of leading bars whose output is `None`.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>>;
}

/// Create synthetic bars from close prices for testing.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    crate::domain::series_from_closes("TEST", closes)
        .unwrap()
        .into_bars()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
