//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (span + 1).
//! Seed: EMA[0] = close[0]. There is no undefined prefix; the MACD line and
//! its signal line are built on this seeding and depend on it.
//! Lookback: 0.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        assert!(span >= 1, "EMA span must be >= 1");
        Self {
            span,
            name: format!("ema_{span}"),
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        ema_of_series(&closes, self.span)
            .into_iter()
            .map(Some)
            .collect()
    }
}

/// Smoothing factor for a given span.
pub fn alpha(span: usize) -> f64 {
    2.0 / (span as f64 + 1.0)
}

/// Compute raw EMA values from a pre-extracted f64 slice.
/// Used by MACD for the EMA of the MACD line.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let a = alpha(span);
    let mut result = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;
    for &v in values {
        let ema = match prev {
            None => v,
            Some(p) => a * v + (1.0 - a) * p,
        };
        result.push(ema);
        prev = Some(ema);
    }
    result
}
