//! Moving Average Convergence Divergence (MACD).
//!
//! Two outputs (separate Indicator instances, like a banded indicator):
//! - Line: EMA(close, fast) - EMA(close, slow)
//! - Signal: EMA(line, signal)
//!
//! Both EMAs are seeded at index 0, so neither output has a warm-up prefix.
//! Lookback: 0.

use super::ema::ema_of_series;
use super::Indicator;
use crate::domain::Bar;

/// Which MACD output to compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdOutput {
    Line,
    Signal,
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    signal: usize,
    output: MacdOutput,
    name: String,
}

impl Macd {
    pub fn line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_output(fast, slow, signal, MacdOutput::Line)
    }

    pub fn signal_line(fast: usize, slow: usize, signal: usize) -> Self {
        Self::with_output(fast, slow, signal, MacdOutput::Signal)
    }

    fn with_output(fast: usize, slow: usize, signal: usize, output: MacdOutput) -> Self {
        assert!(fast >= 1 && slow >= 1 && signal >= 1, "MACD spans must be >= 1");
        let prefix = match output {
            MacdOutput::Line => "macd",
            MacdOutput::Signal => "macd_signal",
        };
        Self {
            fast,
            slow,
            signal,
            output,
            name: format!("{prefix}_{fast}_{slow}_{signal}"),
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let (line, signal) = macd_of_series(&closes, self.fast, self.slow, self.signal);
        let out = match self.output {
            MacdOutput::Line => line,
            MacdOutput::Signal => signal,
        };
        out.into_iter().map(Some).collect()
    }
}

/// MACD line and signal line for an arbitrary series.
pub fn macd_of_series(
    values: &[f64],
    fast: usize,
    slow: usize,
    signal: usize,
) -> (Vec<f64>, Vec<f64>) {
    let fast_ema = ema_of_series(values, fast);
    let slow_ema = ema_of_series(values, slow);
    let line: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal_line = ema_of_series(&line, signal);
    (line, signal_line)
}
