//! Backtest simulator: signal series to position series to cumulative returns.
//!
//! Execution model: the position held over bar `i` is the signal computed at
//! bar `i-1` (one-bar delay, position at bar 0 is flat). Position size is
//! always exactly -1, 0 or +1; no costs, sizing or leverage.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{BarSeries, SignalValue};
use crate::error::PipelineError;

/// Everything the backtest derives from one bar series and its signals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOutcome {
    /// Signal delayed by one bar.
    pub positions: Vec<SignalValue>,
    /// close[i] / close[i-1] - 1, with 0 at index 0.
    pub returns: Vec<f64>,
    /// position[i] * returns[i].
    pub strategy_returns: Vec<f64>,
    pub cumulative_market_returns: Vec<f64>,
    pub cumulative_strategy_returns: Vec<f64>,
    /// Signal at the final bar, not delayed: the decision for the next bar.
    pub latest_signal: SignalValue,
}

impl BacktestOutcome {
    pub fn len(&self) -> usize {
        self.returns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.returns.is_empty()
    }

    /// Final value of the cumulative market curve (1.0 = unchanged).
    pub fn final_market_growth(&self) -> f64 {
        self.cumulative_market_returns.last().copied().unwrap_or(1.0)
    }

    /// Final value of the cumulative strategy curve (1.0 = unchanged).
    pub fn final_strategy_growth(&self) -> f64 {
        self.cumulative_strategy_returns.last().copied().unwrap_or(1.0)
    }
}

/// Run the backtest for `series` under `signals`.
///
/// # Errors
/// - `EmptySeries` when the series has fewer than 2 bars
/// - `SignalLengthMismatch` when `signals` is not aligned with `series`
pub fn run_backtest(
    series: &BarSeries,
    signals: &[SignalValue],
) -> Result<BacktestOutcome, PipelineError> {
    if series.len() < 2 {
        return Err(PipelineError::EmptySeries { len: series.len() });
    }
    if signals.len() != series.len() {
        return Err(PipelineError::SignalLengthMismatch {
            bars: series.len(),
            signals: signals.len(),
        });
    }

    let positions = delayed_positions(signals);
    let returns = pct_returns(&series.closes());
    let strategy_returns: Vec<f64> = positions
        .iter()
        .zip(&returns)
        .map(|(p, r)| p.as_f64() * r)
        .collect();
    let cumulative_market_returns = cumulative_returns(&returns);
    let cumulative_strategy_returns = cumulative_returns(&strategy_returns);
    let latest_signal = signals.last().copied().unwrap_or_default();

    debug!(
        symbol = series.symbol(),
        bars = series.len(),
        %latest_signal,
        "backtest complete"
    );

    Ok(BacktestOutcome {
        positions,
        returns,
        strategy_returns,
        cumulative_market_returns,
        cumulative_strategy_returns,
        latest_signal,
    })
}

/// Shift `signals` forward by one bar, flat at index 0.
pub fn delayed_positions(signals: &[SignalValue]) -> Vec<SignalValue> {
    if signals.is_empty() {
        return Vec::new();
    }
    std::iter::once(SignalValue::Flat)
        .chain(signals[..signals.len() - 1].iter().copied())
        .collect()
}

/// Per-step fractional change, 0 at index 0.
pub fn pct_returns(closes: &[f64]) -> Vec<f64> {
    if closes.is_empty() {
        return Vec::new();
    }
    std::iter::once(0.0)
        .chain(closes.windows(2).map(|w| w[1] / w[0] - 1.0))
        .collect()
}

/// Running product of (1 + r). The curve starts from 1.0 and the return at
/// index 0 is applied to it, so a series whose first return is 0 (as every
/// `pct_returns` output is) has `cum[0] == 1.0`.
pub fn cumulative_returns(returns: &[f64]) -> Vec<f64> {
    returns
        .iter()
        .scan(1.0, |acc, r| {
            *acc *= 1.0 + r;
            Some(*acc)
        })
        .collect()
}
