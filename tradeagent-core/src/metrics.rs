//! Return metrics: pure functions over the backtest's cumulative curves.
//!
//! Every metric is a pure function: growth curve and/or position list in,
//! scalar out. Growth curves are the cumulative return series (1.0 = start).

use serde::{Deserialize, Serialize};

use crate::backtest::BacktestOutcome;
use crate::domain::SignalValue;

/// Scalar summary of one backtest, market vs strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnSummary {
    pub market_total_return: f64,
    pub strategy_total_return: f64,
    /// strategy_total_return - market_total_return.
    pub excess_return: f64,
    pub market_max_drawdown: f64,
    pub strategy_max_drawdown: f64,
    pub strategy_sharpe: f64,
    /// Fraction of bars with a non-flat position.
    pub exposure: f64,
    pub position_changes: usize,
}

impl ReturnSummary {
    /// Summarise an outcome. `periods_per_year` annualises the Sharpe ratio
    /// (252 for daily bars, 252 * 78 for 5-minute bars, ...).
    pub fn compute(outcome: &BacktestOutcome, periods_per_year: f64) -> Self {
        let market_total_return = total_return(&outcome.cumulative_market_returns);
        let strategy_total_return = total_return(&outcome.cumulative_strategy_returns);
        Self {
            market_total_return,
            strategy_total_return,
            excess_return: strategy_total_return - market_total_return,
            market_max_drawdown: max_drawdown(&outcome.cumulative_market_returns),
            strategy_max_drawdown: max_drawdown(&outcome.cumulative_strategy_returns),
            strategy_sharpe: sharpe_ratio(&outcome.strategy_returns, periods_per_year),
            exposure: exposure(&outcome.positions),
            position_changes: position_changes(&outcome.positions),
        }
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Total return of a growth curve seeded at 1.0.
pub fn total_return(growth: &[f64]) -> f64 {
    growth.last().map_or(0.0, |g| g - 1.0)
}

/// Maximum drawdown as a negative fraction (e.g., -0.25 = 25% drawdown).
///
/// The running peak starts at 1.0, the value every curve is seeded from.
pub fn max_drawdown(growth: &[f64]) -> f64 {
    let mut peak = 1.0_f64;
    let mut max_dd = 0.0_f64;
    for &g in growth {
        peak = peak.max(g);
        if peak > 0.0 {
            max_dd = max_dd.min((g - peak) / peak);
        }
    }
    max_dd
}

/// Annualized Sharpe ratio of per-step returns (zero risk-free rate).
///
/// Returns 0.0 if variance is zero or fewer than 2 returns.
pub fn sharpe_ratio(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(returns);
    let std = std_dev(returns);
    if std < 1e-15 {
        return 0.0;
    }
    (mean / std) * periods_per_year.sqrt()
}

/// Fraction of bars holding a long or short position.
pub fn exposure(positions: &[SignalValue]) -> f64 {
    if positions.is_empty() {
        return 0.0;
    }
    let active = positions.iter().filter(|p| !p.is_flat()).count();
    active as f64 / positions.len() as f64
}

/// Number of bars where the position differs from the previous bar.
pub fn position_changes(positions: &[SignalValue]) -> usize {
    positions.windows(2).filter(|w| w[0] != w[1]).count()
}

fn mean_f64(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1).
fn std_dev(values: &[f64]) -> f64 {
    let mean = mean_f64(values);
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use SignalValue::{Flat, Long, Short};

    #[test]
    fn total_return_of_curve() {
        assert!((total_return(&[1.0, 1.1, 1.21]) - 0.21).abs() < 1e-12);
        assert_eq!(total_return(&[]), 0.0);
    }

    #[test]
    fn drawdown_known_path() {
        // Peak 1.2, trough 0.9 → -25%
        let dd = max_drawdown(&[1.0, 1.2, 0.9, 1.1]);
        assert!((dd + 0.25).abs() < 1e-12);
    }

    #[test]
    fn drawdown_counts_loss_from_seed() {
        let dd = max_drawdown(&[1.0, 0.8]);
        assert!((dd + 0.2).abs() < 1e-12);
    }

    #[test]
    fn monotonic_curve_has_no_drawdown() {
        assert_eq!(max_drawdown(&[1.0, 1.01, 1.02, 1.05]), 0.0);
    }

    #[test]
    fn sharpe_zero_for_constant_returns() {
        assert_eq!(sharpe_ratio(&[0.01, 0.01, 0.01], 252.0), 0.0);
        assert_eq!(sharpe_ratio(&[0.01], 252.0), 0.0);
    }

    #[test]
    fn sharpe_sign_follows_mean() {
        assert!(sharpe_ratio(&[0.02, -0.01, 0.03, 0.0], 252.0) > 0.0);
        assert!(sharpe_ratio(&[-0.02, 0.01, -0.03, 0.0], 252.0) < 0.0);
    }

    #[test]
    fn exposure_and_changes() {
        let positions = [Flat, Long, Long, Short, Flat];
        assert!((exposure(&positions) - 0.6).abs() < 1e-12);
        assert_eq!(position_changes(&positions), 3);
        assert_eq!(exposure(&[]), 0.0);
    }
}
