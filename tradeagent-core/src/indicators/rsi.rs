//! Relative Strength Index (RSI).
//!
//! Simple (unsmoothed) trailing means of gains and losses over the last
//! `period` one-step close changes.
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! Lookback: period (the first change exists at index 1).
//! Edge case: avg_loss == 0 → RSI = 100, including a window with no movement.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    name: String,
}

impl Rsi {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "RSI period must be >= 1");
        Self {
            period,
            name: format!("rsi_{period}"),
        }
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, bars: &[Bar]) -> Vec<Option<f64>> {
        let n = bars.len();
        let mut result = vec![None; n];

        if n < self.period + 1 {
            return result;
        }

        // changes[j] = close[j+1] - close[j]
        let changes: Vec<f64> = bars.windows(2).map(|w| w[1].close - w[0].close).collect();

        for (offset, window) in changes.windows(self.period).enumerate() {
            let (gain_sum, loss_sum) = window.iter().fold((0.0, 0.0), |(g, l), &ch| {
                if ch > 0.0 {
                    (g + ch, l)
                } else {
                    (g, l - ch)
                }
            });
            let avg_gain = gain_sum / self.period as f64;
            let avg_loss = loss_sum / self.period as f64;
            result[offset + self.period] = Some(compute_rsi(avg_gain, avg_loss));
        }

        result
    }
}

fn compute_rsi(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}
