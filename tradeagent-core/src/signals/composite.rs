//! Trend + MACD + RSI composite rule.
//!
//! Long when the fast SMA is above the slow SMA, the MACD line is above its
//! signal line, and RSI is below the overbought level. Short on the mirrored
//! inequalities with RSI above the oversold level. Flat otherwise.

use super::{RsiThresholds, SignalRule};
use crate::domain::SignalValue;
use crate::indicators::IndicatorSnapshot;

#[derive(Debug, Clone)]
pub struct TrendMomentumComposite {
    thresholds: RsiThresholds,
}

impl TrendMomentumComposite {
    pub fn new(thresholds: RsiThresholds) -> Self {
        Self { thresholds }
    }
}

impl Default for TrendMomentumComposite {
    fn default() -> Self {
        Self::new(RsiThresholds::default())
    }
}

impl SignalRule for TrendMomentumComposite {
    fn name(&self) -> &str {
        "sma_macd_rsi"
    }

    fn evaluate(&self, s: &IndicatorSnapshot) -> SignalValue {
        // Warm-up guard: every input must be defined.
        let (Some(fast), Some(slow), Some(macd), Some(signal), Some(rsi)) =
            (s.fast_sma, s.slow_sma, s.macd, s.macd_signal, s.rsi)
        else {
            return SignalValue::Flat;
        };

        if fast > slow && macd > signal && rsi < self.thresholds.overbought {
            SignalValue::Long
        } else if fast < slow && macd < signal && rsi > self.thresholds.oversold {
            SignalValue::Short
        } else {
            SignalValue::Flat
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(fast: f64, slow: f64, macd: f64, signal: f64, rsi: f64) -> IndicatorSnapshot {
        IndicatorSnapshot {
            fast_sma: Some(fast),
            slow_sma: Some(slow),
            fast_ema: Some(fast),
            slow_ema: Some(slow),
            macd: Some(macd),
            macd_signal: Some(signal),
            rsi: Some(rsi),
        }
    }

    #[test]
    fn long_when_all_bullish_and_not_overbought() {
        let rule = TrendMomentumComposite::default();
        assert_eq!(rule.evaluate(&snapshot(105.0, 100.0, 1.0, 0.5, 55.0)), SignalValue::Long);
    }

    #[test]
    fn overbought_gates_long_to_flat() {
        let rule = TrendMomentumComposite::default();
        assert_eq!(rule.evaluate(&snapshot(105.0, 100.0, 1.0, 0.5, 70.0)), SignalValue::Flat);
        assert_eq!(rule.evaluate(&snapshot(105.0, 100.0, 1.0, 0.5, 100.0)), SignalValue::Flat);
    }

    #[test]
    fn short_when_all_bearish_and_not_oversold() {
        let rule = TrendMomentumComposite::default();
        assert_eq!(rule.evaluate(&snapshot(95.0, 100.0, -1.0, -0.5, 45.0)), SignalValue::Short);
    }

    #[test]
    fn oversold_gates_short_to_flat() {
        let rule = TrendMomentumComposite::default();
        assert_eq!(rule.evaluate(&snapshot(95.0, 100.0, -1.0, -0.5, 30.0)), SignalValue::Flat);
    }

    #[test]
    fn mixed_conditions_are_flat() {
        let rule = TrendMomentumComposite::default();
        // Trend up, MACD down.
        assert_eq!(rule.evaluate(&snapshot(105.0, 100.0, -1.0, 0.5, 50.0)), SignalValue::Flat);
        // Equal averages never count as a trend.
        assert_eq!(rule.evaluate(&snapshot(100.0, 100.0, 1.0, 0.5, 50.0)), SignalValue::Flat);
    }

    #[test]
    fn undefined_input_is_flat() {
        let rule = TrendMomentumComposite::default();
        let mut s = snapshot(105.0, 100.0, 1.0, 0.5, 50.0);
        s.slow_sma = None;
        assert_eq!(rule.evaluate(&s), SignalValue::Flat);

        let mut s = snapshot(95.0, 100.0, -1.0, -0.5, 50.0);
        s.rsi = None;
        assert_eq!(rule.evaluate(&s), SignalValue::Flat);
    }

    #[test]
    fn custom_thresholds_apply() {
        let rule = TrendMomentumComposite::new(RsiThresholds {
            oversold: 20.0,
            overbought: 80.0,
        });
        assert_eq!(rule.evaluate(&snapshot(105.0, 100.0, 1.0, 0.5, 75.0)), SignalValue::Long);
    }
}
