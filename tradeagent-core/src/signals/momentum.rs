//! RSI-only mean reversion rule: long when oversold, short when overbought.

use super::{RsiThresholds, SignalRule};
use crate::domain::SignalValue;
use crate::indicators::IndicatorSnapshot;

#[derive(Debug, Clone, Default)]
pub struct MomentumOnly {
    thresholds: RsiThresholds,
}

impl MomentumOnly {
    pub fn new(thresholds: RsiThresholds) -> Self {
        Self { thresholds }
    }
}

impl SignalRule for MomentumOnly {
    fn name(&self) -> &str {
        "rsi_only"
    }

    fn evaluate(&self, s: &IndicatorSnapshot) -> SignalValue {
        match s.rsi {
            Some(rsi) if rsi < self.thresholds.oversold => SignalValue::Long,
            Some(rsi) if rsi > self.thresholds.overbought => SignalValue::Short,
            _ => SignalValue::Flat,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_rsi(rsi: Option<f64>) -> IndicatorSnapshot {
        IndicatorSnapshot {
            rsi,
            ..IndicatorSnapshot::default()
        }
    }

    #[test]
    fn thresholds_are_strict() {
        let rule = MomentumOnly::default();
        assert_eq!(rule.evaluate(&with_rsi(Some(29.9))), SignalValue::Long);
        assert_eq!(rule.evaluate(&with_rsi(Some(30.0))), SignalValue::Flat);
        assert_eq!(rule.evaluate(&with_rsi(Some(70.0))), SignalValue::Flat);
        assert_eq!(rule.evaluate(&with_rsi(Some(70.1))), SignalValue::Short);
    }

    #[test]
    fn ignores_trend_columns() {
        let rule = MomentumOnly::default();
        let s = IndicatorSnapshot {
            fast_sma: Some(1.0),
            slow_sma: Some(100.0),
            rsi: Some(50.0),
            ..IndicatorSnapshot::default()
        };
        assert_eq!(rule.evaluate(&s), SignalValue::Flat);
    }

    #[test]
    fn undefined_rsi_is_flat() {
        assert_eq!(MomentumOnly::default().evaluate(&with_rsi(None)), SignalValue::Flat);
    }
}
