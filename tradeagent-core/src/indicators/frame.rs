//! Indicator frame: every derived series the signal rules read, aligned 1:1
//! with the bar series.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::macd::macd_of_series;
use super::{Ema, Indicator, Rsi, Sma};
use crate::domain::BarSeries;
use crate::error::PipelineError;

/// Window lengths for every indicator in the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorConfig {
    pub fast_sma: usize,
    pub slow_sma: usize,
    pub fast_ema: usize,
    pub slow_ema: usize,
    pub signal_span: usize,
    pub rsi_period: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            fast_sma: 5,
            slow_sma: 20,
            fast_ema: 12,
            slow_ema: 26,
            signal_span: 9,
            rsi_period: 14,
        }
    }
}

impl IndicatorConfig {
    pub fn validate(&self) -> Result<(), PipelineError> {
        let windows = [
            ("fast_sma", self.fast_sma),
            ("slow_sma", self.slow_sma),
            ("fast_ema", self.fast_ema),
            ("slow_ema", self.slow_ema),
            ("signal_span", self.signal_span),
            ("rsi_period", self.rsi_period),
        ];
        for (name, value) in windows {
            if value == 0 {
                return Err(PipelineError::InvalidConfig(format!("{name} must be >= 1")));
            }
        }
        if self.fast_sma >= self.slow_sma {
            return Err(PipelineError::InvalidConfig(format!(
                "fast_sma ({}) must be shorter than slow_sma ({})",
                self.fast_sma, self.slow_sma
            )));
        }
        if self.fast_ema >= self.slow_ema {
            return Err(PipelineError::InvalidConfig(format!(
                "fast_ema ({}) must be shorter than slow_ema ({})",
                self.fast_ema, self.slow_ema
            )));
        }
        Ok(())
    }

    /// Bars needed before every column of the frame is defined.
    ///
    /// The EMAs and MACD never have an undefined prefix; RSI needs `period`
    /// changes and therefore `period + 1` bars.
    pub fn required_bars(&self) -> usize {
        self.fast_sma
            .max(self.slow_sma)
            .max(self.rsi_period + 1)
    }

    pub fn check_warmup(&self, available: usize) -> Result<(), PipelineError> {
        let required = self.required_bars();
        if available < required {
            return Err(PipelineError::InsufficientData {
                required,
                available,
            });
        }
        Ok(())
    }
}

/// Indicator values at a single bar. `None` means "not yet defined".
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub fast_sma: Option<f64>,
    pub slow_sma: Option<f64>,
    pub fast_ema: Option<f64>,
    pub slow_ema: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub rsi: Option<f64>,
}

/// Derived series aligned with a bar series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorFrame {
    pub config: IndicatorConfig,
    pub fast_sma: Vec<Option<f64>>,
    pub slow_sma: Vec<Option<f64>>,
    pub fast_ema: Vec<Option<f64>>,
    pub slow_ema: Vec<Option<f64>>,
    pub macd: Vec<Option<f64>>,
    pub macd_signal: Vec<Option<f64>>,
    pub rsi: Vec<Option<f64>>,
}

impl IndicatorFrame {
    /// Compute every column for `series`.
    ///
    /// A series shorter than the warm-up window is not an error here: the
    /// affected columns come back filled with `None`.
    ///
    /// # Errors
    /// `InvalidConfig` when `config` fails [`IndicatorConfig::validate`].
    pub fn compute(series: &BarSeries, config: &IndicatorConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self::compute_validated(series, config))
    }

    /// `config` must already have passed validation.
    pub(crate) fn compute_validated(series: &BarSeries, config: &IndicatorConfig) -> Self {
        let bars = series.bars();
        if let Err(err) = config.check_warmup(bars.len()) {
            debug!(symbol = series.symbol(), %err, "padding indicator frame");
        }

        let (macd, macd_signal) = macd_of_series(
            &series.closes(),
            config.fast_ema,
            config.slow_ema,
            config.signal_span,
        );

        Self {
            config: *config,
            fast_sma: Sma::new(config.fast_sma).compute(bars),
            slow_sma: Sma::new(config.slow_sma).compute(bars),
            fast_ema: Ema::new(config.fast_ema).compute(bars),
            slow_ema: Ema::new(config.slow_ema).compute(bars),
            macd: macd.into_iter().map(Some).collect(),
            macd_signal: macd_signal.into_iter().map(Some).collect(),
            rsi: Rsi::new(config.rsi_period).compute(bars),
        }
    }

    pub fn len(&self) -> usize {
        self.rsi.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rsi.is_empty()
    }

    /// Values at `index`; all `None` past the end of the frame.
    pub fn snapshot(&self, index: usize) -> IndicatorSnapshot {
        IndicatorSnapshot {
            fast_sma: value_at(&self.fast_sma, index),
            slow_sma: value_at(&self.slow_sma, index),
            fast_ema: value_at(&self.fast_ema, index),
            slow_ema: value_at(&self.slow_ema, index),
            macd: value_at(&self.macd, index),
            macd_signal: value_at(&self.macd_signal, index),
            rsi: value_at(&self.rsi, index),
        }
    }

    /// Column names paired with their series, in display order.
    pub fn columns(&self) -> [(&'static str, &[Option<f64>]); 7] {
        [
            ("fast_sma", self.fast_sma.as_slice()),
            ("slow_sma", self.slow_sma.as_slice()),
            ("fast_ema", self.fast_ema.as_slice()),
            ("slow_ema", self.slow_ema.as_slice()),
            ("macd", self.macd.as_slice()),
            ("macd_signal", self.macd_signal.as_slice()),
            ("rsi", self.rsi.as_slice()),
        ]
    }
}

fn value_at(col: &[Option<f64>], index: usize) -> Option<f64> {
    col.get(index).copied().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series_from_closes;

    #[test]
    fn default_windows_match_classic_setup() {
        let cfg = IndicatorConfig::default();
        assert_eq!((cfg.fast_sma, cfg.slow_sma), (5, 20));
        assert_eq!((cfg.fast_ema, cfg.slow_ema, cfg.signal_span), (12, 26, 9));
        assert_eq!(cfg.rsi_period, 14);
        assert_eq!(cfg.required_bars(), 20);
    }

    #[test]
    fn required_bars_accounts_for_rsi_change_window() {
        let cfg = IndicatorConfig {
            rsi_period: 30,
            ..IndicatorConfig::default()
        };
        assert_eq!(cfg.required_bars(), 31);
    }

    #[test]
    fn validate_rejects_zero_and_inverted_windows() {
        let zero = IndicatorConfig {
            rsi_period: 0,
            ..IndicatorConfig::default()
        };
        assert!(matches!(zero.validate(), Err(PipelineError::InvalidConfig(_))));

        let inverted = IndicatorConfig {
            fast_sma: 30,
            ..IndicatorConfig::default()
        };
        assert!(inverted.validate().is_err());
        assert!(IndicatorConfig::default().validate().is_ok());
    }

    #[test]
    fn check_warmup_reports_shortfall() {
        let cfg = IndicatorConfig::default();
        assert_eq!(
            cfg.check_warmup(10),
            Err(PipelineError::InsufficientData {
                required: 20,
                available: 10
            })
        );
        assert!(cfg.check_warmup(20).is_ok());
    }

    #[test]
    fn frame_is_aligned_with_series() {
        let closes: Vec<f64> = (0..25).map(|i| 100.0 + i as f64).collect();
        let series = series_from_closes("TEST", &closes).unwrap();
        let frame = IndicatorFrame::compute(&series, &IndicatorConfig::default()).unwrap();
        assert_eq!(frame.len(), 25);
        for (name, col) in frame.columns() {
            assert_eq!(col.len(), 25, "column {name} misaligned");
        }
    }

    #[test]
    fn invalid_config_is_an_error_not_a_panic() {
        let series = series_from_closes("TEST", &[1.0, 2.0, 3.0]).unwrap();
        let zero = IndicatorConfig {
            fast_sma: 0,
            ..IndicatorConfig::default()
        };
        assert!(matches!(
            IndicatorFrame::compute(&series, &zero),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn macd_columns_match_macd_indicators() {
        use crate::indicators::Macd;

        let closes: Vec<f64> = (0..40).map(|i| 100.0 + (i as f64 * 0.4).sin() * 3.0).collect();
        let series = series_from_closes("TEST", &closes).unwrap();
        let frame = IndicatorFrame::compute(&series, &IndicatorConfig::default()).unwrap();
        assert_eq!(frame.macd, Macd::line(12, 26, 9).compute(series.bars()));
        assert_eq!(frame.macd_signal, Macd::signal_line(12, 26, 9).compute(series.bars()));
    }

    #[test]
    fn snapshot_past_end_is_undefined() {
        let series = series_from_closes("TEST", &[1.0, 2.0]).unwrap();
        let frame = IndicatorFrame::compute(&series, &IndicatorConfig::default()).unwrap();
        assert_eq!(frame.snapshot(5), IndicatorSnapshot::default());
        assert_eq!(frame.snapshot(0).fast_ema, Some(1.0));
    }
}
