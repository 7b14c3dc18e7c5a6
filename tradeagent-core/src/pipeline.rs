//! Pipeline facade: bar series → indicators → signals → backtest.
//!
//! One synchronous call per request. Every derived series is recomputed
//! from the input on each invocation; nothing is cached or shared.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backtest::BacktestOutcome;
use crate::domain::{BarSeries, SignalValue};
use crate::error::PipelineError;
use crate::indicators::{IndicatorConfig, IndicatorFrame};
use crate::metrics::ReturnSummary;
use crate::signals::{self, RsiThresholds, Strategy};

pub use crate::backtest::run_backtest;

/// Default annualisation for summaries (daily bars).
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Indicators with the default windows.
pub fn compute_indicators(series: &BarSeries) -> IndicatorFrame {
    IndicatorFrame::compute_validated(series, &IndicatorConfig::default())
}

/// Signals for `strategy` with default windows and thresholds.
pub fn generate_signals(series: &BarSeries, strategy: Strategy) -> Vec<SignalValue> {
    let frame = compute_indicators(series);
    let rule = strategy.rule(RsiThresholds::default());
    signals::generate_signals(&frame, rule.as_ref())
}

/// A fully parameterised pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub indicators: IndicatorConfig,
    pub thresholds: RsiThresholds,
    pub strategy: Strategy,
    /// Sharpe annualisation factor for the summary.
    #[serde(default = "default_periods_per_year")]
    pub periods_per_year: f64,
}

fn default_periods_per_year() -> f64 {
    TRADING_DAYS_PER_YEAR
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(Strategy::default())
    }
}

/// Everything one pipeline invocation produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineOutput {
    pub strategy: Strategy,
    pub frame: IndicatorFrame,
    pub signals: Vec<SignalValue>,
    pub outcome: BacktestOutcome,
    pub summary: ReturnSummary,
}

impl Pipeline {
    pub fn new(strategy: Strategy) -> Self {
        Self {
            indicators: IndicatorConfig::default(),
            thresholds: RsiThresholds::default(),
            strategy,
            periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }

    pub fn with_indicators(mut self, indicators: IndicatorConfig) -> Self {
        self.indicators = indicators;
        self
    }

    pub fn with_thresholds(mut self, thresholds: RsiThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_periods_per_year(mut self, periods_per_year: f64) -> Self {
        self.periods_per_year = periods_per_year;
        self
    }

    pub fn validate(&self) -> Result<(), PipelineError> {
        self.indicators.validate()?;
        self.thresholds.validate()?;
        if !(self.periods_per_year > 0.0) {
            return Err(PipelineError::InvalidConfig(
                "periods_per_year must be positive".into(),
            ));
        }
        Ok(())
    }

    pub fn indicators(&self, series: &BarSeries) -> Result<IndicatorFrame, PipelineError> {
        self.validate()?;
        Ok(IndicatorFrame::compute_validated(series, &self.indicators))
    }

    pub fn signals(&self, frame: &IndicatorFrame) -> Vec<SignalValue> {
        let rule = self.strategy.rule(self.thresholds);
        signals::generate_signals(frame, rule.as_ref())
    }

    /// Run every stage over `series`.
    ///
    /// # Errors
    /// - `InvalidConfig` for bad windows or thresholds
    /// - `EmptySeries` when the series has fewer than 2 bars
    pub fn run(&self, series: &BarSeries) -> Result<PipelineOutput, PipelineError> {
        let frame = self.indicators(series)?;
        let signals = self.signals(&frame);
        let outcome = run_backtest(series, &signals)?;
        let summary = ReturnSummary::compute(&outcome, self.periods_per_year);
        debug!(
            symbol = series.symbol(),
            strategy = %self.strategy,
            latest = %outcome.latest_signal,
            strategy_return = summary.strategy_total_return,
            market_return = summary.market_total_return,
            "pipeline finished"
        );
        Ok(PipelineOutput {
            strategy: self.strategy,
            frame,
            signals,
            outcome,
            summary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::series_from_closes;

    fn zigzag(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.7).sin() * 8.0 + i as f64 * 0.1)
            .collect()
    }

    #[test]
    fn facade_matches_pipeline_defaults() {
        let series = series_from_closes("TEST", &zigzag(80)).unwrap();
        let pipeline = Pipeline::new(Strategy::TrendMomentumComposite);
        let out = pipeline.run(&series).unwrap();

        assert_eq!(out.frame, compute_indicators(&series));
        assert_eq!(
            out.signals,
            generate_signals(&series, Strategy::TrendMomentumComposite)
        );
        assert_eq!(out.outcome, run_backtest(&series, &out.signals).unwrap());
    }

    #[test]
    fn invalid_config_is_rejected_before_compute() {
        let series = series_from_closes("TEST", &zigzag(30)).unwrap();
        let pipeline = Pipeline::new(Strategy::MomentumOnly).with_thresholds(RsiThresholds {
            oversold: 90.0,
            overbought: 10.0,
        });
        assert!(matches!(
            pipeline.run(&series),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_periods_per_year_is_invalid() {
        let pipeline = Pipeline::new(Strategy::MomentumOnly).with_periods_per_year(0.0);
        assert!(pipeline.validate().is_err());
    }

    #[test]
    fn default_pipeline_is_valid() {
        let pipeline = Pipeline::new(Strategy::default());
        assert!(pipeline.validate().is_ok());
        assert_eq!(pipeline.periods_per_year, TRADING_DAYS_PER_YEAR);
    }
}
