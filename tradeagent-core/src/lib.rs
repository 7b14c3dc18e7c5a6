//! TradeAgent Core: bar series, indicators, strategy signals and the
//! delayed-position backtest.
//!
//! This crate is pure computation:
//! - Domain types (bars, validated series, signal values)
//! - Indicators (SMA, EMA, MACD, RSI) aligned 1:1 with the input bars
//! - Signal rules evaluated per bar over an indicator snapshot
//! - Backtest that holds yesterday's signal over today's return
//!
//! Market data, configuration files and reports live in `tradeagent-runner`.

pub mod backtest;
pub mod domain;
pub mod error;
pub mod indicators;
pub mod metrics;
pub mod pipeline;
pub mod signals;

pub use backtest::{run_backtest, BacktestOutcome};
pub use domain::{Bar, BarError, BarSeries, SignalValue};
pub use error::PipelineError;
pub use indicators::{IndicatorConfig, IndicatorFrame, IndicatorSnapshot};
pub use metrics::ReturnSummary;
pub use pipeline::{compute_indicators, generate_signals, Pipeline, PipelineOutput};
pub use signals::{RsiThresholds, SignalRule, Strategy};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: pipeline types can cross thread boundaries.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<Bar>();
        require_sync::<Bar>();
        require_send::<BarSeries>();
        require_sync::<BarSeries>();
        require_send::<SignalValue>();
        require_sync::<SignalValue>();

        require_send::<IndicatorFrame>();
        require_sync::<IndicatorFrame>();
        require_send::<Pipeline>();
        require_sync::<Pipeline>();
        require_send::<PipelineOutput>();
        require_sync::<PipelineOutput>();
        require_send::<PipelineError>();
        require_sync::<PipelineError>();

        require_send::<signals::TrendMomentumComposite>();
        require_sync::<signals::TrendMomentumComposite>();
        require_send::<signals::MomentumOnly>();
        require_sync::<signals::MomentumOnly>();
        require_send::<Box<dyn SignalRule>>();
        require_sync::<Box<dyn SignalRule>>();
    }

    /// Signal rules see one bar's indicator values and nothing else: no bar
    /// history, no position. If the trait grows a parameter, this breaks.
    #[test]
    fn signal_rule_sees_only_a_snapshot() {
        fn _check_trait_object_builds(
            rule: &dyn SignalRule,
            snapshot: &IndicatorSnapshot,
        ) -> SignalValue {
            rule.evaluate(snapshot)
        }
    }
}
