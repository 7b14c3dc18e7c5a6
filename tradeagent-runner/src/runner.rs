//! Analysis runner: wires a data provider, the core pipeline and the view
//! states the presentation layer renders.
//!
//! Entry points:
//! - `run_analysis()`: historical backtest over the configured period/interval.
//! - `latest_signal()`: the live check over the short live period/interval.
//! - `resolve_view()`: never fails; folds every outcome into a [`ViewState`].

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use tradeagent_core::{
    BacktestOutcome, BarSeries, PipelineError, ReturnSummary, SignalValue, Strategy,
};

use crate::config::{AgentConfig, ConfigError};
use crate::data::{DataError, DataProvider, Interval, Period};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("no ticker selected")]
    NoTicker,
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] DataError),
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Complete result of one historical analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub ticker: String,
    pub strategy: Strategy,
    /// Provider name the bars came from.
    pub source: String,
    pub period: Period,
    pub interval: Interval,
    pub bar_count: usize,
    /// Bars needed before every indicator is defined.
    pub warmup_bars: usize,
    pub first_timestamp: DateTime<Utc>,
    pub last_timestamp: DateTime<Utc>,
    pub timestamps: Vec<DateTime<Utc>>,
    pub closes: Vec<f64>,
    pub signals: Vec<SignalValue>,
    pub outcome: BacktestOutcome,
    pub summary: ReturnSummary,
    /// BLAKE3 over the input bars.
    pub dataset_hash: String,
}

impl AnalysisReport {
    pub fn latest_signal(&self) -> SignalValue {
        self.outcome.latest_signal
    }

    /// BUY / SELL / HOLD for the latest signal.
    pub fn action(&self) -> &'static str {
        self.outcome.latest_signal.action_label()
    }
}

/// Run the configured pipeline over an already fetched series.
pub fn analyze_series(
    config: &AgentConfig,
    series: &BarSeries,
    period: Period,
    interval: Interval,
    source: &str,
) -> Result<AnalysisReport, RunError> {
    let pipeline = config.pipeline(interval);
    let started = Instant::now();
    let output = pipeline.run(series)?;
    debug!(
        ticker = series.symbol(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "pipeline complete"
    );

    // run() rejects series shorter than 2 bars, so both ends exist.
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return Err(PipelineError::EmptySeries { len: series.len() }.into());
    };

    Ok(AnalysisReport {
        schema_version: SCHEMA_VERSION,
        ticker: series.symbol().to_string(),
        strategy: output.strategy,
        source: source.to_string(),
        period,
        interval,
        bar_count: series.len(),
        warmup_bars: pipeline.indicators.required_bars(),
        first_timestamp: first.timestamp,
        last_timestamp: last.timestamp,
        timestamps: series.timestamps(),
        closes: series.closes(),
        signals: output.signals,
        outcome: output.outcome,
        summary: output.summary,
        dataset_hash: compute_dataset_hash(series),
    })
}

/// Fetch the configured period/interval and run the backtest.
///
/// Fetch failures arrive as `RunError::Pipeline`: empty or malformed results
/// as `EmptySeries`, anything else as `DataUnavailable`.
pub fn run_analysis(
    config: &AgentConfig,
    provider: &dyn DataProvider,
) -> Result<AnalysisReport, RunError> {
    let ticker = config.ticker().ok_or(RunError::NoTicker)?;
    let (period, interval) = (config.data.period, config.data.interval);

    let series = fetch_logged(provider, &ticker, period, interval)
        .map_err(|e| RunError::Pipeline(e.into_pipeline()))?;
    let report = analyze_series(config, &series, period, interval, provider.name())?;

    info!(
        ticker = %report.ticker,
        strategy = %report.strategy,
        bars = report.bar_count,
        strategy_return = report.summary.strategy_total_return,
        market_return = report.summary.market_total_return,
        action = report.action(),
        "analysis complete"
    );
    Ok(report)
}

/// The trading decision at the most recent bar of the live window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveSignal {
    pub ticker: String,
    pub strategy: Strategy,
    pub period: Period,
    pub interval: Interval,
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    pub signal: SignalValue,
    /// BUY / SELL / HOLD.
    pub action: String,
}

/// Fetch the live period/interval and report the signal at the final bar.
///
/// A live window shorter than the indicator warm-up is `InsufficientData`
/// rather than a HOLD read off undefined indicators.
pub fn latest_signal(
    config: &AgentConfig,
    provider: &dyn DataProvider,
) -> Result<LiveSignal, RunError> {
    let ticker = config.ticker().ok_or(RunError::NoTicker)?;
    let (period, interval) = (config.data.live_period, config.data.live_interval);

    let series = fetch_logged(provider, &ticker, period, interval)
        .map_err(|e| RunError::Pipeline(e.into_pipeline()))?;

    let required = config.indicators.required_bars().max(2);
    if series.len() < required {
        return Err(PipelineError::InsufficientData {
            required,
            available: series.len(),
        }
        .into());
    }

    let pipeline = config.pipeline(interval);
    let output = pipeline.run(&series)?;

    let Some(last) = series.last() else {
        return Err(PipelineError::EmptySeries { len: 0 }.into());
    };
    let signal = output.outcome.latest_signal;
    info!(ticker = %ticker, %signal, close = last.close, "live signal");

    Ok(LiveSignal {
        ticker,
        strategy: output.strategy,
        period,
        interval,
        timestamp: last.timestamp,
        close: last.close,
        signal,
        action: signal.action_label().to_string(),
    })
}

fn fetch_logged(
    provider: &dyn DataProvider,
    ticker: &str,
    period: Period,
    interval: Interval,
) -> Result<BarSeries, DataError> {
    let started = Instant::now();
    let result = provider.fetch(ticker, period, interval);
    let elapsed_ms = started.elapsed().as_millis() as u64;
    match &result {
        Ok(series) => info!(
            provider = provider.name(),
            ticker,
            %period,
            %interval,
            bars = series.len(),
            elapsed_ms,
            "fetched bars"
        ),
        Err(e) => warn!(provider = provider.name(), ticker, error = %e, elapsed_ms, "fetch failed"),
    }
    result
}

/// What the presentation layer should show.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    /// No ticker selected yet.
    NoTicker,
    /// Ticker selected but the provider returned nothing usable.
    NoData { ticker: String, reason: String },
    /// Bars arrived but fewer than the indicator warm-up needs.
    InsufficientData {
        ticker: String,
        required: usize,
        available: usize,
    },
    Ready(Box<AnalysisReport>),
}

impl ViewState {
    /// User-facing message, distinct per state.
    pub fn message(&self) -> String {
        match self {
            ViewState::NoTicker => {
                "Search for a company and select a ticker to run the analysis.".to_string()
            }
            ViewState::NoData { ticker, reason } => {
                format!("No data available for {ticker}: {reason}")
            }
            ViewState::InsufficientData {
                ticker,
                required,
                available,
            } => format!(
                "Not enough data for {ticker}: {available} bar(s) loaded, {required} needed \
                 before indicators are defined. Choose a longer period."
            ),
            ViewState::Ready(report) => format!(
                "{}: {} ({} strategy, {} bars)",
                report.ticker,
                report.action(),
                report.strategy,
                report.bar_count
            ),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, ViewState::Ready(_))
    }
}

/// Fetch and analyse, folding every failure into a view state.
pub fn resolve_view(config: &AgentConfig, provider: &dyn DataProvider) -> ViewState {
    let Some(ticker) = config.ticker() else {
        return ViewState::NoTicker;
    };
    let (period, interval) = (config.data.period, config.data.interval);
    let fetched = fetch_logged(provider, &ticker, period, interval);
    resolve_fetched(config, &ticker, fetched, period, interval, provider.name())
}

/// Fold an already completed fetch into a view state.
pub fn resolve_fetched(
    config: &AgentConfig,
    ticker: &str,
    fetched: Result<BarSeries, DataError>,
    period: Period,
    interval: Interval,
    source: &str,
) -> ViewState {
    let series = match fetched {
        Ok(series) if series.is_empty() => {
            return ViewState::NoData {
                ticker: ticker.to_string(),
                reason: "provider returned no bars".into(),
            }
        }
        Ok(series) => series,
        Err(e) => {
            return ViewState::NoData {
                ticker: ticker.to_string(),
                reason: e.to_string(),
            }
        }
    };

    let required = config.indicators.required_bars().max(2);
    if series.len() < required {
        return ViewState::InsufficientData {
            ticker: ticker.to_string(),
            required,
            available: series.len(),
        };
    }

    match analyze_series(config, &series, period, interval, source) {
        Ok(report) => ViewState::Ready(Box::new(report)),
        Err(e) => ViewState::NoData {
            ticker: ticker.to_string(),
            reason: e.to_string(),
        },
    }
}

/// Deterministic BLAKE3 hash over the symbol and every bar.
pub fn compute_dataset_hash(series: &BarSeries) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(series.symbol().as_bytes());
    for bar in series.bars() {
        hasher.update(&bar.timestamp.timestamp().to_le_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tradeagent_core::domain::series_from_closes;

    fn closes(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.4).sin() * 6.0 + i as f64 * 0.05)
            .collect()
    }

    fn config_with_ticker(ticker: &str) -> AgentConfig {
        let mut config = AgentConfig::default();
        config.data.ticker = Some(ticker.into());
        config
    }

    #[test]
    fn analyze_series_fills_report() {
        let series = series_from_closes("AAPL", &closes(60)).unwrap();
        let report = analyze_series(
            &AgentConfig::default(),
            &series,
            Period::SixMonths,
            Interval::OneDay,
            "test",
        )
        .unwrap();

        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.bar_count, 60);
        assert_eq!(report.warmup_bars, 20);
        assert_eq!(report.signals.len(), 60);
        assert_eq!(report.timestamps.len(), 60);
        assert_eq!(report.first_timestamp, report.timestamps[0]);
        assert_eq!(report.dataset_hash.len(), 64);
        assert_eq!(report.latest_signal(), *report.signals.last().unwrap());
    }

    #[test]
    fn dataset_hash_is_deterministic_and_sensitive() {
        let a = series_from_closes("X", &closes(30)).unwrap();
        let b = series_from_closes("X", &closes(30)).unwrap();
        assert_eq!(compute_dataset_hash(&a), compute_dataset_hash(&b));

        let mut altered = closes(30);
        altered[10] += 0.01;
        let c = series_from_closes("X", &altered).unwrap();
        assert_ne!(compute_dataset_hash(&a), compute_dataset_hash(&c));
    }

    #[test]
    fn view_states_have_distinct_messages() {
        let config = config_with_ticker("AAPL");
        let no_ticker = ViewState::NoTicker;
        let no_data = resolve_fetched(
            &config,
            "AAPL",
            Err(DataError::EmptyResult {
                symbol: "AAPL".into(),
            }),
            Period::SixMonths,
            Interval::OneDay,
            "test",
        );
        let short = resolve_fetched(
            &config,
            "AAPL",
            Ok(series_from_closes("AAPL", &closes(5)).unwrap()),
            Period::SixMonths,
            Interval::OneDay,
            "test",
        );
        let ready = resolve_fetched(
            &config,
            "AAPL",
            Ok(series_from_closes("AAPL", &closes(40)).unwrap()),
            Period::SixMonths,
            Interval::OneDay,
            "test",
        );

        assert!(matches!(no_data, ViewState::NoData { .. }));
        assert_eq!(
            short,
            ViewState::InsufficientData {
                ticker: "AAPL".into(),
                required: 20,
                available: 5
            }
        );
        assert!(ready.is_ready());

        let messages = [
            no_ticker.message(),
            no_data.message(),
            short.message(),
            ready.message(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in &messages[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(messages[2].contains("Choose a longer period"));
    }
}
