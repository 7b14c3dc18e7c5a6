//! End-to-end scenarios over small, hand-checkable series.

use tradeagent_core::domain::series_from_closes;
use tradeagent_core::pipeline::{compute_indicators, generate_signals, run_backtest};
use tradeagent_core::{Pipeline, PipelineError, SignalValue, Strategy};

fn rising(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}

#[test]
fn steady_uptrend_indicators() {
    let series = series_from_closes("UP", &rising(30)).unwrap();
    let frame = compute_indicators(&series);
    let last = frame.snapshot(29);

    // Mean of 110..=129.
    assert!((last.slow_sma.unwrap() - 119.5).abs() < 1e-10);
    // Mean of 125..=129.
    assert!((last.fast_sma.unwrap() - 127.0).abs() < 1e-10);
    assert_eq!(last.rsi, Some(100.0));
    assert!(last.macd.unwrap() > 0.0);
    assert!(last.macd.unwrap() > last.macd_signal.unwrap());
}

#[test]
fn warmup_prefix_is_undefined() {
    let series = series_from_closes("UP", &rising(30)).unwrap();
    let frame = compute_indicators(&series);

    assert!(frame.slow_sma[..19].iter().all(Option::is_none));
    assert!(frame.slow_sma[19..].iter().all(Option::is_some));
    assert!(frame.fast_sma[..4].iter().all(Option::is_none));
    assert!(frame.rsi[..14].iter().all(Option::is_none));
    assert!(frame.rsi[14..].iter().all(Option::is_some));
    assert!(frame.macd.iter().all(Option::is_some));
}

#[test]
fn overbought_uptrend_is_flat_for_composite() {
    let series = series_from_closes("UP", &rising(30)).unwrap();
    let signals = generate_signals(&series, Strategy::TrendMomentumComposite);
    assert_eq!(signals.len(), 30);
    // RSI pins at 100, which gates every long.
    assert!(signals.iter().all(|s| *s == SignalValue::Flat));
}

#[test]
fn overbought_uptrend_is_short_for_momentum_only() {
    let series = series_from_closes("UP", &rising(30)).unwrap();
    let signals = generate_signals(&series, Strategy::MomentumOnly);

    assert!(signals[..14].iter().all(|s| *s == SignalValue::Flat));
    assert!(signals[14..].iter().all(|s| *s == SignalValue::Short));

    let outcome = run_backtest(&series, &signals).unwrap();
    assert_eq!(outcome.latest_signal, SignalValue::Short);
    assert_eq!(outcome.latest_signal.action_label(), "SELL");
    // Short from bar 15 onward in a rising market loses money.
    assert!(outcome.final_strategy_growth() < 1.0);
    assert!((outcome.final_market_growth() - 1.29).abs() < 1e-10);
}

#[test]
fn oversold_downtrend_goes_long_for_momentum_only() {
    let closes: Vec<f64> = (0..30).map(|i| 200.0 - i as f64).collect();
    let series = series_from_closes("DOWN", &closes).unwrap();
    let signals = generate_signals(&series, Strategy::MomentumOnly);
    // Every change is a loss: RSI = 0.
    assert_eq!(compute_indicators(&series).rsi[29], Some(0.0));
    assert_eq!(signals[29], SignalValue::Long);
}

#[test]
fn single_bar_cannot_be_backtested() {
    let series = series_from_closes("ONE", &[100.0]).unwrap();
    let err = Pipeline::new(Strategy::MomentumOnly).run(&series).unwrap_err();
    assert_eq!(err, PipelineError::EmptySeries { len: 1 });
}

#[test]
fn short_series_pads_instead_of_failing() {
    let series = series_from_closes("SHORT", &rising(10)).unwrap();
    let out = Pipeline::new(Strategy::TrendMomentumComposite)
        .run(&series)
        .unwrap();

    assert_eq!(out.frame.len(), 10);
    assert!(out.frame.slow_sma.iter().all(Option::is_none));
    assert!(out.frame.rsi.iter().all(Option::is_none));
    assert!(out.signals.iter().all(|s| *s == SignalValue::Flat));
    assert_eq!(out.outcome.final_strategy_growth(), 1.0);
    assert_eq!(out.summary.exposure, 0.0);
}

#[test]
fn pipeline_output_serializes() {
    let series = series_from_closes("UP", &rising(40)).unwrap();
    let out = Pipeline::default().run(&series).unwrap();
    let json = serde_json::to_string(&out).unwrap();
    assert!(json.contains("\"strategy\":\"sma_macd_rsi\""));
    assert!(json.contains("\"latest_signal\":\"flat\""));
}
