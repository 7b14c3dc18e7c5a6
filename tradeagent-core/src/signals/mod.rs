//! Signal generation: maps indicator state at each bar to a trading decision.
//!
//! Rules see exactly one bar's [`IndicatorSnapshot`]: no bar history, no
//! previous signal, no position. Look-ahead and hysteresis are therefore
//! impossible by construction, and identical frames always yield identical
//! signal series.

pub mod composite;
pub mod momentum;

pub use composite::TrendMomentumComposite;
pub use momentum::MomentumOnly;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::SignalValue;
use crate::error::PipelineError;
use crate::indicators::{IndicatorFrame, IndicatorSnapshot};

/// A strategy rule evaluated independently at every bar.
///
/// # Invariants
/// - `evaluate()` is a pure function of the snapshot
/// - any undefined input the rule needs resolves to `SignalValue::Flat`
pub trait SignalRule: Send + Sync {
    /// Rule name for reports and logging.
    fn name(&self) -> &str;

    fn evaluate(&self, snapshot: &IndicatorSnapshot) -> SignalValue;
}

/// RSI levels shared by both rules.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RsiThresholds {
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiThresholds {
    fn default() -> Self {
        Self {
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl RsiThresholds {
    pub fn validate(&self) -> Result<(), PipelineError> {
        let in_range = |v: f64| (0.0..=100.0).contains(&v);
        if !in_range(self.oversold) || !in_range(self.overbought) {
            return Err(PipelineError::InvalidConfig(
                "RSI thresholds must lie within [0, 100]".into(),
            ));
        }
        if self.oversold >= self.overbought {
            return Err(PipelineError::InvalidConfig(format!(
                "oversold ({}) must be below overbought ({})",
                self.oversold, self.overbought
            )));
        }
        Ok(())
    }
}

/// The closed set of selectable strategies.
///
/// Adding a strategy means adding a variant and a rule type; callers select
/// by identifier and never branch on strategy names themselves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// Trend (SMA) + MACD + RSI guard.
    #[default]
    #[serde(rename = "sma_macd_rsi", alias = "SMA_MACD_RSI")]
    TrendMomentumComposite,
    /// RSI mean reversion only.
    #[serde(rename = "rsi_only", alias = "RSI_only")]
    MomentumOnly,
}

impl Strategy {
    pub const ALL: [Strategy; 2] = [Strategy::TrendMomentumComposite, Strategy::MomentumOnly];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::TrendMomentumComposite => "sma_macd_rsi",
            Strategy::MomentumOnly => "rsi_only",
        }
    }

    /// Build the rule for this strategy.
    pub fn rule(&self, thresholds: RsiThresholds) -> Box<dyn SignalRule> {
        match self {
            Strategy::TrendMomentumComposite => Box::new(TrendMomentumComposite::new(thresholds)),
            Strategy::MomentumOnly => Box::new(MomentumOnly::new(thresholds)),
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sma_macd_rsi" | "SMA_MACD_RSI" | "composite" => Ok(Strategy::TrendMomentumComposite),
            "rsi_only" | "RSI_only" | "RSI_ONLY" | "momentum" => Ok(Strategy::MomentumOnly),
            other => Err(PipelineError::InvalidConfig(format!(
                "unknown strategy '{other}'. Valid: sma_macd_rsi, rsi_only"
            ))),
        }
    }
}

/// Evaluate `rule` at every index of `frame`.
pub fn generate_signals(frame: &IndicatorFrame, rule: &dyn SignalRule) -> Vec<SignalValue> {
    (0..frame.len())
        .map(|i| rule.evaluate(&frame.snapshot(i)))
        .collect()
}
