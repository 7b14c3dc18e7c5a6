//! Discrete trading decision per bar.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trading decision at one bar: full short, flat, or full long.
///
/// The same type doubles as the backtest position, whose magnitude is always
/// exactly one of {-1, 0, +1}.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalValue {
    Short,
    #[default]
    Flat,
    Long,
}

impl SignalValue {
    pub fn as_i8(self) -> i8 {
        match self {
            SignalValue::Short => -1,
            SignalValue::Flat => 0,
            SignalValue::Long => 1,
        }
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.as_i8())
    }

    pub fn from_i8(value: i8) -> Option<Self> {
        match value {
            -1 => Some(SignalValue::Short),
            0 => Some(SignalValue::Flat),
            1 => Some(SignalValue::Long),
            _ => None,
        }
    }

    /// Order-ticket wording for the latest signal.
    pub fn action_label(self) -> &'static str {
        match self {
            SignalValue::Long => "BUY",
            SignalValue::Flat => "HOLD",
            SignalValue::Short => "SELL",
        }
    }

    pub fn is_flat(self) -> bool {
        self == SignalValue::Flat
    }
}

impl fmt::Display for SignalValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalValue::Short => write!(f, "SHORT"),
            SignalValue::Flat => write!(f, "FLAT"),
            SignalValue::Long => write!(f, "LONG"),
        }
    }
}
