//! Pipeline error taxonomy.

use thiserror::Error;

use crate::domain::BarError;

/// Errors surfaced by the signal pipeline.
///
/// `InsufficientData` is reported by warm-up checks; indicator computation
/// itself recovers from it by padding with undefined values.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    #[error("insufficient data: {available} bars available, {required} required for warm-up")]
    InsufficientData { required: usize, available: usize },

    #[error("series has {len} bar(s); at least 2 are needed to compute a return")]
    EmptySeries { len: usize },

    #[error("data unavailable: {0}")]
    DataUnavailable(String),

    #[error("signal series has {signals} values but bar series has {bars}")]
    SignalLengthMismatch { bars: usize, signals: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid bar series: {0}")]
    InvalidSeries(#[from] BarError),
}
