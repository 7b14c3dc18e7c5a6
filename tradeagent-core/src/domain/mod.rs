//! Domain types for the signal pipeline.

pub mod bar;
pub mod series;
pub mod signal;

pub use bar::{Bar, BarError};
pub use series::{series_from_closes, BarSeries};
pub use signal::SignalValue;

/// Symbol type alias
pub type Symbol = String;
