//! Bar series acquisition.
//!
//! Providers turn `(ticker, period, interval)` into a validated
//! [`BarSeries`](tradeagent_core::BarSeries). Network retries, file parsing
//! and synthetic generation all live here, never in the core.

pub mod csv_source;
pub mod provider;
pub mod synthetic;
pub mod yahoo;

pub use csv_source::CsvProvider;
pub use provider::{build_series, DataError, DataProvider, DataSource, Interval, Period};
pub use synthetic::SyntheticProvider;
pub use yahoo::YahooProvider;
