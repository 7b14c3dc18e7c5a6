//! TradeAgent Runner: configuration, data acquisition, analysis and artifacts.
//!
//! This crate builds on `tradeagent-core` to provide:
//! - TOML agent configuration
//! - Bar series providers (Yahoo chart API, CSV import, synthetic)
//! - Historical analysis and the live latest-signal check
//! - View states for the presentation layer
//! - JSON, CSV and Markdown artifact export

pub mod config;
pub mod data;
pub mod export;
pub mod runner;

pub use config::{AgentConfig, ConfigError, DataConfig, OutputConfig, StrategyConfig};
pub use data::{
    CsvProvider, DataError, DataProvider, DataSource, Interval, Period, SyntheticProvider,
    YahooProvider,
};
pub use export::{
    export_json, export_returns_csv, generate_comparison, generate_report, import_json,
    load_artifacts, save_artifacts,
};
pub use runner::{
    analyze_series, latest_signal, resolve_view, run_analysis, AnalysisReport, LiveSignal,
    RunError, ViewState, SCHEMA_VERSION,
};

/// Build the provider selected by `config.data.source`.
pub fn provider_for(config: &AgentConfig) -> Result<Box<dyn DataProvider>, RunError> {
    let provider: Box<dyn DataProvider> = match config.data.source {
        DataSource::Yahoo => Box::new(YahooProvider::new()?),
        DataSource::Csv => {
            let path = config.data.csv_path.clone().ok_or_else(|| {
                ConfigError::Invalid("source = \"csv\" requires csv_path".into())
            })?;
            Box::new(CsvProvider::new(path))
        }
        DataSource::Synthetic => Box::new(SyntheticProvider::default()),
    };
    Ok(provider)
}
