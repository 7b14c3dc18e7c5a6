//! TradeAgent CLI: backtest, live signal, indicator and comparison commands.
//!
//! Commands:
//! - `backtest`: run the configured strategy over the historical window
//! - `signal`: report BUY / SELL / HOLD at the latest bar of the live window
//! - `indicators`: print the trailing rows of the indicator frame
//! - `compare`: run every strategy over the same bars side by side

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use tradeagent_core::{BarSeries, IndicatorFrame, PipelineError, SignalValue, Strategy};
use tradeagent_runner::runner::resolve_fetched;
use tradeagent_runner::{
    generate_comparison, latest_signal, provider_for, resolve_view, save_artifacts, AgentConfig,
    AnalysisReport, DataProvider, DataSource, Interval, Period, RunError, ViewState,
};

#[derive(Parser)]
#[command(
    name = "tradeagent",
    about = "TradeAgent CLI: indicator signals and long/short backtests"
)]
struct Cli {
    /// Log level (trace, debug, info, warn, error).
    #[arg(short, long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command. Flags override the config file.
#[derive(Args, Debug, Clone)]
struct DataArgs {
    /// Path to a TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticker symbol (e.g., AAPL).
    #[arg(long)]
    ticker: Option<String>,

    /// Strategy: sma_macd_rsi or rsi_only.
    #[arg(long)]
    strategy: Option<Strategy>,

    /// Data source: yahoo, csv or synthetic.
    #[arg(long)]
    source: Option<DataSource>,

    /// CSV file to read bars from (implies --source csv).
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Lookback period (1d, 5d, 1mo, 3mo, 6mo, 1y, 2y, 5y, 10y, ytd, max).
    #[arg(long)]
    period: Option<Period>,

    /// Bar interval (1m, 5m, 15m, 30m, 1h, 1d, 1wk, 1mo, ...).
    #[arg(long)]
    interval: Option<Interval>,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest the configured strategy over the historical window.
    Backtest {
        #[command(flatten)]
        data: DataArgs,

        /// Save report.json, returns.csv and report.md.
        #[arg(long, default_value_t = false)]
        save: bool,

        /// Output directory for artifacts. Defaults to the config's output.dir.
        #[arg(long)]
        output_dir: Option<PathBuf>,
    },
    /// Report the trading decision at the latest bar of the live window.
    Signal {
        #[command(flatten)]
        data: DataArgs,

        /// Print the signal as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Print the trailing rows of the indicator frame.
    Indicators {
        #[command(flatten)]
        data: DataArgs,

        /// Number of trailing bars to show.
        #[arg(long, default_value_t = 10)]
        tail: usize,
    },
    /// Run every strategy over the same bars and compare the results.
    Compare {
        #[command(flatten)]
        data: DataArgs,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level)?;

    match cli.command {
        Commands::Backtest {
            data,
            save,
            output_dir,
        } => run_backtest_cmd(&data, save, output_dir),
        Commands::Signal { data, json } => run_signal(&data, json),
        Commands::Indicators { data, tail } => run_indicators(&data, tail),
        Commands::Compare { data } => run_compare(&data),
    }
}

fn init_logging(log_level: &str) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        other => bail!("unknown log level '{other}'. Valid: trace, debug, info, warn, error"),
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

/// Load the config file (or defaults) and apply command-line overrides.
fn build_config(args: &DataArgs) -> Result<AgentConfig> {
    let mut config = match &args.config {
        Some(path) => AgentConfig::from_file(path)?,
        None => AgentConfig::default(),
    };

    if let Some(ticker) = &args.ticker {
        config.data.ticker = Some(ticker.clone());
    }
    if let Some(strategy) = args.strategy {
        config.strategy.kind = strategy;
    }
    if let Some(source) = args.source {
        config.data.source = source;
    }
    if let Some(path) = &args.csv {
        config.data.csv_path = Some(path.clone());
        if args.source.is_none() {
            config.data.source = DataSource::Csv;
        }
    }
    if let Some(period) = args.period {
        config.data.period = period;
    }
    if let Some(interval) = args.interval {
        config.data.interval = interval;
    }

    config.validate()?;
    Ok(config)
}

fn run_backtest_cmd(args: &DataArgs, save: bool, output_dir: Option<PathBuf>) -> Result<()> {
    let config = build_config(args)?;
    let provider = provider_for(&config)?;

    let report = match resolve_view(&config, provider.as_ref()) {
        ViewState::Ready(report) => report,
        other => bail!("{}", other.message()),
    };

    print_summary(&report);

    if save {
        let dir = output_dir.unwrap_or_else(|| config.output.dir.clone());
        let run_dir = save_artifacts(&report, &dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn run_signal(args: &DataArgs, json: bool) -> Result<()> {
    let config = build_config(args)?;
    let provider = provider_for(&config)?;

    let live = match latest_signal(&config, provider.as_ref()) {
        Ok(live) => live,
        Err(err) => bail!("{}", live_failure_view(&config, err)?.message()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&live)?);
        return Ok(());
    }

    println!();
    println!("=== Latest Signal ===");
    println!("Symbol:         {}", live.ticker);
    println!("Strategy:       {}", live.strategy);
    println!("Window:         {} @ {}", live.period, live.interval);
    println!("Bar:            {}", live.timestamp.format("%Y-%m-%d %H:%M UTC"));
    println!("Close:          {:.2}", live.close);
    println!("Signal:         {}", live.signal);
    println!("Action:         {}", live.action);
    Ok(())
}

/// Map a failed live check onto the view state the user should see.
fn live_failure_view(config: &AgentConfig, err: RunError) -> Result<ViewState> {
    let ticker = config.ticker().unwrap_or_default();
    let view = match err {
        RunError::NoTicker => ViewState::NoTicker,
        RunError::Pipeline(PipelineError::InsufficientData {
            required,
            available,
        }) => ViewState::InsufficientData {
            ticker,
            required,
            available,
        },
        RunError::Pipeline(
            e @ (PipelineError::EmptySeries { .. } | PipelineError::DataUnavailable(_)),
        ) => ViewState::NoData {
            ticker,
            reason: e.to_string(),
        },
        RunError::Data(e) => ViewState::NoData {
            ticker,
            reason: e.to_string(),
        },
        other => return Err(other.into()),
    };
    Ok(view)
}

fn run_indicators(args: &DataArgs, tail: usize) -> Result<()> {
    let config = build_config(args)?;
    let provider = provider_for(&config)?;
    let (ticker, series) = fetch_for_view(&config, provider.as_ref())?;

    let pipeline = config.pipeline(config.data.interval);
    let frame = pipeline.indicators(&series)?;
    let signals = pipeline.signals(&frame);

    let required = config.indicators.required_bars();
    if series.len() < required {
        println!(
            "WARNING: {} bar(s) loaded, {} needed before every indicator is defined",
            series.len(),
            required
        );
    }

    println!("{ticker} ({} bars, {} strategy)", series.len(), pipeline.strategy);
    print_frame_tail(&series, &frame, &signals, tail);
    Ok(())
}

fn run_compare(args: &DataArgs) -> Result<()> {
    let config = build_config(args)?;
    let provider = provider_for(&config)?;
    let (period, interval) = (config.data.period, config.data.interval);
    let (ticker, series) = fetch_for_view(&config, provider.as_ref())?;

    let mut reports: Vec<AnalysisReport> = Vec::with_capacity(Strategy::ALL.len());
    for strategy in Strategy::ALL {
        let mut variant = config.clone();
        variant.strategy.kind = strategy;
        let view = resolve_fetched(
            &variant,
            &ticker,
            Ok(series.clone()),
            period,
            interval,
            provider.name(),
        );
        match view {
            ViewState::Ready(report) => reports.push(*report),
            other => bail!("{}", other.message()),
        }
    }

    for pair in reports.windows(2) {
        println!("{}", generate_comparison(&pair[0], &pair[1]));
    }
    Ok(())
}

/// Fetch the historical window, mapping failures to view-state messages.
fn fetch_for_view(config: &AgentConfig, provider: &dyn DataProvider) -> Result<(String, BarSeries)> {
    let Some(ticker) = config.ticker() else {
        bail!("{}", ViewState::NoTicker.message());
    };
    match provider.fetch(&ticker, config.data.period, config.data.interval) {
        Ok(series) => Ok((ticker, series)),
        Err(e) => bail!(
            "{}",
            ViewState::NoData {
                ticker,
                reason: e.to_string()
            }
            .message()
        ),
    }
}

fn print_summary(report: &AnalysisReport) {
    let s = &report.summary;
    println!();
    println!("=== Backtest Result ===");
    println!("Symbol:         {}", report.ticker);
    println!("Strategy:       {}", report.strategy);
    println!("Source:         {}", report.source);
    println!(
        "Period:         {} to {} ({} @ {})",
        report.first_timestamp.format("%Y-%m-%d"),
        report.last_timestamp.format("%Y-%m-%d"),
        report.period,
        report.interval
    );
    println!(
        "Bars:           {} ({} warmup)",
        report.bar_count, report.warmup_bars
    );
    println!("Latest Signal:  {} ({})", report.latest_signal(), report.action());
    println!();
    println!("--- Performance ---");
    println!("Market Return:  {:.2}%", s.market_total_return * 100.0);
    println!("Strategy Return:{:.2}%", s.strategy_total_return * 100.0);
    println!("Excess Return:  {:.2}%", s.excess_return * 100.0);
    println!("Sharpe:         {:.3}", s.strategy_sharpe);
    println!("Max Drawdown:   {:.2}%", s.strategy_max_drawdown * 100.0);
    println!("Mkt Drawdown:   {:.2}%", s.market_max_drawdown * 100.0);
    println!("Exposure:       {:.1}%", s.exposure * 100.0);
    println!("Position Chg:   {}", s.position_changes);
    if report.source == "synthetic" {
        println!();
        println!("WARNING: Results based on SYNTHETIC data");
    }
    println!();
}

fn print_frame_tail(
    series: &BarSeries,
    frame: &IndicatorFrame,
    signals: &[SignalValue],
    tail: usize,
) {
    println!(
        "{:<17} {:>10} {:>10} {:>10} {:>9} {:>9} {:>7} {:>6}",
        "Timestamp", "Close", "SMA fast", "SMA slow", "MACD", "Signal", "RSI", "Pos"
    );
    println!("{}", "-".repeat(85));

    let start = series.len().saturating_sub(tail);
    for (i, bar) in series.bars().iter().enumerate().skip(start) {
        let snap = frame.snapshot(i);
        let signal = signals.get(i).copied().unwrap_or_default();
        println!(
            "{:<17} {:>10.2} {:>10} {:>10} {:>9} {:>9} {:>7} {:>6}",
            bar.timestamp.format("%Y-%m-%d %H:%M"),
            bar.close,
            fmt_opt(snap.fast_sma, 2),
            fmt_opt(snap.slow_sma, 2),
            fmt_opt(snap.macd, 3),
            fmt_opt(snap.macd_signal, 3),
            fmt_opt(snap.rsi, 1),
            signal.as_i8(),
        );
    }
}

fn fmt_opt(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.decimals$}"))
}
