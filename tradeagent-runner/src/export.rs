//! Reporting and export: JSON, CSV, and Markdown artifact generation.
//!
//! Provides three export formats for analysis reports:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: per-bar signal, position and return table
//! - **Markdown**: human-readable single-run reports and strategy comparisons
//!
//! Persisted reports carry a `schema_version` field. Unknown versions are
//! rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::runner::{AnalysisReport, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize an `AnalysisReport` to pretty JSON.
pub fn export_json(report: &AnalysisReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize AnalysisReport to JSON")
}

/// Deserialize an `AnalysisReport` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<AnalysisReport> {
    let report: AnalysisReport =
        serde_json::from_str(json).context("failed to deserialize AnalysisReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the per-bar table.
///
/// Columns: timestamp, close, signal, position, market_return,
/// strategy_return, cumulative_market, cumulative_strategy
pub fn export_returns_csv(report: &AnalysisReport) -> Result<String> {
    let o = &report.outcome;
    let n = report.timestamps.len();
    if report.closes.len() != n || report.signals.len() != n || o.len() != n {
        bail!(
            "report columns are misaligned ({n} timestamps, {} closes, {} signals, {} returns)",
            report.closes.len(),
            report.signals.len(),
            o.len()
        );
    }

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "timestamp",
        "close",
        "signal",
        "position",
        "market_return",
        "strategy_return",
        "cumulative_market",
        "cumulative_strategy",
    ])?;

    for i in 0..n {
        wtr.write_record([
            &report.timestamps[i].to_rfc3339(),
            &format!("{:.4}", report.closes[i]),
            &report.signals[i].as_i8().to_string(),
            &o.positions[i].as_i8().to_string(),
            &format!("{:.8}", o.returns[i]),
            &format!("{:.8}", o.strategy_returns[i]),
            &format!("{:.8}", o.cumulative_market_returns[i]),
            &format!("{:.8}", o.cumulative_strategy_returns[i]),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Save the full artifact set for one analysis.
///
/// Creates a directory named `{ticker}_{timestamp}/` under `output_dir`
/// containing:
/// - `report.json`: the full `AnalysisReport`
/// - `returns.csv`: per-bar signals, positions and returns
/// - `report.md`: Markdown summary
///
/// Returns the path to the created directory.
pub fn save_artifacts(report: &AnalysisReport, output_dir: &Path) -> Result<PathBuf> {
    let dirname = format!(
        "{}_{}",
        dir_safe_ticker(&report.ticker),
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    std::fs::write(run_dir.join("report.json"), export_json(report)?)?;
    std::fs::write(run_dir.join("returns.csv"), export_returns_csv(report)?)?;
    std::fs::write(run_dir.join("report.md"), generate_report(report))?;

    Ok(run_dir)
}

/// Ticker as a single path component. Separators and anything outside
/// the usual symbol alphabet (`BRK.B`, `^GSPC`, `EURUSD=X`) become `_`.
fn dir_safe_ticker(ticker: &str) -> String {
    let cleaned: String = ticker
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '=') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "report".to_string()
    } else {
        cleaned
    }
}

/// Load an `AnalysisReport` from an artifact directory's report.json.
///
/// Rejects unknown schema versions.
pub fn load_artifacts(dir: &Path) -> Result<AnalysisReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Markdown reports ───────────────────────────────────────────────

fn pct(v: f64) -> String {
    format!("{:.2}%", v * 100.0)
}

/// Generate a Markdown report for a single analysis.
pub fn generate_report(report: &AnalysisReport) -> String {
    let mut md = String::with_capacity(1024);
    let s = &report.summary;

    md.push_str("# Analysis Report\n\n");

    md.push_str("## Metadata\n\n");
    md.push_str("| Field | Value |\n");
    md.push_str("| --- | --- |\n");
    md.push_str(&format!("| Ticker | {} |\n", report.ticker));
    md.push_str(&format!("| Strategy | {} |\n", report.strategy));
    md.push_str(&format!("| Source | {} |\n", report.source));
    md.push_str(&format!(
        "| Window | {} at {} |\n",
        report.period, report.interval
    ));
    md.push_str(&format!(
        "| Range | {} to {} |\n",
        report.first_timestamp.to_rfc3339(),
        report.last_timestamp.to_rfc3339()
    ));
    md.push_str(&format!(
        "| Bars | {} ({} warmup) |\n",
        report.bar_count, report.warmup_bars
    ));
    md.push_str(&format!("| Dataset Hash | {} |\n", report.dataset_hash));
    md.push('\n');

    md.push_str("## Latest Signal\n\n");
    md.push_str(&format!(
        "**{}** ({})\n\n",
        report.action(),
        report.latest_signal()
    ));

    md.push_str("## Performance Summary\n\n");
    md.push_str("| Metric | Market | Strategy |\n");
    md.push_str("| --- | --- | --- |\n");
    md.push_str(&format!(
        "| Total Return | {} | {} |\n",
        pct(s.market_total_return),
        pct(s.strategy_total_return)
    ));
    md.push_str(&format!(
        "| Max Drawdown | {} | {} |\n",
        pct(s.market_max_drawdown),
        pct(s.strategy_max_drawdown)
    ));
    md.push_str(&format!("| Sharpe | | {:.3} |\n", s.strategy_sharpe));
    md.push_str(&format!("| Exposure | | {} |\n", pct(s.exposure)));
    md.push_str(&format!(
        "| Position Changes | | {} |\n",
        s.position_changes
    ));
    md.push('\n');
    md.push_str(&format!("Excess return: {}\n", pct(s.excess_return)));

    md
}

/// Generate a side-by-side Markdown comparison of two analyses.
pub fn generate_comparison(a: &AnalysisReport, b: &AnalysisReport) -> String {
    let mut md = String::with_capacity(1024);

    md.push_str("# Strategy Comparison\n\n");
    if a.ticker != b.ticker {
        md.push_str(&format!(
            "> Note: comparing different tickers ({} vs {})\n\n",
            a.ticker, b.ticker
        ));
    } else if a.dataset_hash != b.dataset_hash {
        md.push_str("> Note: the two runs used different bar data\n\n");
    }

    md.push_str(&format!(
        "| Metric | {} | {} | Delta |\n",
        a.strategy, b.strategy
    ));
    md.push_str("| --- | --- | --- | --- |\n");

    let rows = [
        (
            "Total Return",
            a.summary.strategy_total_return,
            b.summary.strategy_total_return,
        ),
        (
            "Excess Return",
            a.summary.excess_return,
            b.summary.excess_return,
        ),
        (
            "Max Drawdown",
            a.summary.strategy_max_drawdown,
            b.summary.strategy_max_drawdown,
        ),
        ("Exposure", a.summary.exposure, b.summary.exposure),
    ];
    for (name, va, vb) in rows {
        md.push_str(&format!(
            "| {name} | {} | {} | {:+.2}pp |\n",
            pct(va),
            pct(vb),
            (vb - va) * 100.0
        ));
    }
    md.push_str(&format!(
        "| Sharpe | {:.3} | {:.3} | {:+.3} |\n",
        a.summary.strategy_sharpe,
        b.summary.strategy_sharpe,
        b.summary.strategy_sharpe - a.summary.strategy_sharpe
    ));
    md.push_str(&format!(
        "| Latest Signal | {} | {} | |\n",
        a.action(),
        b.action()
    ));

    md
}
