//! Artifact export — JSON and CSV generation for backtest results.
//!
//! Two formats:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: trade tape and period table for external analysis tools
//!
//! All persisted artifacts include a `schema_version` field. Versions newer
//! than this build understands are rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use foliolab_core::domain::{PortfolioSnapshot, Trade};

use crate::runner::{BacktestResult, SCHEMA_VERSION};

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON. Field order is fixed by the
/// struct definitions, so equal results serialize byte-identically.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export the trade tape as CSV, one row per closed trade in ledger order.
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "ticker",
        "entry_date",
        "entry_price",
        "exit_date",
        "exit_price",
        "exit_reason",
        "shares",
        "dividends_received",
        "gross_return",
        "gross_pnl",
        "net_return",
        "net_pnl",
        "transaction_costs",
        "holding_days",
    ])?;

    for t in trades {
        let reason = serde_json::to_string(&t.exit_reason)
            .context("failed to serialize exit reason")?
            .trim_matches('"')
            .to_string();
        wtr.write_record([
            &t.ticker,
            &t.entry_date.to_string(),
            &format!("{:.6}", t.entry_price),
            &t.exit_date.to_string(),
            &format!("{:.6}", t.exit_price),
            &reason,
            &format!("{:.6}", t.shares),
            &format!("{:.2}", t.dividends_received),
            &format!("{:.6}", t.gross_return),
            &format!("{:.2}", t.gross_pnl),
            &format!("{:.6}", t.net_return),
            &format!("{:.2}", t.net_pnl),
            &format!("{:.2}", t.transaction_costs),
            &t.holding_days.to_string(),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

/// Export the period table as CSV, one row per rebalance period.
pub fn export_snapshots_csv(snapshots: &[PortfolioSnapshot]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "period_start",
        "period_end",
        "starting_capital",
        "ending_capital",
        "constituent_count",
        "period_return",
        "cumulative_return",
    ])?;

    for s in snapshots {
        wtr.write_record([
            &s.period_start.to_string(),
            &s.period_end.to_string(),
            &s.starting_capital.to_string(),
            &s.ending_capital.to_string(),
            &s.constituent_count.to_string(),
            &format!("{:.6}", s.period_return),
            &format!("{:.6}", s.cumulative_return),
        ])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output was not valid UTF-8")
}

// ─── File artifacts ─────────────────────────────────────────────────

/// Write the full artifact set for a run into `dir`: `<run_id>.json`,
/// `<run_id>_trades.csv`, and `<run_id>_periods.csv`. Returns the paths
/// written, in that order.
pub fn write_artifacts(dir: &Path, result: &BacktestResult) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create artifact dir {}", dir.display()))?;

    let json_path = dir.join(format!("{}.json", result.run_id));
    std::fs::write(&json_path, export_json(result)?)
        .with_context(|| format!("failed to write {}", json_path.display()))?;

    let trades_path = dir.join(format!("{}_trades.csv", result.run_id));
    std::fs::write(&trades_path, export_trades_csv(&result.trades)?)
        .with_context(|| format!("failed to write {}", trades_path.display()))?;

    let periods_path = dir.join(format!("{}_periods.csv", result.run_id));
    std::fs::write(&periods_path, export_snapshots_csv(&result.snapshots)?)
        .with_context(|| format!("failed to write {}", periods_path.display()))?;

    Ok(vec![json_path, trades_path, periods_path])
}
