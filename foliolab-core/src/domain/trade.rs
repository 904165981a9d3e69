//! Trade — a completed round-trip, immutable once recorded in the ledger.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Why a position was closed. Exactly one reason per trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// Rebalance boundary or maximum holding horizon.
    Normal,
    TakeProfit,
    StopLoss,
    /// The exit-date quote was missing; the last known price was used.
    NoData,
}

/// A closed trade: entry → exit, with gross and cost-adjusted returns.
///
/// `gross_*` includes dividends received while held; `net_*` additionally
/// subtracts `transaction_costs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub ticker: String,

    pub entry_date: NaiveDate,
    pub entry_price: f64,

    pub exit_date: NaiveDate,
    pub exit_price: f64,
    pub exit_reason: ExitReason,

    /// Share count at exit (after any stock dividends).
    pub shares: f64,
    pub dividends_received: f64,

    pub gross_return: f64,
    pub gross_pnl: f64,
    pub net_return: f64,
    pub net_pnl: f64,
    pub transaction_costs: f64,

    pub holding_days: i64,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.net_pnl > 0.0
    }
}
