//! Open position state, owned exclusively by the portfolio simulator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// An open holding in one ticker.
///
/// Created at an entry decision date, mutated by corporate actions and daily
/// price marks, destroyed on exit. `dividends_received` is the cash credited
/// to this position since entry; it is part of the asset-value basis used for
/// exit triggers so that an ex-dividend price drop does not read as a loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub shares: f64,
    pub cost_basis: f64,
    pub entry_date: NaiveDate,
    pub entry_price: f64,
    /// Cumulative cash dividends credited since entry.
    pub dividends_received: f64,
    /// Highest asset value observed since entry (trailing-stop reference).
    pub peak_asset_value: f64,
    /// Most recent close observed, used when the exit-date quote is missing.
    pub last_close: f64,
    pub last_close_date: NaiveDate,
    /// Whether a dated corporate-action feed exists for this ticker. Without
    /// one, early-exit triggers are disabled for the whole period.
    pub has_action_feed: bool,
}

impl Position {
    /// Open a position by spending `allocation` at `entry_price` (fractional
    /// shares). Caller guarantees `entry_price > 0` and `allocation > 0`.
    pub fn open(
        ticker: impl Into<String>,
        entry_date: NaiveDate,
        entry_price: f64,
        allocation: f64,
        has_action_feed: bool,
    ) -> Self {
        let shares = allocation / entry_price;
        Self {
            ticker: ticker.into(),
            shares,
            cost_basis: allocation,
            entry_date,
            entry_price,
            dividends_received: 0.0,
            peak_asset_value: allocation,
            last_close: entry_price,
            last_close_date: entry_date,
            has_action_feed,
        }
    }

    /// Asset value at `price`: market value plus dividends attributable to
    /// this position. The trigger basis, per the ex-dividend immunity rule.
    pub fn asset_value(&self, price: f64) -> f64 {
        price * self.shares + self.dividends_received
    }

    /// Market value at the last observed close (excludes dividend cash).
    pub fn market_value(&self) -> f64 {
        self.last_close * self.shares
    }

    /// Credit a cash dividend; returns the cash amount for the dividend on
    /// the current share count.
    pub fn apply_cash_dividend(&mut self, per_share: f64) -> f64 {
        let amount = per_share * self.shares;
        self.dividends_received += amount;
        amount
    }

    /// Apply a stock dividend share multiplier. Cash is never touched.
    pub fn apply_stock_dividend(&mut self, multiplier: f64) {
        self.shares *= multiplier;
    }

    /// Record the day's close and advance the peak asset value.
    pub fn mark(&mut self, date: NaiveDate, close: f64) {
        self.last_close = close;
        self.last_close_date = date;
        let value = self.asset_value(close);
        if value > self.peak_asset_value {
            self.peak_asset_value = value;
        }
    }

    /// Return on the asset-value basis relative to cost.
    pub fn return_at(&self, price: f64) -> f64 {
        self.asset_value(price) / self.cost_basis - 1.0
    }
}
