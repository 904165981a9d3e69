//! Append-only record of closed trades.

use crate::domain::Trade;

/// Insertion-ordered, append-only trade store.
///
/// Intentionally dumb: no querying, no mutation of recorded trades. Bad
/// input (non-positive shares, exit before entry) is a programming error in
/// the simulator and panics rather than being laundered into the record.
#[derive(Debug, Default, Clone)]
pub struct TradeLedger {
    trades: Vec<Trade>,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, trade: Trade) {
        assert!(trade.shares > 0.0, "recorded trade with non-positive shares");
        assert!(
            trade.exit_date >= trade.entry_date,
            "recorded trade exiting before entry"
        );
        self.trades.push(trade);
    }

    pub fn all(&self) -> &[Trade] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    pub fn into_trades(self) -> Vec<Trade> {
        self.trades
    }
}
