//! Per-period portfolio snapshot: one row per rebalance period.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Mark-to-market state of the portfolio over a single rebalance period.
///
/// Capital fields are integer currency units (rounded), matching the tabular
/// report format. `ending_capital` reflects cash plus position value,
/// including dividends received, at `period_end`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub starting_capital: i64,
    pub ending_capital: i64,
    /// Number of positions entered this period.
    pub constituent_count: usize,
    pub period_return: f64,
    /// Return since the start of the run, as a minus-one fraction
    /// (0.05 = up 5%), same convention as `period_return`.
    pub cumulative_return: f64,
}

impl PortfolioSnapshot {
    pub fn from_capital(
        period_start: NaiveDate,
        period_end: NaiveDate,
        starting_capital: f64,
        ending_capital: f64,
        constituent_count: usize,
        cumulative_return: f64,
    ) -> Self {
        let period_return = if starting_capital > 0.0 {
            ending_capital / starting_capital - 1.0
        } else {
            0.0
        };
        Self {
            period_start,
            period_end,
            starting_capital: starting_capital.round() as i64,
            ending_capital: ending_capital.round() as i64,
            constituent_count,
            period_return,
            cumulative_return,
        }
    }
}
