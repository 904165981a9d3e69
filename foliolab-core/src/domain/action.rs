//! Corporate actions: cash dividends and stock dividends, keyed by ex-date.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Face value assumed when converting a declared per-share stock dividend
/// into a share-count multiplier. A declared value of 1.2 on a 10-unit face
/// value means 0.12 extra shares per share held.
pub const FACE_VALUE: f64 = 10.0;

/// A single corporate action supplied by the price store.
///
/// Immutable; consumed in ex-date order during simulation. `stock_dividend`
/// is the declared per-share value (e.g. 1.2), not the share ratio — use
/// [`CorporateAction::share_multiplier`] for the conversion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorporateAction {
    pub ticker: String,
    pub ex_date: NaiveDate,
    /// Cash dividend per share, if any.
    pub cash_dividend: Option<f64>,
    /// Declared stock dividend value per share, if any.
    pub stock_dividend: Option<f64>,
}

/// A malformed dividend/split record. The simulator skips the action with a
/// warning rather than applying it or aborting the run.
#[derive(Debug, Clone, Error)]
pub enum ActionParseError {
    #[error("negative amount in corporate action for '{ticker}' on {ex_date}: {amount}")]
    NegativeAmount {
        ticker: String,
        ex_date: NaiveDate,
        amount: f64,
    },
    #[error("non-finite amount in corporate action for '{ticker}' on {ex_date}")]
    NonFinite { ticker: String, ex_date: NaiveDate },
}

impl CorporateAction {
    pub fn cash(ticker: impl Into<String>, ex_date: NaiveDate, per_share: f64) -> Self {
        Self {
            ticker: ticker.into(),
            ex_date,
            cash_dividend: Some(per_share),
            stock_dividend: None,
        }
    }

    pub fn stock(ticker: impl Into<String>, ex_date: NaiveDate, declared_value: f64) -> Self {
        Self {
            ticker: ticker.into(),
            ex_date,
            cash_dividend: None,
            stock_dividend: Some(declared_value),
        }
    }

    /// Cash dividend per share (0.0 when absent).
    pub fn cash_per_share(&self) -> f64 {
        self.cash_dividend.unwrap_or(0.0)
    }

    /// Share-count multiplier for the stock dividend component.
    ///
    /// The declared per-share value is divided by the 10-unit face value:
    /// a 1.2 declaration yields a 1.12 multiplier.
    pub fn share_multiplier(&self) -> f64 {
        1.0 + self.stock_dividend.unwrap_or(0.0) / FACE_VALUE
    }

    /// Reject records with negative or non-finite amounts.
    pub fn validate(&self) -> Result<(), ActionParseError> {
        for amount in [self.cash_dividend, self.stock_dividend].into_iter().flatten() {
            if !amount.is_finite() {
                return Err(ActionParseError::NonFinite {
                    ticker: self.ticker.clone(),
                    ex_date: self.ex_date,
                });
            }
            if amount < 0.0 {
                return Err(ActionParseError::NegativeAmount {
                    ticker: self.ticker.clone(),
                    ex_date: self.ex_date,
                    amount,
                });
            }
        }
        Ok(())
    }
}
