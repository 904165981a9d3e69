//! Rebalance scheduling: decision dates from the store's trading calendar.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::store::PriceSeriesStore;

/// How often the portfolio is rebalanced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    /// Last trading date of each month in range.
    Monthly,
    /// Last trading date of each year in range.
    Yearly,
}

#[derive(Debug, Clone, Error)]
pub enum ScheduleError {
    #[error("empty schedule: start {start} is after end {end}")]
    EmptyRange { start: NaiveDate, end: NaiveDate },
    #[error("empty schedule: no trading dates between {start} and {end}")]
    NoTradingDates { start: NaiveDate, end: NaiveDate },
}

/// Compute the ordered decision dates in `[start, end]`.
///
/// Dates come from the store's actual trading calendar, never from calendar
/// arithmetic, so a weekend or holiday month-end resolves to the last real
/// trading day on or before it.
pub fn schedule(
    store: &dyn PriceSeriesStore,
    start: NaiveDate,
    end: NaiveDate,
    frequency: Frequency,
) -> Result<Vec<NaiveDate>, ScheduleError> {
    if start > end {
        return Err(ScheduleError::EmptyRange { start, end });
    }
    let trading = store.trading_dates(start, end);
    if trading.is_empty() {
        return Err(ScheduleError::NoTradingDates { start, end });
    }

    // Last trading date per bucket; BTreeMap keeps buckets ordered.
    let mut last_per_bucket = std::collections::BTreeMap::new();
    for date in trading {
        let bucket = match frequency {
            Frequency::Monthly => (date.year(), date.month()),
            Frequency::Yearly => (date.year(), 0),
        };
        last_per_bucket.insert(bucket, date);
    }
    Ok(last_per_bucket.into_values().collect())
}
