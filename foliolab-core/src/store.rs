//! Price series read interface and the in-memory store used by simulations.
//!
//! The store is the boundary between the engine and whatever supplies market
//! data (SQLite, CSV imports, a remote API). The engine only ever reads:
//! trading dates, close series, and corporate-action feeds. Loading
//! everything into an [`InMemoryStore`] before a run keeps the hot loop free
//! of I/O and makes the store safely shareable across parameter-sweep runs.

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::CorporateAction;

/// A single (date, close) observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Read-only view of prices, the trading calendar, and corporate actions.
pub trait PriceSeriesStore: Send + Sync {
    /// Trading dates in `[start, end]`, ascending. The actual calendar, not
    /// calendar days — schedules and day walks must come from here.
    fn trading_dates(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate>;

    /// Ordered close observations for `ticker` in `[start, end]`.
    fn closes(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint>;

    /// Corporate actions for `ticker` with ex-date in `[start, end]`,
    /// ascending by ex-date. `None` means no dated feed exists for the
    /// ticker at all — the simulator then disables early exits rather than
    /// risk a phantom stop-out on an ex-dividend drop. `Some(vec![])` is a
    /// feed that simply has no events in range.
    fn actions(&self, ticker: &str, start: NaiveDate, end: NaiveDate)
        -> Option<Vec<CorporateAction>>;

    /// Close for `ticker` on exactly `date`, if observed.
    fn close_on(&self, ticker: &str, date: NaiveDate) -> Option<f64> {
        self.closes(ticker, date, date).first().map(|p| p.close)
    }
}

/// Pre-loaded store backed by sorted in-memory series.
///
/// The trading calendar is the union of all observation dates across tickers.
#[derive(Debug, Default, Clone)]
pub struct InMemoryStore {
    series: BTreeMap<String, Vec<PricePoint>>,
    actions: BTreeMap<String, Vec<CorporateAction>>,
    calendar: BTreeSet<NaiveDate>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert (or replace) the close series for a ticker. Points are sorted
    /// by date; duplicate dates keep the first observation.
    pub fn with_series(mut self, ticker: impl Into<String>, mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.date);
        points.dedup_by_key(|p| p.date);
        for p in &points {
            self.calendar.insert(p.date);
        }
        self.series.insert(ticker.into(), points);
        self
    }

    /// Register a corporate-action feed for a ticker. Registering an empty
    /// feed still counts as having a calendar (enables trigger evaluation).
    pub fn with_actions(
        mut self,
        ticker: impl Into<String>,
        mut actions: Vec<CorporateAction>,
    ) -> Self {
        actions.sort_by_key(|a| a.ex_date);
        self.actions.insert(ticker.into(), actions);
        self
    }

    pub fn tickers(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(|s| s.as_str())
    }
}

impl PriceSeriesStore for InMemoryStore {
    fn trading_dates(&self, start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
        self.calendar.range(start..=end).copied().collect()
    }

    fn closes(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Vec<PricePoint> {
        let Some(points) = self.series.get(ticker) else {
            return Vec::new();
        };
        let from = points.partition_point(|p| p.date < start);
        let to = points.partition_point(|p| p.date <= end);
        points[from..to].to_vec()
    }

    fn actions(
        &self,
        ticker: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Option<Vec<CorporateAction>> {
        let feed = self.actions.get(ticker)?;
        Some(
            feed.iter()
                .filter(|a| a.ex_date >= start && a.ex_date <= end)
                .cloned()
                .collect(),
        )
    }

    fn close_on(&self, ticker: &str, date: NaiveDate) -> Option<f64> {
        let points = self.series.get(ticker)?;
        let idx = points.binary_search_by_key(&date, |p| p.date).ok()?;
        Some(points[idx].close)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_store() -> InMemoryStore {
        InMemoryStore::new()
            .with_series(
                "A",
                vec![
                    PricePoint { date: date(2020, 1, 2), close: 100.0 },
                    PricePoint { date: date(2020, 1, 3), close: 101.0 },
                    PricePoint { date: date(2020, 1, 6), close: 99.0 },
                ],
            )
            .with_series(
                "B",
                vec![
                    PricePoint { date: date(2020, 1, 3), close: 50.0 },
                    PricePoint { date: date(2020, 1, 7), close: 51.0 },
                ],
            )
            .with_actions(
                "A",
                vec![CorporateAction::cash("A", date(2020, 1, 6), 2.0)],
            )
    }

    #[test]
    fn calendar_is_union_of_series_dates() {
        let store = sample_store();
        let dates = store.trading_dates(date(2020, 1, 1), date(2020, 1, 31));
        assert_eq!(
            dates,
            vec![date(2020, 1, 2), date(2020, 1, 3), date(2020, 1, 6), date(2020, 1, 7)]
        );
    }

    #[test]
    fn closes_respects_range() {
        let store = sample_store();
        let closes = store.closes("A", date(2020, 1, 3), date(2020, 1, 6));
        assert_eq!(closes.len(), 2);
        assert_eq!(closes[0].close, 101.0);
        assert_eq!(closes[1].close, 99.0);
    }

    #[test]
    fn close_on_exact_date_only() {
        let store = sample_store();
        assert_eq!(store.close_on("A", date(2020, 1, 3)), Some(101.0));
        assert_eq!(store.close_on("A", date(2020, 1, 4)), None);
        assert_eq!(store.close_on("Z", date(2020, 1, 3)), None);
    }

    #[test]
    fn missing_action_feed_is_none_not_empty() {
        let store = sample_store();
        assert!(store.actions("B", date(2020, 1, 1), date(2020, 12, 31)).is_none());
        let feed = store.actions("A", date(2020, 1, 1), date(2020, 12, 31)).unwrap();
        assert_eq!(feed.len(), 1);
        // In-range filter on a present feed returns an empty vec, not None
        let empty = store.actions("A", date(2021, 1, 1), date(2021, 12, 31)).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn unsorted_input_is_sorted() {
        let store = InMemoryStore::new().with_series(
            "C",
            vec![
                PricePoint { date: date(2020, 1, 6), close: 3.0 },
                PricePoint { date: date(2020, 1, 2), close: 1.0 },
            ],
        );
        let closes = store.closes("C", date(2020, 1, 1), date(2020, 1, 31));
        assert_eq!(closes[0].date, date(2020, 1, 2));
    }
}
