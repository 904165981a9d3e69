//! Seeded synthetic market data for tests, benches, and demo runs.
//!
//! Series are plain random walks built from an `StdRng` seeded per ticker,
//! so the same seed always produces the same prices regardless of the order
//! tickers are generated in.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::CorporateAction;
use crate::store::{InMemoryStore, PricePoint};

/// Parameters for one synthetic close series.
#[derive(Debug, Clone, Copy)]
pub struct WalkParams {
    pub start_price: f64,
    /// Mean daily log-return.
    pub drift: f64,
    /// Daily return noise amplitude.
    pub volatility: f64,
}

impl Default for WalkParams {
    fn default() -> Self {
        Self { start_price: 100.0, drift: 0.0003, volatility: 0.015 }
    }
}

fn seed_for(master_seed: u64, ticker: &str) -> u64 {
    let mut hasher = blake3::Hasher::new();
    hasher.update(&master_seed.to_le_bytes());
    hasher.update(ticker.as_bytes());
    let hash = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(bytes)
}

/// Generate a weekday-only random-walk close series for `ticker` over
/// `[start, end]`, deterministic in `(master_seed, ticker)`.
pub fn walk_series(
    master_seed: u64,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    params: WalkParams,
) -> Vec<PricePoint> {
    let mut rng = StdRng::seed_from_u64(seed_for(master_seed, ticker));
    let mut price = params.start_price;
    let mut points = Vec::new();
    let mut day = start;
    while day <= end {
        if day.weekday().num_days_from_monday() < 5 {
            let noise: f64 = rng.gen_range(-1.0..1.0);
            price *= (params.drift + params.volatility * noise).exp();
            // Floor keeps the walk strictly positive even under long slides.
            price = price.max(0.01);
            points.push(PricePoint { date: day, close: price });
        }
        day = match day.succ_opt() {
            Some(d) => d,
            None => break,
        };
    }
    points
}

/// A yearly cash-dividend calendar for `ticker`: one mid-July ex-date per
/// year in range, paying `per_share`.
pub fn yearly_cash_dividends(
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    per_share: f64,
) -> Vec<CorporateAction> {
    let mut actions = Vec::new();
    for year in start.year()..=end.year() {
        if let Some(ex_date) = NaiveDate::from_ymd_opt(year, 7, 15) {
            if ex_date >= start && ex_date <= end {
                actions.push(CorporateAction::cash(ticker, ex_date, per_share));
            }
        }
    }
    actions
}

/// Build a fully populated store for `tickers` over `[start, end]`: one
/// random-walk series and one yearly dividend calendar each.
pub fn demo_store(
    master_seed: u64,
    tickers: &[&str],
    start: NaiveDate,
    end: NaiveDate,
) -> InMemoryStore {
    let mut store = InMemoryStore::new();
    for ticker in tickers {
        let series = walk_series(master_seed, ticker, start, end, WalkParams::default());
        let dividends = yearly_cash_dividends(ticker, start, end, 2.0);
        store = store
            .with_series(ticker.to_string(), series)
            .with_actions(ticker.to_string(), dividends);
    }
    store
}
