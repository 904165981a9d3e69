//! Portfolio simulator: equal-weight entries, daily mark-to-market,
//! corporate-action application, and exit-trigger evaluation.
//!
//! One simulator instance drives one backtest run. State is exclusive to the
//! run; the price store it reads from is shared and read-only. The machine is
//! strictly sequential along the time axis: each day's action catch-up and
//! trigger check depends on the previous day's position state.

pub mod ledger;

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};
use thiserror::Error;

use crate::domain::{CorporateAction, ExitReason, Position, Trade};
use crate::store::PriceSeriesStore;
use ledger::TradeLedger;

/// Exit-trigger and cost-model parameters. `None` disables that trigger.
///
/// All percentages are fractions (0.05 = 5%). Triggers compare the
/// asset-value return (`asset_value / cost_basis - 1`), never the raw price
/// return, so an ex-dividend drop does not read as a loss.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TriggerConfig {
    pub stop_loss_pct: Option<f64>,
    pub take_profit_pct: Option<f64>,
    pub trailing_stop_pct: Option<f64>,
    /// Cost applied to both the entry and exit notional of each round-trip.
    pub transaction_cost_pct: Option<f64>,
    /// Calendar-day cap on how long a position may be held past its entry.
    pub max_holding_days: Option<u32>,
}

/// Fatal simulation failures. Per-ticker problems (missing quotes, bad
/// action records) are recovered locally and surface as warnings instead.
#[derive(Debug, Clone, Error)]
pub enum SimError {
    /// Cash went negative, meaning the accounting is corrupted. Carries the
    /// last processed date so the run can be reproduced up to the failure.
    #[error("negative cash balance {cash:.2} on {date}; run is not recoverable")]
    NegativeCapital { date: NaiveDate, cash: f64 },
}

/// The walk-forward portfolio state machine.
///
/// Positions are keyed by ticker in a `BTreeMap` so every iteration order in
/// the run is deterministic.
#[derive(Debug)]
pub struct PortfolioSimulator {
    cash: f64,
    initial_capital: f64,
    positions: BTreeMap<String, Position>,
    ledger: TradeLedger,
    warnings: Vec<String>,
    config: TriggerConfig,
}

/// Outcome of one day's trigger check for one position.
enum DayOutcome {
    Hold,
    Exit { price: f64, reason: ExitReason },
}

impl PortfolioSimulator {
    /// Seed the simulator once with `initial_capital`. Capital compounds
    /// across rebalance periods from here; it is never re-seeded.
    pub fn new(initial_capital: f64, config: TriggerConfig) -> Self {
        Self {
            cash: initial_capital,
            initial_capital,
            positions: BTreeMap::new(),
            ledger: TradeLedger::new(),
            warnings: Vec::new(),
            config,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_capital(&self) -> f64 {
        self.initial_capital
    }

    /// Cash plus open positions marked at their last observed close.
    pub fn total_capital(&self) -> f64 {
        self.cash + self.positions.values().map(Position::market_value).sum::<f64>()
    }

    pub fn open_position_count(&self) -> usize {
        self.positions.len()
    }

    pub fn ledger(&self) -> &TradeLedger {
        &self.ledger
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    /// Drain accumulated warnings, leaving the buffer empty. Lets a caller
    /// interleave simulator warnings with its own in event order.
    pub fn take_warnings(&mut self) -> Vec<String> {
        std::mem::take(&mut self.warnings)
    }

    pub fn into_parts(self) -> (TradeLedger, Vec<String>) {
        (self.ledger, self.warnings)
    }

    /// Open equal-weight positions in `targets` at their `decision_date`
    /// closes. The allocation divides the *current* cash by the target
    /// count; a target with no quote that day is skipped with a warning and
    /// its allocation stays in cash. Returns how many positions were opened.
    pub fn enter_targets(
        &mut self,
        store: &dyn PriceSeriesStore,
        decision_date: NaiveDate,
        targets: &[String],
    ) -> usize {
        if targets.is_empty() {
            return 0;
        }
        let allocation = self.cash / targets.len() as f64;
        let mut opened = 0;
        for ticker in targets {
            if self.positions.contains_key(ticker) {
                continue;
            }
            let Some(entry_price) = store.close_on(ticker, decision_date) else {
                self.warnings.push(format!(
                    "no quote for '{ticker}' on entry date {decision_date}; target skipped"
                ));
                continue;
            };
            if entry_price <= 0.0 || !entry_price.is_finite() {
                self.warnings.push(format!(
                    "unusable entry price {entry_price} for '{ticker}' on {decision_date}; target skipped"
                ));
                continue;
            }
            let has_action_feed = store
                .actions(ticker, decision_date, decision_date)
                .is_some();
            if !has_action_feed {
                self.warnings.push(format!(
                    "no corporate-action feed for '{ticker}'; early exits disabled for this position"
                ));
            }
            let position =
                Position::open(ticker.clone(), decision_date, entry_price, allocation, has_action_feed);
            self.cash -= position.cost_basis;
            self.positions.insert(ticker.clone(), position);
            opened += 1;
        }
        opened
    }

    /// Walk all trading days in `(period_start, period_end]`, applying
    /// corporate actions, marking positions, and evaluating triggers. Every
    /// position still open on its due date (the last trading day at or
    /// before `min(period_end, entry + max_holding_days)`) is force-closed.
    ///
    /// On return the simulator holds no open positions.
    pub fn run_period(
        &mut self,
        store: &dyn PriceSeriesStore,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Result<(), SimError> {
        let first_day = period_start
            .checked_add_days(Days::new(1))
            .unwrap_or(period_end);
        let days = store.trading_dates(first_day, period_end);

        // Due dates and pending actions are fixed at period start; the day
        // walk itself never touches the store for anything but quotes.
        let mut due_dates: BTreeMap<String, NaiveDate> = BTreeMap::new();
        let mut pending: BTreeMap<String, VecDeque<CorporateAction>> = BTreeMap::new();
        for (ticker, position) in &self.positions {
            let horizon = match self.config.max_holding_days {
                Some(cap) => position
                    .entry_date
                    .checked_add_days(Days::new(u64::from(cap)))
                    .map_or(period_end, |d| d.min(period_end)),
                None => period_end,
            };
            let due = days
                .iter()
                .copied()
                .take_while(|d| *d <= horizon)
                .last()
                .unwrap_or(period_start);
            due_dates.insert(ticker.clone(), due);
            if position.has_action_feed {
                let feed = store
                    .actions(ticker, first_day, period_end)
                    .unwrap_or_default();
                pending.insert(ticker.clone(), feed.into());
            }
        }

        for &day in &days {
            let tickers: Vec<String> = self.positions.keys().cloned().collect();
            for ticker in tickers {
                let outcome = self.step_position(store, &mut pending, &ticker, day, due_dates[&ticker]);
                if let DayOutcome::Exit { price, reason } = outcome {
                    self.close_position(&ticker, day, price, reason)?;
                }
            }
        }

        // A position can survive the walk only when it has no trading day on
        // or before its due date (entered on the last day of the period).
        let leftovers: Vec<String> = self.positions.keys().cloned().collect();
        for ticker in leftovers {
            let (price, date) = {
                let position = &self.positions[&ticker];
                (position.last_close, position.last_close_date)
            };
            self.warnings.push(format!(
                "position '{ticker}' saw no trading day before {period_end}; closed at its entry mark"
            ));
            self.close_position(&ticker, date.max(period_end), price, ExitReason::Normal)?;
        }
        Ok(())
    }

    /// One position-day: corporate-action catch-up, price mark, trigger
    /// check, and due-date handling.
    fn step_position(
        &mut self,
        store: &dyn PriceSeriesStore,
        pending: &mut BTreeMap<String, VecDeque<CorporateAction>>,
        ticker: &str,
        day: NaiveDate,
        due_date: NaiveDate,
    ) -> DayOutcome {
        // Catch up every action with ex_date on or before today, so ex-dates
        // falling on non-trading days are still applied.
        if let Some(feed) = pending.get_mut(ticker) {
            while feed.front().is_some_and(|a| a.ex_date <= day) {
                let Some(action) = feed.pop_front() else { break };
                if let Err(e) = action.validate() {
                    self.warnings.push(format!("corporate action skipped: {e}"));
                    continue;
                }
                if let Some(position) = self.positions.get_mut(ticker) {
                    let credited = position.apply_cash_dividend(action.cash_per_share());
                    self.cash += credited;
                    position.apply_stock_dividend(action.share_multiplier());
                }
            }
        }

        let Some(position) = self.positions.get_mut(ticker) else {
            return DayOutcome::Hold;
        };

        let quote = store.close_on(ticker, day);
        if let Some(close) = quote {
            position.mark(day, close);

            // Same-day precedence: stop loss, then take profit, then
            // trailing stop. The trailing exit reports as a stop loss.
            if position.has_action_feed {
                let ret = position.return_at(close);
                if let Some(sl) = self.config.stop_loss_pct {
                    if ret <= -sl {
                        return DayOutcome::Exit { price: close, reason: ExitReason::StopLoss };
                    }
                }
                if let Some(tp) = self.config.take_profit_pct {
                    if ret >= tp {
                        return DayOutcome::Exit { price: close, reason: ExitReason::TakeProfit };
                    }
                }
                if let Some(ts) = self.config.trailing_stop_pct {
                    let drawdown = position.asset_value(close) / position.peak_asset_value - 1.0;
                    if drawdown <= -ts {
                        return DayOutcome::Exit { price: close, reason: ExitReason::StopLoss };
                    }
                }
            }
        }

        if day >= due_date {
            return match quote {
                Some(close) => DayOutcome::Exit { price: close, reason: ExitReason::Normal },
                None => {
                    self.warnings.push(format!(
                        "no quote for '{ticker}' on exit date {day}; closed at last known price"
                    ));
                    let position = &self.positions[ticker];
                    DayOutcome::Exit {
                        price: position.last_close,
                        reason: ExitReason::NoData,
                    }
                }
            };
        }
        DayOutcome::Hold
    }

    /// Settle a position: credit the exit notional net of costs, record the
    /// round-trip in the ledger. Dividends were credited to cash at their
    /// ex-dates and are not credited again here.
    fn close_position(
        &mut self,
        ticker: &str,
        exit_date: NaiveDate,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> Result<(), SimError> {
        let Some(position) = self.positions.remove(ticker) else {
            return Ok(());
        };
        let exit_notional = exit_price * position.shares;
        let cost_pct = self.config.transaction_cost_pct.unwrap_or(0.0);
        let transaction_costs = cost_pct * (position.cost_basis + exit_notional);

        let gross_pnl = exit_notional + position.dividends_received - position.cost_basis;
        let gross_return = gross_pnl / position.cost_basis;
        let net_pnl = gross_pnl - transaction_costs;
        let net_return = net_pnl / position.cost_basis;

        self.cash += exit_notional - transaction_costs;
        if self.cash < -1e-6 {
            return Err(SimError::NegativeCapital { date: exit_date, cash: self.cash });
        }

        self.ledger.record(Trade {
            ticker: position.ticker,
            entry_date: position.entry_date,
            entry_price: position.entry_price,
            exit_date,
            exit_price,
            exit_reason,
            shares: position.shares,
            dividends_received: position.dividends_received,
            gross_return,
            gross_pnl,
            net_return,
            net_pnl,
            transaction_costs,
            holding_days: (exit_date - position.entry_date).num_days(),
        });
        Ok(())
    }
}
