//! Performance metrics — pure functions over the trade list and the
//! per-period equity curve.
//!
//! Every metric is a pure function: trades and/or snapshots in, scalar out.
//! Re-aggregating the same inputs always yields identical output.

use serde::{Deserialize, Serialize};

use foliolab_core::domain::{PortfolioSnapshot, Trade};

/// Aggregate performance metrics for a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryMetrics {
    pub total_return: f64,
    pub annualized_return: f64,
    /// Worst peak-to-trough drawdown over the period equity curve, as a
    /// negative fraction.
    pub max_drawdown: f64,
    pub win_rate: f64,
    /// Mean winning net return over mean losing net return magnitude.
    /// `None` when there are no losing trades.
    pub payoff_ratio: Option<f64>,
    pub trade_count: usize,
}

impl SummaryMetrics {
    /// Compute all metrics from the closed-trade list and the per-period
    /// snapshot sequence.
    pub fn compute(trades: &[Trade], snapshots: &[PortfolioSnapshot]) -> Self {
        Self {
            total_return: total_return(snapshots),
            annualized_return: annualized_return(snapshots),
            max_drawdown: max_drawdown(snapshots),
            win_rate: win_rate(trades),
            payoff_ratio: payoff_ratio(trades),
            trade_count: trades.len(),
        }
    }
}

/// Total return over the whole run: ending over starting capital, minus one.
pub fn total_return(snapshots: &[PortfolioSnapshot]) -> f64 {
    match (snapshots.first(), snapshots.last()) {
        (Some(first), Some(last)) if first.starting_capital > 0 => {
            last.ending_capital as f64 / first.starting_capital as f64 - 1.0
        }
        _ => 0.0,
    }
}

/// Calendar-day annualization: `(end / start)^(365 / days) - 1`.
pub fn annualized_return(snapshots: &[PortfolioSnapshot]) -> f64 {
    let (Some(first), Some(last)) = (snapshots.first(), snapshots.last()) else {
        return 0.0;
    };
    let days = (last.period_end - first.period_start).num_days();
    if days <= 0 || first.starting_capital <= 0 || last.ending_capital <= 0 {
        return 0.0;
    }
    let growth = last.ending_capital as f64 / first.starting_capital as f64;
    growth.powf(365.0 / days as f64) - 1.0
}

/// Max drawdown over the period-end equity curve (seeded with the first
/// period's starting capital). Inter-period risk, not per-trade risk.
pub fn max_drawdown(snapshots: &[PortfolioSnapshot]) -> f64 {
    let Some(first) = snapshots.first() else {
        return 0.0;
    };
    let mut peak = first.starting_capital as f64;
    let mut worst: f64 = 0.0;
    for snapshot in snapshots {
        let equity = snapshot.ending_capital as f64;
        if equity > peak {
            peak = equity;
        } else if peak > 0.0 {
            worst = worst.min(equity / peak - 1.0);
        }
    }
    worst
}

/// Fraction of trades with positive net return.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.net_return > 0.0).count();
    winners as f64 / trades.len() as f64
}

/// `mean(net_return | win) / |mean(net_return | loss)|`, or `None` when no
/// losing trades exist (the ratio is undefined, not infinite).
pub fn payoff_ratio(trades: &[Trade]) -> Option<f64> {
    let wins: Vec<f64> = trades.iter().map(|t| t.net_return).filter(|r| *r > 0.0).collect();
    let losses: Vec<f64> = trades.iter().map(|t| t.net_return).filter(|r| *r < 0.0).collect();
    if losses.is_empty() {
        return None;
    }
    let mean = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
    let avg_win = if wins.is_empty() { 0.0 } else { mean(&wins) };
    Some(avg_win / mean(&losses).abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use foliolab_core::domain::ExitReason;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn snapshot(start: i64, end: i64, period: (NaiveDate, NaiveDate)) -> PortfolioSnapshot {
        PortfolioSnapshot::from_capital(
            period.0,
            period.1,
            start as f64,
            end as f64,
            1,
            end as f64 / 1_000_000.0 - 1.0,
        )
    }

    fn trade_with_net(net_return: f64) -> Trade {
        Trade {
            ticker: "A".into(),
            entry_date: date(2020, 1, 31),
            entry_price: 100.0,
            exit_date: date(2020, 2, 28),
            exit_price: 100.0 * (1.0 + net_return),
            exit_reason: ExitReason::Normal,
            shares: 10.0,
            dividends_received: 0.0,
            gross_return: net_return,
            gross_pnl: 1_000.0 * net_return,
            net_return,
            net_pnl: 1_000.0 * net_return,
            transaction_costs: 0.0,
            holding_days: 28,
        }
    }

    #[test]
    fn annualized_matches_365_day_doubling() {
        let snapshots = vec![snapshot(
            1_000_000,
            2_000_000,
            (date(2020, 1, 1), date(2020, 12, 31)),
        )];
        let ann = annualized_return(&snapshots);
        // 2020-01-01 to 2020-12-31 is exactly 365 days, so annualized
        // return equals the raw doubling.
        assert!((ann - 1.0).abs() < 1e-9);
    }

    #[test]
    fn drawdown_tracks_running_peak() {
        let snapshots = vec![
            snapshot(1_000_000, 1_200_000, (date(2020, 1, 1), date(2020, 1, 31))),
            snapshot(1_200_000, 900_000, (date(2020, 1, 31), date(2020, 2, 28))),
            snapshot(900_000, 1_300_000, (date(2020, 2, 28), date(2020, 3, 31))),
        ];
        let mdd = max_drawdown(&snapshots);
        assert!((mdd - (900_000.0 / 1_200_000.0 - 1.0)).abs() < 1e-12);
    }

    #[test]
    fn win_rate_counts_positive_net() {
        let trades = vec![trade_with_net(0.1), trade_with_net(-0.05), trade_with_net(0.02)];
        assert!((win_rate(&trades) - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn payoff_ratio_undefined_without_losers() {
        let trades = vec![trade_with_net(0.1), trade_with_net(0.02)];
        assert_eq!(payoff_ratio(&trades), None);
    }

    #[test]
    fn payoff_ratio_mean_over_mean() {
        let trades = vec![trade_with_net(0.10), trade_with_net(0.06), trade_with_net(-0.04)];
        let ratio = payoff_ratio(&trades).unwrap();
        assert!((ratio - 0.08 / 0.04).abs() < 1e-12);
    }

    #[test]
    fn reaggregation_is_idempotent() {
        let trades = vec![trade_with_net(0.1), trade_with_net(-0.02)];
        let snapshots = vec![
            snapshot(1_000_000, 1_080_000, (date(2020, 1, 1), date(2020, 6, 30))),
        ];
        let a = SummaryMetrics::compute(&trades, &snapshots);
        let b = SummaryMetrics::compute(&trades, &snapshots);
        assert_eq!(a, b);
    }
}
