//! Parameter sweep over exit-trigger grids.
//!
//! Runs one full backtest per (stop loss, take profit, trailing stop)
//! combination, in parallel. The price store and scorer are shared
//! read-only across workers; each worker owns its simulator state.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use foliolab_core::scoring::ScoringProvider;
use foliolab_core::sim::TriggerConfig;
use foliolab_core::store::PriceSeriesStore;

use crate::config::{RunConfig, RunId};
use crate::metrics::SummaryMetrics;
use crate::runner::{run_backtest, RunError};

/// Trigger grid specification. The sweep takes the cartesian product of the
/// three axes; `None` entries disable that trigger for the combination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerGrid {
    pub stop_loss: Vec<f64>,
    pub take_profit: Vec<Option<f64>>,
    pub trailing_stop: Vec<Option<f64>>,
}

impl TriggerGrid {
    /// Total number of combinations in this grid.
    pub fn size(&self) -> usize {
        self.stop_loss.len() * self.take_profit.len() * self.trailing_stop.len()
    }

    /// All trigger configurations in grid order. Cost model and holding
    /// horizon are carried over from `base` unchanged.
    pub fn combinations(&self, base: TriggerConfig) -> Vec<TriggerConfig> {
        let mut combos = Vec::with_capacity(self.size());
        for &stop_loss in &self.stop_loss {
            for &take_profit in &self.take_profit {
                for &trailing_stop in &self.trailing_stop {
                    combos.push(TriggerConfig {
                        stop_loss_pct: Some(stop_loss),
                        take_profit_pct: take_profit,
                        trailing_stop_pct: trailing_stop,
                        ..base
                    });
                }
            }
        }
        combos
    }
}

/// Objective used to pick the best combination from a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    MaxAnnualizedReturn,
    MinMaxDrawdown,
    /// `annualized_return - 0.5 × |max_drawdown|`.
    ReturnDrawdownBlend,
}

impl Objective {
    /// Score where higher is always better.
    pub fn score(self, metrics: &SummaryMetrics) -> f64 {
        match self {
            Objective::MaxAnnualizedReturn => metrics.annualized_return,
            Objective::MinMaxDrawdown => -metrics.max_drawdown.abs(),
            Objective::ReturnDrawdownBlend => {
                metrics.annualized_return - 0.5 * metrics.max_drawdown.abs()
            }
        }
    }
}

/// One row of sweep output: the combination and its run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRow {
    pub triggers: TriggerConfig,
    pub run_id: RunId,
    pub metrics: SummaryMetrics,
}

/// Run the full grid against `base` and return one row per combination, in
/// grid order regardless of which worker finished first.
pub fn sweep(
    base: &RunConfig,
    grid: &TriggerGrid,
    store: &dyn PriceSeriesStore,
    scorer: &dyn ScoringProvider,
) -> Result<Vec<SweepRow>, RunError> {
    let combos = grid.combinations(base.triggers);
    combos
        .into_par_iter()
        .map(|triggers| {
            let config = RunConfig { triggers, ..base.clone() };
            let result = run_backtest(&config, store, scorer, None)?;
            Ok(SweepRow { triggers, run_id: result.run_id, metrics: result.metrics })
        })
        .collect()
}

/// Best row under `objective`. Ties keep the earlier row, so the pick is
/// deterministic in grid order.
pub fn best_by(rows: &[SweepRow], objective: Objective) -> Option<&SweepRow> {
    let mut best: Option<(&SweepRow, f64)> = None;
    for row in rows {
        let score = objective.score(&row.metrics);
        if !score.is_finite() {
            continue;
        }
        match best {
            Some((_, best_score)) if score <= best_score => {}
            _ => best = Some((row, score)),
        }
    }
    best.map(|(row, _)| row)
}
