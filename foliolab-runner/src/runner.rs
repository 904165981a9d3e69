//! Backtest runner — wires schedule, scoring, selection, and simulation
//! into a full walk-forward run.
//!
//! Per decision date: retrain the scorer, predict the universe in parallel,
//! rank candidates, enter equal-weight positions, then walk daily to the
//! next decision date. Positions never survive a period boundary, so each
//! period starts from an all-cash state that already carries the compounded
//! result of every prior period.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use foliolab_core::domain::{PortfolioSnapshot, Trade};
use foliolab_core::schedule::{schedule, ScheduleError};
use foliolab_core::scoring::{ScoreError, ScoreModel, ScoringProvider};
use foliolab_core::select::{select, SelectError};
use foliolab_core::sim::{PortfolioSimulator, SimError};
use foliolab_core::store::PriceSeriesStore;

use crate::config::{ConfigError, ResumeCursor, RunConfig, RunId};
use crate::metrics::SummaryMetrics;

/// Errors from the runner. Per-ticker problems never land here; they are
/// recovered inside the run and surface as warnings on the result.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("schedule error: {0}")]
    Schedule(#[from] ScheduleError),
    #[error("selection error: {0}")]
    Select(#[from] SelectError),
    #[error("simulation error on run {run_id}: {source}")]
    Sim { run_id: RunId, source: SimError },
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

pub(crate) fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Complete result of a single backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub run_id: RunId,
    pub config: RunConfig,
    pub trades: Vec<Trade>,
    pub snapshots: Vec<PortfolioSnapshot>,
    pub metrics: SummaryMetrics,
    /// Non-fatal data problems encountered during the run, in order.
    pub warnings: Vec<String>,
}

/// Model adapter over scores precomputed in parallel for one decision date.
struct ScoredUniverse {
    scores: BTreeMap<String, Result<f64, ScoreError>>,
    as_of: NaiveDate,
}

impl ScoredUniverse {
    /// Fan the predict calls out across the universe. Results land in a
    /// `BTreeMap`, so downstream iteration order is independent of thread
    /// scheduling.
    fn compute(model: &dyn ScoreModel, universe: &[String], as_of: NaiveDate) -> Self {
        let scores = universe
            .par_iter()
            .map(|ticker| (ticker.clone(), model.predict(ticker, as_of)))
            .collect();
        Self { scores, as_of }
    }
}

impl ScoreModel for ScoredUniverse {
    fn predict(&self, ticker: &str, as_of: NaiveDate) -> Result<f64, ScoreError> {
        if as_of != self.as_of {
            return Err(ScoreError::Unavailable {
                ticker: ticker.to_string(),
                as_of,
                reason: format!("scores were computed as of {}", self.as_of),
            });
        }
        match self.scores.get(ticker) {
            Some(result) => result.clone(),
            None => Err(ScoreError::Unavailable {
                ticker: ticker.to_string(),
                as_of,
                reason: "ticker not in scored universe".into(),
            }),
        }
    }
}

/// Run one full walk-forward backtest.
///
/// `resume` skips every period whose decision date is at or before the
/// cursor; the skipped periods' capital effects are not replayed, so a
/// resumed run reports only the remaining periods.
pub fn run_backtest(
    config: &RunConfig,
    store: &dyn PriceSeriesStore,
    scorer: &dyn ScoringProvider,
    resume: Option<ResumeCursor>,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let run_id = config.run_id();

    let decision_dates = schedule(store, config.start_date, config.end_date, config.frequency)?;

    let mut sim = PortfolioSimulator::new(config.initial_capital, config.triggers);
    let mut snapshots = Vec::new();
    let mut warnings = Vec::new();

    // The final decision date only closes out the last period; it gets no
    // new entries because there is nothing left to hold them through.
    for window in decision_dates.windows(2) {
        let (decision_date, period_end) = (window[0], window[1]);
        if resume.is_some_and(|cursor| decision_date <= cursor.last_completed) {
            continue;
        }

        let starting_capital = sim.total_capital();
        let mut entered = 0;
        match scorer.train(decision_date) {
            Ok(model) => {
                let scored = ScoredUniverse::compute(model.as_ref(), &config.universe, decision_date);
                let selection = select(
                    decision_date,
                    decision_date,
                    &config.universe,
                    &scored,
                    config.score_threshold,
                )?;
                for (ticker, reason) in &selection.skipped {
                    warnings.push(format!(
                        "'{ticker}' excluded at {decision_date}: {reason}"
                    ));
                }
                entered = sim.enter_targets(store, decision_date, &selection.tickers());
            }
            Err(e) => {
                warnings.push(format!(
                    "scorer training failed at {decision_date}: {e}; no entries this period"
                ));
            }
        }

        sim.run_period(store, decision_date, period_end)
            .map_err(|source| RunError::Sim { run_id: run_id.clone(), source })?;
        // Drain per period so simulator warnings interleave chronologically
        // with the runner's own.
        warnings.extend(sim.take_warnings());

        let ending_capital = sim.total_capital();
        snapshots.push(PortfolioSnapshot::from_capital(
            decision_date,
            period_end,
            starting_capital,
            ending_capital,
            entered,
            ending_capital / config.initial_capital - 1.0,
        ));
    }

    let (ledger, sim_warnings) = sim.into_parts();
    warnings.extend(sim_warnings);
    let trades = ledger.into_trades();
    let metrics = SummaryMetrics::compute(&trades, &snapshots);

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        run_id,
        config: config.clone(),
        trades,
        snapshots,
        metrics,
        warnings,
    })
}
