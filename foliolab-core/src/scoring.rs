//! Scoring provider interface: rolling retraining as a pure function.
//!
//! How scores are produced is out of scope — the engine only needs
//! `train(as_of)` to yield a model fitted strictly on data before `as_of`,
//! and `predict` on the returned model. Keeping the trained model an explicit
//! value (rather than hidden state on the provider) is what makes the
//! walk-forward loop reproducible.

use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ScoreError {
    /// The provider cannot score this ticker at this date. The ticker is
    /// excluded from that period's candidate set, never treated as score 0.
    #[error("scorer unavailable for '{ticker}' as of {as_of}: {reason}")]
    Unavailable {
        ticker: String,
        as_of: NaiveDate,
        reason: String,
    },
    #[error("no training data before {as_of}")]
    NoTrainingData { as_of: NaiveDate },
}

/// A model trained as of a fixed cutoff. Implementations must be pure:
/// repeated calls with the same arguments return the same score.
pub trait ScoreModel: Send + Sync {
    fn predict(&self, ticker: &str, as_of: NaiveDate) -> Result<f64, ScoreError>;
}

/// Trains a model on data strictly before `as_of`.
pub trait ScoringProvider: Send + Sync {
    fn train(&self, as_of: NaiveDate) -> Result<Box<dyn ScoreModel>, ScoreError>;
}

/// Deterministic table-backed provider for tests and demos.
///
/// Scores are keyed by (as-of date, ticker); missing entries predict as
/// [`ScoreError::Unavailable`].
#[derive(Debug, Default, Clone)]
pub struct ScoreTable {
    scores: Arc<BTreeMap<(NaiveDate, String), f64>>,
}

impl ScoreTable {
    pub fn new(entries: impl IntoIterator<Item = (NaiveDate, String, f64)>) -> Self {
        let scores = entries
            .into_iter()
            .map(|(d, t, s)| ((d, t), s))
            .collect::<BTreeMap<_, _>>();
        Self { scores: Arc::new(scores) }
    }
}

struct TableModel {
    cutoff: NaiveDate,
    scores: Arc<BTreeMap<(NaiveDate, String), f64>>,
}

impl ScoreModel for TableModel {
    fn predict(&self, ticker: &str, as_of: NaiveDate) -> Result<f64, ScoreError> {
        debug_assert!(as_of <= self.cutoff, "prediction past the training cutoff");
        self.scores
            .get(&(as_of, ticker.to_string()))
            .copied()
            .ok_or_else(|| ScoreError::Unavailable {
                ticker: ticker.to_string(),
                as_of,
                reason: "no score in table".into(),
            })
    }
}

impl ScoringProvider for ScoreTable {
    fn train(&self, as_of: NaiveDate) -> Result<Box<dyn ScoreModel>, ScoreError> {
        Ok(Box::new(TableModel {
            cutoff: as_of,
            scores: Arc::clone(&self.scores),
        }))
    }
}
