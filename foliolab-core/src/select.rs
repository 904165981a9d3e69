//! Candidate selection: rank scored tickers against a threshold.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::scoring::ScoreModel;

/// A ticker that passed the score threshold at a decision date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub ticker: String,
    pub score: f64,
}

/// Outcome of one decision date's selection.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Candidates with `score > threshold`, descending score, ties broken by
    /// ticker ascending.
    pub candidates: Vec<Candidate>,
    /// Tickers excluded because the scorer failed, with the reason. These are
    /// never treated as score 0.
    pub skipped: Vec<(String, String)>,
}

impl Selection {
    pub fn tickers(&self) -> Vec<String> {
        self.candidates.iter().map(|c| c.ticker.clone()).collect()
    }
}

#[derive(Debug, Clone, Error)]
pub enum SelectError {
    /// The caller asked for predictions at a date other than the decision
    /// date. Anything later is a look-ahead bug; this component rejects any
    /// mismatch outright.
    #[error("look-ahead guard: as_of {as_of} differs from decision date {decision_date}")]
    LookAhead {
        decision_date: NaiveDate,
        as_of: NaiveDate,
    },
}

/// Score the universe with `model` and keep tickers above `threshold`.
///
/// `as_of` must equal `decision_date`; the scorer is never invoked with any
/// other date. Ordering is fully deterministic.
pub fn select(
    decision_date: NaiveDate,
    as_of: NaiveDate,
    universe: &[String],
    model: &dyn ScoreModel,
    threshold: f64,
) -> Result<Selection, SelectError> {
    if as_of != decision_date {
        return Err(SelectError::LookAhead { decision_date, as_of });
    }

    let mut selection = Selection::default();
    for ticker in universe {
        match model.predict(ticker, as_of) {
            Ok(score) if score > threshold => {
                selection.candidates.push(Candidate { ticker: ticker.clone(), score });
            }
            Ok(_) => {}
            Err(e) => selection.skipped.push((ticker.clone(), e.to_string())),
        }
    }
    selection.candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.ticker.cmp(&b.ticker))
    });
    Ok(selection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{ScoreError, ScoreTable, ScoringProvider};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn universe(tickers: &[&str]) -> Vec<String> {
        tickers.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn ranks_descending_with_ticker_tiebreak() {
        let d = date(2020, 1, 31);
        let table = ScoreTable::new([
            (d, "C".to_string(), 0.05),
            (d, "A".to_string(), 0.05),
            (d, "B".to_string(), 0.09),
        ]);
        let model = table.train(d).unwrap();
        let sel = select(d, d, &universe(&["A", "B", "C"]), model.as_ref(), 0.0).unwrap();
        let tickers = sel.tickers();
        assert_eq!(tickers, vec!["B", "A", "C"]);
    }

    #[test]
    fn threshold_is_strict() {
        let d = date(2020, 1, 31);
        let table = ScoreTable::new([
            (d, "A".to_string(), 0.05),
            (d, "B".to_string(), 0.0),
        ]);
        let model = table.train(d).unwrap();
        let sel = select(d, d, &universe(&["A", "B"]), model.as_ref(), 0.0).unwrap();
        assert_eq!(sel.tickers(), vec!["A"]);
    }

    #[test]
    fn scorer_failure_excludes_and_records() {
        let d = date(2020, 1, 31);
        let table = ScoreTable::new([(d, "A".to_string(), 0.05)]);
        let model = table.train(d).unwrap();
        let sel = select(d, d, &universe(&["A", "B"]), model.as_ref(), 0.0).unwrap();
        assert_eq!(sel.tickers(), vec!["A"]);
        assert_eq!(sel.skipped.len(), 1);
        assert_eq!(sel.skipped[0].0, "B");
    }

    #[test]
    fn mismatched_as_of_is_rejected() {
        let d = date(2020, 1, 31);
        let table = ScoreTable::new([(d, "A".to_string(), 0.05)]);
        let model = table.train(d).unwrap();
        let err =
            select(d, date(2020, 2, 3), &universe(&["A"]), model.as_ref(), 0.0).unwrap_err();
        assert!(matches!(err, SelectError::LookAhead { .. }));
    }

    /// Model that counts invocations and always fails.
    struct FailingModel;
    impl ScoreModel for FailingModel {
        fn predict(&self, ticker: &str, as_of: NaiveDate) -> Result<f64, ScoreError> {
            Err(ScoreError::Unavailable {
                ticker: ticker.to_string(),
                as_of,
                reason: "offline".into(),
            })
        }
    }

    #[test]
    fn all_failures_yield_empty_candidates() {
        let d = date(2020, 1, 31);
        let sel = select(d, d, &universe(&["A", "B"]), &FailingModel, 0.0).unwrap();
        assert!(sel.candidates.is_empty());
        assert_eq!(sel.skipped.len(), 2);
    }
}
