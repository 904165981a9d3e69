//! FolioLab Core — walk-forward portfolio backtesting engine.
//!
//! This crate contains the heart of the system:
//! - Domain types (positions, trades, corporate actions, period snapshots)
//! - Price store interface with an in-memory implementation
//! - Rebalance scheduling from the actual trading calendar
//! - Scoring provider interface (rolling retraining as a pure function)
//! - Candidate selection with a look-ahead guard
//! - Portfolio simulator: dividend-aware marks and asset-value exit triggers
//! - Append-only trade ledger
//! - Seeded synthetic data for tests and demos
//!
//! Orchestration (full runs, metrics, sweeps, export) lives in
//! `foliolab-runner`.

pub mod domain;
pub mod schedule;
pub mod scoring;
pub mod select;
pub mod sim;
pub mod store;
pub mod synthetic;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything shared across sweep workers is
    /// Send + Sync. Stores and trained models cross thread boundaries;
    /// simulator state deliberately stays exclusive per run.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Position>();
        require_sync::<domain::Position>();
        require_send::<domain::Trade>();
        require_sync::<domain::Trade>();
        require_send::<domain::CorporateAction>();
        require_sync::<domain::CorporateAction>();
        require_send::<domain::PortfolioSnapshot>();
        require_sync::<domain::PortfolioSnapshot>();

        require_send::<store::InMemoryStore>();
        require_sync::<store::InMemoryStore>();
        require_send::<scoring::ScoreTable>();
        require_sync::<scoring::ScoreTable>();
        require_send::<Box<dyn scoring::ScoreModel>>();
        require_sync::<Box<dyn scoring::ScoreModel>>();

        require_send::<sim::TriggerConfig>();
        require_sync::<sim::TriggerConfig>();
        require_send::<sim::ledger::TradeLedger>();
        require_sync::<sim::ledger::TradeLedger>();
        require_send::<sim::PortfolioSimulator>();
    }
}
