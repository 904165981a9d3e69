//! Domain types: positions, corporate actions, trades, period snapshots.

pub mod action;
pub mod position;
pub mod snapshot;
pub mod trade;

pub use action::{ActionParseError, CorporateAction, FACE_VALUE};
pub use position::Position;
pub use snapshot::PortfolioSnapshot;
pub use trade::{ExitReason, Trade};
