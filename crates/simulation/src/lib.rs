//! Backtesting engine for concentrated liquidity positions.
//!
//! Replays a pool's recorded history against a position range, optionally
//! recentering it on every breach, and reports the value of the position
//! against holding the tokens it was opened with.

pub mod error;
pub mod event;
pub mod prelude;
pub mod report;
pub mod state;
pub mod strategies;
pub mod strategy_simulator;
