//! Prelude module for convenient imports.
//!
//! ```rust
//! use range_scout_simulation::prelude::*;
//! ```

// Errors
pub use crate::error::BacktestError;

// Events
pub use crate::event::{EventData, EventLog, SimulationEvent, SimulationEventType};

// Report
pub use crate::report::{BacktestReport, RunMetadata, TraceStep};

// Configuration and state
pub use crate::state::{BacktestConfig, FeeModel, RangeSpec, RebalancePolicy, SimulationState};

// Strategies
pub use crate::strategies::{
    RebalanceAction, RebalanceReason, RebalanceStrategy, RecenterOnBreach, StaticRange,
    StrategyContext,
};

// Engine
pub use crate::strategy_simulator::{run_backtest, simulate_with_strategy};
