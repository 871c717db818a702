//! Domain model and AMM math for concentrated-liquidity range analysis.
//!
//! The math library is total: every function returns a documented sentinel
//! for degenerate input instead of failing, so callers can run it over long
//! batches of historical samples without per-call error handling.

pub mod cadence;
pub mod entities;
pub mod enums;
pub mod math;
pub mod metrics;
pub mod value_objects;

pub mod prelude {
    //! Commonly used domain types.
    pub use crate::cadence::SamplingCadence;
    pub use crate::entities::{LiquidityPosition, PoolCandidate, PoolHistory, PriceSnapshot};
    pub use crate::enums::RangeStatus;
    pub use crate::value_objects::percentage::Percentage;
    pub use crate::value_objects::price::Price;
    pub use crate::value_objects::price_range::PositionRange;
}
