//! Rebalancing strategies.
//!
//! A strategy only decides *whether* to move the position; the engine sizes
//! and opens the replacement from the run's [`crate::state::RangeSpec`].

mod recenter;
mod static_range;

pub use recenter::RecenterOnBreach;
pub use static_range::StaticRange;

use range_scout_domain::value_objects::price::Price;
use range_scout_domain::value_objects::price_range::PositionRange;
use rust_decimal::Decimal;

/// What a strategy sees at each step.
#[derive(Debug, Clone, Copy)]
pub struct StrategyContext {
    pub current_price: Price,
    pub current_range: PositionRange,
}

impl StrategyContext {
    pub fn is_in_range(&self) -> bool {
        self.current_range.contains(self.current_price)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RebalanceReason {
    OutOfRange { current_price: Decimal },
}

impl std::fmt::Display for RebalanceReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RebalanceReason::OutOfRange { current_price } => {
                write!(f, "price {current_price} out of range")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RebalanceAction {
    Hold,
    Rebalance { reason: RebalanceReason },
}

pub trait RebalanceStrategy {
    fn evaluate(&self, context: &StrategyContext) -> RebalanceAction;
    fn name(&self) -> &'static str;
}
