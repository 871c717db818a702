//! Recenter the position on the current price every time it leaves its range.

use super::{RebalanceAction, RebalanceReason, RebalanceStrategy, StrategyContext};

#[derive(Debug, Clone, Copy, Default)]
pub struct RecenterOnBreach;

impl RecenterOnBreach {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RebalanceStrategy for RecenterOnBreach {
    fn evaluate(&self, context: &StrategyContext) -> RebalanceAction {
        if context.is_in_range() {
            return RebalanceAction::Hold;
        }
        RebalanceAction::Rebalance {
            reason: RebalanceReason::OutOfRange {
                current_price: context.current_price.value,
            },
        }
    }

    fn name(&self) -> &'static str {
        "Recenter On Breach"
    }
}
