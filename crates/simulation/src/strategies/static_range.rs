//! Static range strategy: set a range and hold it whatever the price does.

use super::{RebalanceAction, RebalanceStrategy, StrategyContext};

/// Never rebalances. Baseline for comparing other strategies.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticRange;

impl StaticRange {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RebalanceStrategy for StaticRange {
    fn evaluate(&self, _context: &StrategyContext) -> RebalanceAction {
        RebalanceAction::Hold
    }

    fn name(&self) -> &'static str {
        "Static Range"
    }
}
