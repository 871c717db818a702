use serde::{Deserialize, Serialize};

/// Whether the current price sits inside a position's bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RangeStatus {
    InRange,
    OutOfRange,
}

impl RangeStatus {
    pub fn is_in_range(self) -> bool {
        matches!(self, RangeStatus::InRange)
    }
}
