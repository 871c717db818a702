use crate::enums::RangeStatus;
use crate::value_objects::price::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Price bounds of a concentrated liquidity position.
///
/// Constructors enforce `0 < lower < center < upper`; a range that violates
/// it cannot be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionRange {
    pub lower_price: Price,
    pub upper_price: Price,
    pub center_price: Price,
}

impl PositionRange {
    pub fn new(lower: Price, upper: Price, center: Price) -> Option<Self> {
        if lower.value <= Decimal::ZERO
            || lower.value >= center.value
            || center.value >= upper.value
        {
            return None;
        }
        Some(Self {
            lower_price: lower,
            upper_price: upper,
            center_price: center,
        })
    }

    /// Builds `[center * (1 - w), center * (1 + w)]`.
    pub fn centered(center: Price, half_width: Decimal) -> Option<Self> {
        if half_width <= Decimal::ZERO || half_width >= Decimal::ONE {
            return None;
        }
        let lower = center.value.checked_mul(Decimal::ONE - half_width)?;
        let upper = center.value.checked_mul(Decimal::ONE + half_width)?;
        Self::new(Price::new(lower), Price::new(upper), center)
    }

    /// Inclusive on both edges.
    pub fn contains(&self, price: Price) -> bool {
        price.value >= self.lower_price.value && price.value <= self.upper_price.value
    }

    pub fn status(&self, price: Price) -> RangeStatus {
        if self.contains(price) {
            RangeStatus::InRange
        } else {
            RangeStatus::OutOfRange
        }
    }

    /// Fractional distance from the center to the upper edge.
    pub fn half_width(&self) -> Decimal {
        (self.upper_price.value - self.center_price.value) / self.center_price.value
    }
}
