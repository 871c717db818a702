use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fraction stored as a decimal (0.003 = 0.3%).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Percentage(pub Decimal);

impl Percentage {
    /// Converts a pool fee tier expressed in hundredths of a bip (3000 = 0.30%).
    pub fn from_fee_tier(fee_tier: u32) -> Self {
        Self(Decimal::from(fee_tier) / Decimal::from(1_000_000))
    }

    /// Converts a percent figure as reported by feeds (12.5 = 12.5%).
    pub fn from_percent(pct: Decimal) -> Self {
        Self(pct / Decimal::ONE_HUNDRED)
    }

    pub fn as_percent(&self) -> Decimal {
        self.0 * Decimal::ONE_HUNDRED
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percent().normalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_fee_tier_conversion() {
        assert_eq!(Percentage::from_fee_tier(3000).0, dec!(0.003));
        assert_eq!(Percentage::from_fee_tier(500).to_string(), "0.05%");
        assert_eq!(Percentage::from_fee_tier(10000).to_string(), "1%");
    }
}
