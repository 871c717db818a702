use crate::math::concentrated_liquidity::{liquidity_for_capital, token_amounts};
use crate::value_objects::price::Price;
use crate::value_objects::price_range::PositionRange;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A liquidity amount committed to one range. Holdings are derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LiquidityPosition {
    pub liquidity: Decimal,
    pub range: PositionRange,
}

impl LiquidityPosition {
    /// Sizes a position worth `capital` (in the price's quote numeraire) at `price`.
    ///
    /// Returns `None` when no liquidity can be opened: non-positive capital or a
    /// price not strictly inside the range.
    pub fn open(capital: Decimal, price: Price, range: PositionRange) -> Option<Self> {
        let liquidity = liquidity_for_capital(
            capital,
            price.value,
            range.lower_price.value,
            range.upper_price.value,
        );
        (liquidity > Decimal::ZERO).then_some(Self { liquidity, range })
    }

    /// `(amount_base, amount_quote)` at `price`.
    pub fn amounts_at(&self, price: Price) -> (Decimal, Decimal) {
        token_amounts(
            self.liquidity,
            price.value,
            self.range.lower_price.value,
            self.range.upper_price.value,
        )
    }

    /// Value in quote units at `price`.
    pub fn value_at(&self, price: Price) -> Decimal {
        let (base, quote) = self.amounts_at(price);
        base * price.value + quote
    }
}
