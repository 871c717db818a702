use crate::math::concentrated_liquidity::{liquidity_for_capital, token_amounts};
use crate::math::volatility::MAX_RANGE_HALF_WIDTH;
use rust_decimal::Decimal;

/// Capital used to simulate a notional position; the result is a ratio so the size only
/// needs to be large enough to keep decimal precision.
const NOTIONAL: Decimal = Decimal::ONE_THOUSAND;

/// Deviation of a concentrated position from holding its opening tokens.
///
/// Opens a notional position at `entry_price` in `[price_lower, price_upper]`,
/// then compares its value at `current_price` with the value of the opening
/// token bundle at the same price: `(value_lp - value_held) / value_held`.
/// The result is zero or negative for price moves; degenerate input, including an
/// entry outside the range, returns zero.
pub fn impermanent_loss_between(
    entry_price: Decimal,
    current_price: Decimal,
    price_lower: Decimal,
    price_upper: Decimal,
) -> Decimal {
    if current_price <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let liquidity = liquidity_for_capital(NOTIONAL, entry_price, price_lower, price_upper);
    if liquidity.is_zero() {
        return Decimal::ZERO;
    }

    let (x0, y0) = token_amounts(liquidity, entry_price, price_lower, price_upper);
    let (x1, y1) = token_amounts(liquidity, current_price, price_lower, price_upper);

    let value_held = x0 * current_price + y0;
    let value_lp = x1 * current_price + y1;
    if value_held.is_zero() {
        return Decimal::ZERO;
    }
    (value_lp - value_held) / value_held
}

/// Worst-case loss versus holding when price reaches either edge of a symmetric range.
///
/// The range is `[1 - w, 1 + w]` around an entry of 1; the larger magnitude of
/// the two edge deviations is returned as a positive fraction. Widths are capped
/// at [`MAX_RANGE_HALF_WIDTH`]; non-positive widths return zero.
pub fn impermanent_loss_at_range_limit(range_half_width: Decimal) -> Decimal {
    if range_half_width <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let w = range_half_width.min(MAX_RANGE_HALF_WIDTH);
    let lower = Decimal::ONE - w;
    let upper = Decimal::ONE + w;

    let at_upper = impermanent_loss_between(Decimal::ONE, upper, lower, upper).abs();
    let at_lower = impermanent_loss_between(Decimal::ONE, lower, lower, upper).abs();
    at_upper.max(at_lower)
}

/// Expected full-range loss drag per year for a given volatility: `sigma^2 / 2`.
pub fn il_risk_cost(volatility: Decimal) -> Decimal {
    volatility
        .checked_mul(volatility)
        .map(|v| v / Decimal::TWO)
        .unwrap_or(Decimal::MAX)
}
