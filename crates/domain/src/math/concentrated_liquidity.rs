//! Square-root-price mechanics of a single concentrated liquidity position.
//!
//! Prices are quoted as units of the quote token per one base token, so a
//! position below its range holds only the base token and a position above
//! its range holds only the quote token.

use rust_decimal::{Decimal, MathematicalOps};

/// Upper bound of [`concentration_multiplier`], reached as the width goes to zero.
pub const MAX_CONCENTRATION: Decimal = Decimal::ONE_HUNDRED;

/// Square roots of a valid `[lower, upper]` range.
#[derive(Debug, Clone, Copy)]
struct SqrtBounds {
    lower: Decimal,
    upper: Decimal,
}

impl SqrtBounds {
    fn new(price_lower: Decimal, price_upper: Decimal) -> Option<Self> {
        if price_lower <= Decimal::ZERO || price_lower >= price_upper {
            return None;
        }
        Some(Self {
            lower: price_lower.sqrt()?,
            upper: price_upper.sqrt()?,
        })
    }
}

/// Liquidity obtainable with `capital` for a position opened at `price_now`.
///
/// The unit cost of one unit of liquidity is
/// `(1/sqrt(P) - 1/sqrt(Pb)) * P + (sqrt(P) - sqrt(Pa))`, expressed in the
/// quote numeraire of the price. Returns zero unless
/// `price_lower < price_now < price_upper`: a new position must open in range.
pub fn liquidity_for_capital(
    capital: Decimal,
    price_now: Decimal,
    price_lower: Decimal,
    price_upper: Decimal,
) -> Decimal {
    liquidity_checked(capital, price_now, price_lower, price_upper).unwrap_or(Decimal::ZERO)
}

fn liquidity_checked(
    capital: Decimal,
    price_now: Decimal,
    price_lower: Decimal,
    price_upper: Decimal,
) -> Option<Decimal> {
    if capital <= Decimal::ZERO || price_now <= price_lower || price_now >= price_upper {
        return None;
    }
    let bounds = SqrtBounds::new(price_lower, price_upper)?;
    let sqrt_p = price_now.sqrt()?;

    let unit_base = Decimal::ONE.checked_div(sqrt_p)? - Decimal::ONE.checked_div(bounds.upper)?;
    let unit_quote = sqrt_p - bounds.lower;
    let unit_cost = unit_base.checked_mul(price_now)?.checked_add(unit_quote)?;
    if unit_cost <= Decimal::ZERO {
        return None;
    }
    capital.checked_div(unit_cost)
}

/// Token holdings `(amount_base, amount_quote)` of `liquidity` at `price_now`.
///
/// * at or below the range: `L * (sqrt(Pb) - sqrt(Pa)) / (sqrt(Pa) * sqrt(Pb))` base, no quote
/// * at or above the range: no base, `L * (sqrt(Pb) - sqrt(Pa))` quote
/// * inside: `L * (sqrt(Pb) - sqrt(P)) / (sqrt(P) * sqrt(Pb))` base,
///   `L * (sqrt(P) - sqrt(Pa))` quote
///
/// Non-positive liquidity or price, or an inverted range, yields `(0, 0)`.
pub fn token_amounts(
    liquidity: Decimal,
    price_now: Decimal,
    price_lower: Decimal,
    price_upper: Decimal,
) -> (Decimal, Decimal) {
    amounts_checked(liquidity, price_now, price_lower, price_upper)
        .unwrap_or((Decimal::ZERO, Decimal::ZERO))
}

fn amounts_checked(
    liquidity: Decimal,
    price_now: Decimal,
    price_lower: Decimal,
    price_upper: Decimal,
) -> Option<(Decimal, Decimal)> {
    if liquidity <= Decimal::ZERO || price_now <= Decimal::ZERO {
        return None;
    }
    let SqrtBounds { lower, upper } = SqrtBounds::new(price_lower, price_upper)?;
    let sqrt_p = price_now.sqrt()?;

    if sqrt_p <= lower {
        let base = liquidity
            .checked_mul(upper - lower)?
            .checked_div(lower.checked_mul(upper)?)?;
        Some((base, Decimal::ZERO))
    } else if sqrt_p >= upper {
        let quote = liquidity.checked_mul(upper - lower)?;
        Some((Decimal::ZERO, quote))
    } else {
        let base = liquidity
            .checked_mul(upper - sqrt_p)?
            .checked_div(sqrt_p.checked_mul(upper)?)?;
        let quote = liquidity.checked_mul(sqrt_p - lower)?;
        Some((base, quote))
    }
}

/// Fee efficiency of a range of half-width `w` relative to a full-range position.
///
/// `1 / (1 - sqrt((1 - w) / (1 + w)))`, capped at [`MAX_CONCENTRATION`].
/// Non-positive widths return the cap; widths of 100% or more return 1.
pub fn concentration_multiplier(range_half_width: Decimal) -> Decimal {
    if range_half_width <= Decimal::ZERO {
        return MAX_CONCENTRATION;
    }
    if range_half_width >= Decimal::ONE {
        return Decimal::ONE;
    }
    let ratio = (Decimal::ONE - range_half_width) / (Decimal::ONE + range_half_width);
    let Some(sqrt_ratio) = ratio.sqrt() else {
        return Decimal::ONE;
    };
    let denominator = Decimal::ONE - sqrt_ratio;
    if denominator <= Decimal::ZERO {
        return MAX_CONCENTRATION;
    }
    match Decimal::ONE.checked_div(denominator) {
        Some(multiplier) => multiplier.clamp(Decimal::ONE, MAX_CONCENTRATION),
        None => MAX_CONCENTRATION,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn assert_close(a: Decimal, b: Decimal, tol: Decimal) {
        assert!((a - b).abs() <= tol, "{a} != {b} (tol {tol})");
    }

    #[test]
    fn test_token_amounts_inside_range() {
        // P = 4, range [1, 16], L = 100: sqrt 2, 1, 4
        // base = 100 * (4 - 2) / (2 * 4) = 25
        // quote = 100 * (2 - 1) = 100
        let (base, quote) = token_amounts(dec!(100), dec!(4), dec!(1), dec!(16));
        assert_eq!(base, dec!(25));
        assert_eq!(quote, dec!(100));
    }

    #[test]
    fn test_token_amounts_outside_range() {
        let (base, quote) = token_amounts(dec!(100), dec!(0.5), dec!(1), dec!(16));
        // below: 100 * (4 - 1) / (1 * 4) = 75
        assert_eq!(base, dec!(75));
        assert_eq!(quote, Decimal::ZERO);

        let (base, quote) = token_amounts(dec!(100), dec!(25), dec!(1), dec!(16));
        assert_eq!(base, Decimal::ZERO);
        assert_eq!(quote, dec!(300));
    }

    #[test]
    fn test_token_amounts_lower_edge_continuity() {
        let liquidity = dec!(1234.5);
        let (lower, upper) = (dec!(0.95), dec!(1.05));
        let (base, quote) = token_amounts(liquidity, lower, lower, upper);
        let sa = lower.sqrt().unwrap();
        let sb = upper.sqrt().unwrap();
        assert_eq!(quote, Decimal::ZERO);
        assert_eq!(base, liquidity * (sb - sa) / (sa * sb));
    }

    #[test]
    fn test_token_amounts_non_negative_and_continuous_inside() {
        let liquidity = dec!(1000);
        let (lower, upper) = (dec!(90), dec!(110));
        let mut previous: Option<(Decimal, Decimal)> = None;
        let mut price = dec!(90.01);
        while price < upper {
            let (base, quote) = token_amounts(liquidity, price, lower, upper);
            assert!(base >= Decimal::ZERO && quote >= Decimal::ZERO);
            if let Some((prev_base, prev_quote)) = previous {
                // base falls and quote rises as price climbs, in small increments
                assert!(base <= prev_base && quote >= prev_quote);
                assert!(prev_base - base < dec!(0.5));
                assert!(quote - prev_quote < dec!(15));
            }
            previous = Some((base, quote));
            price += dec!(0.25);
        }
        let (edge_base, edge_quote) = token_amounts(liquidity, upper, lower, upper);
        let (near_base, near_quote) = previous.unwrap();
        assert_eq!(edge_base, Decimal::ZERO);
        assert!(near_base < dec!(0.5));
        assert!(edge_quote - near_quote < dec!(15));
    }

    #[test]
    fn test_token_amounts_malformed_input() {
        let zero = (Decimal::ZERO, Decimal::ZERO);
        assert_eq!(token_amounts(dec!(100), dec!(-1), dec!(1), dec!(2)), zero);
        assert_eq!(token_amounts(dec!(100), dec!(1.5), dec!(2), dec!(1)), zero);
        assert_eq!(token_amounts(Decimal::ZERO, dec!(1.5), dec!(1), dec!(2)), zero);
    }

    #[test]
    fn test_liquidity_round_trip_recovers_capital() {
        let capital = dec!(10000);
        for (price, lower, upper) in [
            (dec!(1), dec!(0.95), dec!(1.05)),
            (dec!(3150.25), dec!(2800), dec!(3600)),
            (dec!(0.00042), dec!(0.0003), dec!(0.0006)),
        ] {
            let liquidity = liquidity_for_capital(capital, price, lower, upper);
            assert!(liquidity > Decimal::ZERO);
            let (base, quote) = token_amounts(liquidity, price, lower, upper);
            assert_close(base * price + quote, capital, dec!(0.000001));
        }
    }

    #[test]
    fn test_liquidity_fails_closed_at_boundary() {
        assert_eq!(
            liquidity_for_capital(dec!(1000), dec!(0.95), dec!(0.95), dec!(1.05)),
            Decimal::ZERO
        );
        assert_eq!(
            liquidity_for_capital(dec!(1000), dec!(1.05), dec!(0.95), dec!(1.05)),
            Decimal::ZERO
        );
        assert_eq!(
            liquidity_for_capital(dec!(1000), dec!(1), dec!(1.05), dec!(0.95)),
            Decimal::ZERO
        );
        assert_eq!(
            liquidity_for_capital(dec!(-5), dec!(1), dec!(0.95), dec!(1.05)),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_concentration_multiplier_monotonic() {
        let widths = [
            dec!(0.001),
            dec!(0.01),
            dec!(0.05),
            dec!(0.1),
            dec!(0.25),
            dec!(0.5),
            dec!(0.9),
            dec!(0.999),
        ];
        let multipliers: Vec<Decimal> =
            widths.iter().map(|w| concentration_multiplier(*w)).collect();
        for pair in multipliers.windows(2) {
            assert!(pair[1] <= pair[0]);
        }
        assert_eq!(multipliers[0], MAX_CONCENTRATION);
        assert!(multipliers[7] < dec!(1.1));
        assert_eq!(concentration_multiplier(Decimal::ONE), Decimal::ONE);
        assert_eq!(concentration_multiplier(Decimal::ZERO), MAX_CONCENTRATION);
    }

    #[test]
    fn test_concentration_multiplier_value() {
        // w = 0.1: ratio = 0.9 / 1.1, sqrt ~ 0.904534, multiplier ~ 10.47494
        let m = concentration_multiplier(dec!(0.1));
        assert_close(m, dec!(10.47494), dec!(0.0001));
    }
}
