//! Realized volatility and the volatility-driven range sizing built on it.

use rust_decimal::prelude::*;

/// Returned when there are too few samples to estimate volatility.
pub const DEFAULT_VOLATILITY: Decimal = Decimal::from_parts(80, 0, 0, false, 2);

/// Minimum number of positive prices for a volatility estimate.
pub const MIN_VOLATILITY_SAMPLES: usize = 5;

/// Narrowest range half-width produced by [`dynamic_half_width`] (0.5%).
pub const MIN_RANGE_HALF_WIDTH: Decimal = Decimal::from_parts(5, 0, 0, false, 3);

/// Widest range half-width produced by [`dynamic_half_width`] (95%).
///
/// An arithmetic range `[P(1 - w), P(1 + w)]` needs `w < 1` to keep a positive lower edge.
pub const MAX_RANGE_HALF_WIDTH: Decimal = Decimal::from_parts(95, 0, 0, false, 2);

pub const DAYS_PER_YEAR: u32 = 365;

/// Annualized volatility of a daily price series.
///
/// Log returns of consecutive positive prices, population standard deviation,
/// scaled by `sqrt(365)`. Non-positive prices are dropped before pairing.
/// Fewer than [`MIN_VOLATILITY_SAMPLES`] usable prices returns
/// [`DEFAULT_VOLATILITY`]; a constant series returns exactly zero.
pub fn realized_volatility(prices: &[Decimal]) -> Decimal {
    realized_volatility_with_cadence(prices, Decimal::from(DAYS_PER_YEAR))
}

/// Same estimator as [`realized_volatility`], annualized with `sqrt(periods_per_year)`.
///
/// Use this for series sampled more or less often than once a day.
pub fn realized_volatility_with_cadence(prices: &[Decimal], periods_per_year: Decimal) -> Decimal {
    let positive: Vec<Decimal> = prices
        .iter()
        .copied()
        .filter(|p| *p > Decimal::ZERO)
        .collect();
    if positive.len() < MIN_VOLATILITY_SAMPLES {
        return DEFAULT_VOLATILITY;
    }

    let Some(annualizer) = periods_per_year
        .sqrt()
        .filter(|a| *a > Decimal::ZERO)
        .or_else(|| Decimal::from(DAYS_PER_YEAR).sqrt())
    else {
        return DEFAULT_VOLATILITY;
    };

    let returns: Vec<Decimal> = positive
        .windows(2)
        .filter_map(|w| log_return(w[0], w[1]))
        .collect();
    if returns.is_empty() {
        return DEFAULT_VOLATILITY;
    }

    let n = Decimal::from(returns.len());
    let mean = returns.iter().sum::<Decimal>() / n;
    let variance = returns
        .iter()
        .map(|r| (*r - mean) * (*r - mean))
        .sum::<Decimal>()
        / n;
    if variance.is_zero() {
        return Decimal::ZERO;
    }

    match variance.sqrt().and_then(|sd| sd.checked_mul(annualizer)) {
        Some(vol) => vol,
        None => DEFAULT_VOLATILITY,
    }
}

fn log_return(previous: Decimal, current: Decimal) -> Option<Decimal> {
    let ratio = current.checked_div(previous)?;
    if ratio == Decimal::ONE {
        return Some(Decimal::ZERO);
    }
    ratio.checked_ln()
}

/// Probability that a normally distributed move stays within `k` standard deviations.
///
/// `erf(k / sqrt(2))`; non-positive `k` returns zero.
pub fn in_range_probability(sd_multiplier: Decimal) -> Decimal {
    if sd_multiplier <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    let Some(sqrt_two) = Decimal::TWO.sqrt() else {
        return Decimal::ZERO;
    };
    (sd_multiplier / sqrt_two).erf().clamp(Decimal::ZERO, Decimal::ONE)
}

/// Range half-width covering `sd_multiplier` standard deviations over `horizon_days`.
///
/// `volatility * sqrt(horizon_days / 365) * sd_multiplier`, clamped to
/// `[MIN_RANGE_HALF_WIDTH, MAX_RANGE_HALF_WIDTH]`.
pub fn dynamic_half_width(
    volatility: Decimal,
    horizon_days: u32,
    sd_multiplier: Decimal,
) -> Decimal {
    let horizon = Decimal::from(horizon_days) / Decimal::from(DAYS_PER_YEAR);
    let raw = horizon
        .sqrt()
        .and_then(|h| volatility.max(Decimal::ZERO).checked_mul(h))
        .and_then(|w| w.checked_mul(sd_multiplier.max(Decimal::ZERO)))
        .unwrap_or(MAX_RANGE_HALF_WIDTH);
    raw.clamp(MIN_RANGE_HALF_WIDTH, MAX_RANGE_HALF_WIDTH)
}
