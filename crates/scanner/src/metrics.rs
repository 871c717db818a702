//! Per-pool risk/reward metrics.

use crate::config::MIN_LOOKBACK_DAYS;
use range_scout_domain::entities::{PoolHistory, relative_prices};
use range_scout_domain::math::{
    dynamic_half_width, in_range_probability, realized_volatility_with_cadence,
};
use range_scout_domain::metrics::{il_risk_cost, impermanent_loss_at_range_limit};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Floor of the exit loss when computing the yield/loss ratio.
const RATIO_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 9);

/// Risk/reward figures for one pool over one holding horizon. All fractions are decimals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolMetrics {
    /// Mean reported APR over the horizon window.
    pub average_apr: Decimal,
    /// Annualized realized volatility of the relative price.
    pub volatility: Decimal,
    pub range_half_width: Decimal,
    pub in_range_probability: Decimal,
    /// Fee yield over the horizon, discounted by the in-range probability.
    pub probable_yield: Decimal,
    /// Loss versus holding when price reaches a range edge.
    pub exit_loss: Decimal,
    pub margin: Decimal,
    pub ratio: Decimal,
    /// Full-range loss drag per year, `sigma^2 / 2`.
    pub il_risk_cost: Decimal,
    /// Number of samples the history held.
    pub samples: usize,
}

/// Computes [`PoolMetrics`] over a chronological history.
///
/// Returns `None` when the history cannot support an estimate: no APR reading
/// inside the horizon window or no usable price in the lookback window.
pub fn compute_pool_metrics(
    history: &PoolHistory,
    days_window: u32,
    sd_multiplier: Decimal,
) -> Option<PoolMetrics> {
    if history.is_empty() || days_window == 0 || sd_multiplier <= Decimal::ZERO {
        return None;
    }
    let cadence = history.cadence();

    let recent = history.tail(cadence.samples_for_days(days_window));
    let aprs: Vec<Decimal> = recent.iter().filter_map(|s| s.apr_pct).collect();
    if aprs.is_empty() {
        return None;
    }
    let average_apr =
        aprs.iter().sum::<Decimal>() / Decimal::from(aprs.len()) / Decimal::ONE_HUNDRED;

    let lookback = history.tail(cadence.samples_for_days(days_window.max(MIN_LOOKBACK_DAYS)));
    let prices = relative_prices(lookback);
    if prices.is_empty() {
        return None;
    }

    let volatility = realized_volatility_with_cadence(&prices, cadence.samples_per_year());
    let range_half_width = dynamic_half_width(volatility, days_window, sd_multiplier);
    let probability = in_range_probability(sd_multiplier);

    let horizon = Decimal::from(days_window) / Decimal::from(365);
    let probable_yield = average_apr * horizon * probability;
    let exit_loss = impermanent_loss_at_range_limit(range_half_width);
    let margin = probable_yield - exit_loss;
    let ratio = probable_yield / exit_loss.max(RATIO_EPSILON);

    Some(PoolMetrics {
        average_apr,
        volatility,
        range_half_width,
        in_range_probability: probability,
        probable_yield,
        exit_loss,
        margin,
        ratio,
        il_risk_cost: il_risk_cost(volatility),
        samples: history.len(),
    })
}
