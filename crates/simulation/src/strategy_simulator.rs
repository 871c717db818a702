//! Strategy-aware backtest over a pool's recorded history.
//!
//! The last `days` of history are replayed sample by sample. Each usable
//! sample is marked to market, checked against the active range and, if the
//! strategy asks for it, answered with a recentered position before fees
//! for the step are accrued.

use crate::error::BacktestError;
use crate::event::{EventLog, SimulationEvent};
use crate::report::{BacktestReport, RunMetadata, TraceStep};
use crate::state::{BacktestConfig, FeeModel, RangeSpec, SimulationState};
use crate::strategies::{
    RebalanceAction, RebalanceStrategy, RecenterOnBreach, StaticRange, StrategyContext,
};
use range_scout_domain::entities::{LiquidityPosition, PoolHistory, PriceSnapshot, relative_prices};
use range_scout_domain::math::{
    MIN_VOLATILITY_SAMPLES, concentration_multiplier, dynamic_half_width,
    realized_volatility_with_cadence,
};
use range_scout_domain::metrics::{impermanent_loss_between, per_step_yield};
use range_scout_domain::value_objects::price::Price;
use range_scout_domain::value_objects::price_range::PositionRange;
use rust_decimal::Decimal;
use tracing::{debug, info, warn};

/// Runs a backtest, recentering on every breach when `config.rebalance` is set.
///
/// # Errors
/// See [`simulate_with_strategy`].
pub fn run_backtest(
    history: &PoolHistory,
    config: &BacktestConfig,
) -> Result<BacktestReport, BacktestError> {
    match config.rebalance {
        Some(_) => simulate_with_strategy(history, config, &RecenterOnBreach),
        None => simulate_with_strategy(history, config, &StaticRange),
    }
}

/// Replays `history` under `strategy`.
///
/// # Errors
/// * [`BacktestError::InvalidConfig`] when the config fails validation
/// * [`BacktestError::EmptyHistory`] for an empty history
/// * [`BacktestError::InvalidEntryPrice`] when the first simulated sample has
///   no usable relative or USD price
/// * [`BacktestError::InsufficientWarmup`] when a dynamic range has fewer than
///   [`MIN_VOLATILITY_SAMPLES`] usable warm-up prices
pub fn simulate_with_strategy<S>(
    history: &PoolHistory,
    config: &BacktestConfig,
    strategy: &S,
) -> Result<BacktestReport, BacktestError>
where
    S: RebalanceStrategy + ?Sized,
{
    config.validate()?;
    if history.is_empty() {
        return Err(BacktestError::EmptyHistory);
    }

    let cadence = history.cadence();
    let steps_per_year = cadence.samples_per_year();
    let snapshots = history.snapshots();
    let window_len = cadence.samples_for_days(config.days).min(snapshots.len());
    let window_start = snapshots.len() - window_len;
    let warmup_start = window_start.saturating_sub(cadence.samples_for_days(config.warmup_days));
    let window = &snapshots[window_start..];
    let warmup = &snapshots[warmup_start..window_start];

    let first = window.first().ok_or(BacktestError::EmptyHistory)?;
    let (entry_price, entry_quote_usd) = match (first.relative_price(), first.quote_usd_price()) {
        (Some(price), Some(quote_usd)) if quote_usd > Decimal::ZERO => (price, quote_usd),
        _ => return Err(BacktestError::InvalidEntryPrice),
    };

    let warmup_prices = relative_prices(warmup);
    if matches!(config.range, RangeSpec::Dynamic { .. })
        && warmup_prices.len() < MIN_VOLATILITY_SAMPLES
    {
        return Err(BacktestError::InsufficientWarmup {
            available: warmup_prices.len(),
            required: MIN_VOLATILITY_SAMPLES,
        });
    }
    let window_prices = relative_prices(window);
    let initial_volatility = if warmup_prices.len() >= MIN_VOLATILITY_SAMPLES {
        realized_volatility_with_cadence(&warmup_prices, steps_per_year)
    } else {
        realized_volatility_with_cadence(&window_prices, steps_per_year)
    };
    let initial_half_width = half_width_for(config.range, initial_volatility);

    let position = open_position(
        config.capital_usd,
        entry_price,
        entry_quote_usd,
        initial_half_width,
    )
    .ok_or(BacktestError::InvalidEntryPrice)?;
    let (hold_base, hold_quote) = position.amounts_at(entry_price);
    let mut state = SimulationState::new(position, config.capital_usd);

    let policy = config.rebalance_policy();
    let mut event_log = EventLog::new();
    let mut trace = Vec::with_capacity(window.len());
    let mut skipped = 0usize;
    let mut was_in_range = true;
    let mut last_seen = (first.timestamp, entry_price);

    event_log.record(SimulationEvent::position_opened(
        0,
        first.timestamp,
        entry_price,
        config.capital_usd,
        position.range,
    ));

    for (step, snapshot) in window.iter().enumerate() {
        let step_no = step as u64;
        let timestamp = snapshot.timestamp;
        let Some((price, base_usd, quote_usd)) = usable_prices(snapshot) else {
            debug!(step, timestamp, "sample has no usable price, skipping");
            skipped += 1;
            event_log.record(SimulationEvent::sample_skipped(step_no, timestamp));
            continue;
        };
        last_seen = (timestamp, price);

        let active = *state.range();
        let mut in_range = active.contains(price);
        if in_range && !was_in_range {
            event_log.record(SimulationEvent::back_in_range(step_no, timestamp, price, active));
        } else if !in_range && was_in_range {
            event_log.record(SimulationEvent::out_of_range(step_no, timestamp, price, active));
        }
        was_in_range = in_range;

        let context = StrategyContext {
            current_price: price,
            current_range: active,
        };

        if let RebalanceAction::Rebalance { reason } = strategy.evaluate(&context) {
            let marked_usd = state.position.value_at(price) * quote_usd;
            let cost_usd = marked_usd * policy.cost_rate;
            let principal_usd = marked_usd - cost_usd;

            let half_width = match config.range {
                RangeSpec::Fixed { half_width } => half_width,
                RangeSpec::Dynamic { .. } => {
                    let lookback = cadence.samples_for_days(policy.lookback_days);
                    let end = window_start + step + 1;
                    let prices = relative_prices(&snapshots[end.saturating_sub(lookback)..end]);
                    half_width_for(
                        config.range,
                        realized_volatility_with_cadence(&prices, steps_per_year),
                    )
                }
            };

            match open_position(principal_usd, price, quote_usd, half_width) {
                Some(reopened) => {
                    let old_range = *state.range();
                    state.replace(reopened, principal_usd);
                    info!(
                        step,
                        timestamp,
                        price = %price.value,
                        lower = %reopened.range.lower_price.value,
                        upper = %reopened.range.upper_price.value,
                        rebalances = state.rebalance_count,
                        "rebalanced"
                    );
                    event_log.record(SimulationEvent::rebalance(
                        step_no,
                        timestamp,
                        price,
                        old_range,
                        reopened.range,
                        reason.to_string(),
                        cost_usd,
                    ));
                    in_range = true;
                    was_in_range = true;
                }
                None => {
                    warn!(step, timestamp, "could not reopen position, keeping current range")
                }
            }
        }

        let principal_value = state.position.value_at(price) * quote_usd;
        let period_fee = if in_range {
            let step_yield = snapshot
                .apr_pct
                .map_or(Decimal::ZERO, |apr| per_step_yield(apr, steps_per_year));
            let scaled = match config.fee_model {
                FeeModel::ReportedApr => step_yield,
                FeeModel::ConcentrationScaled => {
                    step_yield * concentration_multiplier(state.range().half_width())
                }
            };
            principal_value * scaled
        } else {
            Decimal::ZERO
        };
        state.accrue(period_fee);
        if period_fee > Decimal::ZERO {
            event_log.record(SimulationEvent::fee_collection(
                step_no,
                timestamp,
                price,
                period_fee,
                state.cumulative_fees_usd,
            ));
        }

        trace.push(TraceStep {
            timestamp,
            price: price.value,
            lower: state.range().lower_price.value,
            upper: state.range().upper_price.value,
            in_range,
            period_fee,
            cumulative_fees: state.cumulative_fees_usd,
            principal_value,
            total_value: principal_value + state.cumulative_fees_usd,
            hold_value: hold_base * base_usd + hold_quote * quote_usd,
        });
    }

    let (last_timestamp, last_price) = last_seen;
    let final_range = *state.range();
    let final_value = trace
        .last()
        .map_or(config.capital_usd, |s: &TraceStep| s.total_value);
    event_log.record(SimulationEvent::position_closed(
        window.len() as u64,
        last_timestamp,
        last_price,
        final_value,
        state.cumulative_fees_usd,
        impermanent_loss_between(
            final_range.center_price.value,
            last_price.value,
            final_range.lower_price.value,
            final_range.upper_price.value,
        ),
    ));

    let realized_volatility = realized_volatility_with_cadence(&window_prices, steps_per_year);
    info!(
        strategy = strategy.name(),
        steps = trace.len(),
        skipped,
        rebalances = state.rebalance_count,
        final_value = %final_value,
        "backtest complete"
    );

    Ok(BacktestReport {
        capital_usd: config.capital_usd,
        days: config.days,
        trace,
        final_range,
        metadata: RunMetadata {
            initial_volatility,
            realized_volatility,
            rebalance_count: state.rebalance_count,
            initial_half_width,
            steps_per_year,
            skipped_samples: skipped,
            strategy: strategy.name().to_string(),
        },
        events: event_log,
    })
}

fn half_width_for(range: RangeSpec, volatility: Decimal) -> Decimal {
    match range {
        RangeSpec::Fixed { half_width } => half_width,
        RangeSpec::Dynamic {
            sd_multiplier,
            horizon_days,
        } => dynamic_half_width(volatility, horizon_days, sd_multiplier),
    }
}

/// Relative price, base USD price and quote USD price of a sample, all positive.
fn usable_prices(snapshot: &PriceSnapshot) -> Option<(Price, Decimal, Decimal)> {
    let price = snapshot.relative_price()?;
    let base_usd = snapshot.usd_price()?;
    let quote_usd = snapshot.quote_usd_price().filter(|q| *q > Decimal::ZERO)?;
    Some((price, base_usd, quote_usd))
}

/// Opens `capital_usd` worth of liquidity centered on `price`.
fn open_position(
    capital_usd: Decimal,
    price: Price,
    quote_usd: Decimal,
    half_width: Decimal,
) -> Option<LiquidityPosition> {
    let range = PositionRange::centered(price, half_width)?;
    let capital_quote = capital_usd.checked_div(quote_usd)?;
    LiquidityPosition::open(capital_quote, price, range)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::SimulationEventType;
    use crate::state::RebalancePolicy;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rand_distr::{Distribution, Normal};
    use rust_decimal::prelude::FromPrimitive;
    use rust_decimal_macros::dec;

    const EIGHT_HOURS: u64 = 8 * 3600;
    const START: u64 = 1_700_000_000;

    /// 8-hourly samples of a pool quoted in a USD stablecoin, 10% APR each.
    fn history(prices: &[Decimal]) -> PoolHistory {
        PoolHistory::from_chronological(
            prices
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    PriceSnapshot::new(START + i as u64 * EIGHT_HOURS, Some(*p), Some(*p))
                        .with_apr(dec!(10))
                })
                .collect(),
        )
    }

    fn random_walk(seed: u64, steps: usize, sigma: f64) -> Vec<Decimal> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, sigma).unwrap();
        let mut price = 1.0_f64;
        (0..steps)
            .map(|_| {
                price *= normal.sample(&mut rng).exp();
                Decimal::from_f64(price).unwrap().round_dp(10)
            })
            .collect()
    }

    fn assert_close(a: Decimal, b: Decimal, tol: Decimal) {
        assert!((a - b).abs() <= tol, "{a} != {b} (tol {tol})");
    }

    #[test]
    fn test_fixed_range_scenario_without_rebalance() {
        let prices = [
            dec!(1.00),
            dec!(1.02),
            dec!(0.98),
            dec!(1.01),
            dec!(0.99),
            dec!(1.03),
            dec!(0.97),
            dec!(1.02),
            dec!(0.98),
            dec!(1.00),
        ];
        let config = BacktestConfig::new(dec!(10000), 4).with_fixed_range(dec!(0.05));
        let report = run_backtest(&history(&prices), &config).unwrap();

        assert_eq!(report.trace.len(), 10);
        assert!(report.trace.iter().all(|s| s.in_range));
        for pair in report.trace.windows(2) {
            assert!(pair[1].cumulative_fees > pair[0].cumulative_fees);
        }
        assert_eq!(report.metadata.rebalance_count, 0);
        assert_eq!(report.metadata.steps_per_year, dec!(1095));
        assert_eq!(report.metadata.initial_half_width, dec!(0.05));
        assert_eq!(report.final_range.lower_price.value, dec!(0.95));
        assert_eq!(report.final_range.upper_price.value, dec!(1.05));
        assert_close(report.trace[0].principal_value, dec!(10000), dec!(0.0001));
        assert_eq!(report.time_in_range(), Decimal::ONE);
        assert_eq!(report.events.rebalance_count(), 0);
    }

    #[test]
    fn test_out_of_range_persists_without_rebalance() {
        let prices = [dec!(1), dec!(1.1), dec!(1.2), dec!(1.04), dec!(0.9), dec!(1)];
        let config = BacktestConfig::new(dec!(1000), 2).with_fixed_range(dec!(0.05));
        let report = run_backtest(&history(&prices), &config).unwrap();

        let flags: Vec<bool> = report.trace.iter().map(|s| s.in_range).collect();
        assert_eq!(flags, vec![true, false, false, true, false, true]);
        for step in report.trace.iter().filter(|s| !s.in_range) {
            assert_eq!(step.period_fee, Decimal::ZERO);
        }
        // above the range the position is all quote and stops moving with price
        assert_eq!(report.trace[1].principal_value, report.trace[2].principal_value);
        assert_eq!(report.events.count_by_type(SimulationEventType::OutOfRange), 2);
        assert_eq!(report.events.count_by_type(SimulationEventType::BackInRange), 2);
    }

    #[test]
    fn test_rebalance_counts_each_breach() {
        let prices = [
            dec!(1),
            dec!(1),
            dec!(1.1),
            dec!(1.1),
            dec!(1.21),
            dec!(1.2),
            dec!(1.19),
        ];
        let config = BacktestConfig::new(dec!(1000), 3)
            .with_fixed_range(dec!(0.05))
            .with_rebalance(RebalancePolicy::default());
        let report = run_backtest(&history(&prices), &config).unwrap();

        assert_eq!(report.metadata.rebalance_count, 2);
        assert_eq!(report.metadata.strategy, "Recenter On Breach");
        assert!(report.trace.iter().all(|s| s.in_range));
        assert_eq!(report.trace[2].lower, dec!(1.045));
        assert_eq!(report.final_range.center_price.value, dec!(1.21));
        assert_eq!(report.events.rebalance_count(), 2);

        // the breach step carries the rebalance cost
        let before = report.trace[1].principal_value;
        let after = report.trace[2].principal_value;
        assert!(after < before * dec!(1.1));
    }

    #[test]
    fn test_hold_benchmark_survives_rebalance() {
        let prices = [dec!(1), dec!(1.08), dec!(1.2), dec!(0.9), dec!(1.05)];
        let static_run = run_backtest(
            &history(&prices),
            &BacktestConfig::new(dec!(1000), 2).with_fixed_range(dec!(0.05)),
        )
        .unwrap();
        let rebalanced = run_backtest(
            &history(&prices),
            &BacktestConfig::new(dec!(1000), 2)
                .with_fixed_range(dec!(0.05))
                .with_rebalance(RebalancePolicy::default()),
        )
        .unwrap();

        assert!(rebalanced.metadata.rebalance_count > 0);
        let static_hold: Vec<Decimal> = static_run.trace.iter().map(|s| s.hold_value).collect();
        let rebalanced_hold: Vec<Decimal> = rebalanced.trace.iter().map(|s| s.hold_value).collect();
        assert_eq!(static_hold, rebalanced_hold);
    }

    #[test]
    fn test_cumulative_fees_never_decrease() {
        let prices = random_walk(42, 180, 0.03);
        let config = BacktestConfig::new(dec!(5000), 30)
            .with_warmup_days(20)
            .with_rebalance(RebalancePolicy::default());
        let report = run_backtest(&history(&prices), &config).unwrap();

        assert_eq!(report.trace.len(), 90);
        for pair in report.trace.windows(2) {
            assert!(pair[1].cumulative_fees >= pair[0].cumulative_fees);
        }
        for step in &report.trace {
            assert_eq!(step.total_value, step.principal_value + step.cumulative_fees);
        }
        assert!(report.metadata.initial_volatility > Decimal::ZERO);
        assert!(report.metadata.initial_half_width >= dec!(0.005));
    }

    #[test]
    fn test_skipped_samples_are_counted() {
        let mut snaps: Vec<PriceSnapshot> = [dec!(1), dec!(1.01), dec!(0.99), dec!(1)]
            .iter()
            .enumerate()
            .map(|(i, p)| PriceSnapshot::new(START + i as u64 * EIGHT_HOURS, Some(*p), Some(*p)))
            .collect();
        snaps[2].native_price = Some(Decimal::ZERO);
        snaps[2].base_usd_price = None;
        let config = BacktestConfig::new(dec!(1000), 2).with_fixed_range(dec!(0.05));
        let report = run_backtest(&PoolHistory::from_chronological(snaps), &config).unwrap();

        assert_eq!(report.trace.len(), 3);
        assert_eq!(report.metadata.skipped_samples, 1);
        assert_eq!(report.events.count_by_type(SimulationEventType::SampleSkipped), 1);
        // no APR reported, no fees
        assert_eq!(report.total_fees(), Decimal::ZERO);
    }

    #[test]
    fn test_capital_is_converted_to_quote_numeraire() {
        // base priced in a quote token worth 2000 USD
        let snaps: Vec<PriceSnapshot> = [dec!(0.5), dec!(0.51), dec!(0.49)]
            .iter()
            .enumerate()
            .map(|(i, p)| {
                PriceSnapshot::new(START + i as u64 * EIGHT_HOURS, Some(*p), Some(*p * dec!(2000)))
            })
            .collect();
        let config = BacktestConfig::new(dec!(10000), 1).with_fixed_range(dec!(0.1));
        let report = run_backtest(&PoolHistory::from_chronological(snaps), &config).unwrap();
        assert_close(report.trace[0].principal_value, dec!(10000), dec!(0.0001));
        assert_close(report.trace[0].hold_value, dec!(10000), dec!(0.0001));
    }

    #[test]
    fn test_concentration_scaling_earns_more() {
        let prices = [dec!(1), dec!(1.01), dec!(1), dec!(0.99), dec!(1)];
        let base = BacktestConfig::new(dec!(1000), 2).with_fixed_range(dec!(0.05));
        let plain = run_backtest(&history(&prices), &base).unwrap();
        let scaled = run_backtest(
            &history(&prices),
            &base.clone().with_fee_model(FeeModel::ConcentrationScaled),
        )
        .unwrap();
        assert!(scaled.total_fees() > plain.total_fees() * dec!(10));
    }

    #[test]
    fn test_error_cases() {
        let config = BacktestConfig::new(dec!(1000), 2).with_fixed_range(dec!(0.05));
        assert_eq!(
            run_backtest(&PoolHistory::default(), &config).unwrap_err(),
            BacktestError::EmptyHistory
        );

        let zero_entry = PoolHistory::from_chronological(vec![
            PriceSnapshot::new(START, Some(Decimal::ZERO), None),
            PriceSnapshot::new(START + EIGHT_HOURS, Some(dec!(1)), Some(dec!(1))),
        ]);
        assert_eq!(
            run_backtest(&zero_entry, &config).unwrap_err(),
            BacktestError::InvalidEntryPrice
        );

        let short = history(&[dec!(1), dec!(1.01), dec!(0.99), dec!(1)]);
        let dynamic = BacktestConfig::new(dec!(1000), 2);
        assert_eq!(
            run_backtest(&short, &dynamic).unwrap_err(),
            BacktestError::InsufficientWarmup {
                available: 0,
                required: MIN_VOLATILITY_SAMPLES
            }
        );

        assert!(matches!(
            run_backtest(&short, &BacktestConfig::new(Decimal::ZERO, 2)),
            Err(BacktestError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_dynamic_range_sized_from_warmup() {
        let prices = random_walk(7, 120, 0.02);
        let config = BacktestConfig::new(dec!(1000), 10).with_warmup_days(30);
        let report = run_backtest(&history(&prices), &config).unwrap();

        let warmup = &prices[0..90];
        let expected_vol = realized_volatility_with_cadence(warmup, dec!(1095));
        assert_eq!(report.metadata.initial_volatility, expected_vol);
        assert_eq!(
            report.metadata.initial_half_width,
            dynamic_half_width(expected_vol, 7, Decimal::TWO)
        );
        assert_eq!(report.trace.len(), 30);
    }

    #[test]
    fn test_dynamic_rebalance_resizes_from_lookback_at_breach() {
        let prices = random_walk(11, 180, 0.05);
        let policy = RebalancePolicy {
            lookback_days: 5,
            ..RebalancePolicy::default()
        };
        let config = BacktestConfig::new(dec!(1000), 30)
            .with_range(RangeSpec::Dynamic {
                sd_multiplier: Decimal::ONE,
                horizon_days: 1,
            })
            .with_rebalance(policy);
        let report = run_backtest(&history(&prices), &config).unwrap();
        assert!(report.metadata.rebalance_count > 0);

        let first_lower = report.trace[0].lower;
        let breach = report
            .trace
            .iter()
            .position(|s| s.lower != first_lower)
            .unwrap();

        // 90 warm-up samples precede the window; 5 days at 8h is 15 samples
        let end = 90 + breach + 1;
        let vol = realized_volatility_with_cadence(&prices[end - 15..end], dec!(1095));
        let expected_width = dynamic_half_width(vol, 1, Decimal::ONE);
        let expected =
            PositionRange::centered(Price::new(report.trace[breach].price), expected_width)
                .unwrap();

        assert_eq!(report.trace[breach].lower, expected.lower_price.value);
        assert_eq!(report.trace[breach].upper, expected.upper_price.value);
        assert_ne!(expected_width, report.metadata.initial_half_width);
    }
}
