//! Backtest configuration and the mutable state of one run.

use crate::error::BacktestError;
use range_scout_domain::entities::LiquidityPosition;
use range_scout_domain::value_objects::price_range::PositionRange;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Cost of one rebalance as a fraction of the marked position value (0.3%).
pub const DEFAULT_REBALANCE_COST: Decimal = Decimal::from_parts(3, 0, 0, false, 3);

/// How the position range is sized at open and on every rebalance.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RangeSpec {
    /// Constant half-width, e.g. 0.05 for `[P * 0.95, P * 1.05]`.
    Fixed { half_width: Decimal },
    /// `sd_multiplier` standard deviations of the move expected over `horizon_days`.
    Dynamic {
        sd_multiplier: Decimal,
        horizon_days: u32,
    },
}

/// Recenter the range whenever price leaves it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RebalancePolicy {
    /// Volatility lookback for a dynamic range, ending at the breach step.
    pub lookback_days: u32,
    /// Fraction of the marked value lost per rebalance.
    pub cost_rate: Decimal,
}

impl Default for RebalancePolicy {
    fn default() -> Self {
        Self {
            lookback_days: 30,
            cost_rate: DEFAULT_REBALANCE_COST,
        }
    }
}

/// How per-step fees are derived from the reported APR.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeModel {
    /// Reported APR applied to the marked position value.
    #[default]
    ReportedApr,
    /// Reported APR scaled by the concentration multiplier of the active range.
    ConcentrationScaled,
}

/// Configuration for a backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    /// Capital committed at open, in USD.
    pub capital_usd: Decimal,
    /// Days of history to replay, counted back from the newest sample.
    pub days: u32,
    pub range: RangeSpec,
    /// Days before the simulated window used for the initial volatility.
    pub warmup_days: u32,
    pub rebalance: Option<RebalancePolicy>,
    pub fee_model: FeeModel,
}

impl BacktestConfig {
    /// Creates a config with a 2-sd, 7-day dynamic range, a 30-day warm-up and no rebalancing.
    #[must_use]
    pub fn new(capital_usd: Decimal, days: u32) -> Self {
        Self {
            capital_usd,
            days,
            range: RangeSpec::Dynamic {
                sd_multiplier: Decimal::TWO,
                horizon_days: 7,
            },
            warmup_days: 30,
            rebalance: None,
            fee_model: FeeModel::ReportedApr,
        }
    }

    #[must_use]
    pub fn with_range(mut self, range: RangeSpec) -> Self {
        self.range = range;
        self
    }

    #[must_use]
    pub fn with_fixed_range(self, half_width: Decimal) -> Self {
        self.with_range(RangeSpec::Fixed { half_width })
    }

    #[must_use]
    pub fn with_warmup_days(mut self, days: u32) -> Self {
        self.warmup_days = days;
        self
    }

    #[must_use]
    pub fn with_rebalance(mut self, policy: RebalancePolicy) -> Self {
        self.rebalance = Some(policy);
        self
    }

    #[must_use]
    pub fn with_fee_model(mut self, fee_model: FeeModel) -> Self {
        self.fee_model = fee_model;
        self
    }

    /// The configured policy, or the default one for strategies that rebalance regardless.
    pub fn rebalance_policy(&self) -> RebalancePolicy {
        self.rebalance.unwrap_or_default()
    }

    /// # Errors
    /// Returns [`BacktestError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), BacktestError> {
        if self.capital_usd <= Decimal::ZERO {
            return Err(BacktestError::InvalidConfig("capital must be positive".into()));
        }
        if self.days == 0 {
            return Err(BacktestError::InvalidConfig("days must be positive".into()));
        }
        match self.range {
            RangeSpec::Fixed { half_width } => {
                if half_width <= Decimal::ZERO || half_width >= Decimal::ONE {
                    return Err(BacktestError::InvalidConfig(
                        "fixed half-width must be in (0, 1)".into(),
                    ));
                }
            }
            RangeSpec::Dynamic {
                sd_multiplier,
                horizon_days,
            } => {
                if sd_multiplier <= Decimal::ZERO || horizon_days == 0 {
                    return Err(BacktestError::InvalidConfig(
                        "dynamic range needs a positive multiplier and horizon".into(),
                    ));
                }
            }
        }
        if let Some(policy) = self.rebalance {
            if policy.lookback_days == 0 {
                return Err(BacktestError::InvalidConfig(
                    "rebalance lookback must be positive".into(),
                ));
            }
            if policy.cost_rate < Decimal::ZERO || policy.cost_rate >= Decimal::ONE {
                return Err(BacktestError::InvalidConfig(
                    "rebalance cost must be in [0, 1)".into(),
                ));
            }
        }
        Ok(())
    }
}

/// Mutable state owned by one backtest run.
///
/// The range and position are replaced together on every rebalance.
#[derive(Debug, Clone)]
pub struct SimulationState {
    pub position: LiquidityPosition,
    /// Principal in USD carried into the current position.
    pub principal_usd: Decimal,
    pub cumulative_fees_usd: Decimal,
    pub rebalance_count: u32,
}

impl SimulationState {
    #[must_use]
    pub fn new(position: LiquidityPosition, principal_usd: Decimal) -> Self {
        Self {
            position,
            principal_usd,
            cumulative_fees_usd: Decimal::ZERO,
            rebalance_count: 0,
        }
    }

    pub fn range(&self) -> &PositionRange {
        &self.position.range
    }

    /// Fees only ever accumulate; negative amounts are ignored.
    pub fn accrue(&mut self, fee_usd: Decimal) {
        if fee_usd > Decimal::ZERO {
            self.cumulative_fees_usd += fee_usd;
        }
    }

    /// Swaps in a freshly opened position after a rebalance.
    pub fn replace(&mut self, position: LiquidityPosition, principal_usd: Decimal) {
        self.position = position;
        self.principal_usd = principal_usd;
        self.rebalance_count += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use range_scout_domain::value_objects::price::Price;
    use rust_decimal_macros::dec;

    #[test]
    fn test_default_config_is_valid() {
        let config = BacktestConfig::new(dec!(10000), 30);
        assert!(config.validate().is_ok());
        assert!(config.rebalance.is_none());
        assert_eq!(config.rebalance_policy().cost_rate, dec!(0.003));
        let custom = config.with_rebalance(RebalancePolicy {
            lookback_days: 14,
            cost_rate: dec!(0.01),
        });
        assert_eq!(custom.rebalance_policy().lookback_days, 14);
    }

    #[test]
    fn test_invalid_configs() {
        let bad = [
            BacktestConfig::new(Decimal::ZERO, 30),
            BacktestConfig::new(dec!(1000), 0),
            BacktestConfig::new(dec!(1000), 30).with_fixed_range(dec!(1)),
            BacktestConfig::new(dec!(1000), 30).with_range(RangeSpec::Dynamic {
                sd_multiplier: dec!(2),
                horizon_days: 0,
            }),
            BacktestConfig::new(dec!(1000), 30).with_rebalance(RebalancePolicy {
                lookback_days: 30,
                cost_rate: dec!(1.5),
            }),
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(BacktestError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_state_fees_never_decrease() {
        let range = PositionRange::centered(Price::new(dec!(100)), dec!(0.1)).unwrap();
        let position = LiquidityPosition::open(dec!(1000), Price::new(dec!(100)), range).unwrap();
        let mut state = SimulationState::new(position, dec!(1000));
        state.accrue(dec!(2));
        state.accrue(dec!(-5));
        assert_eq!(state.cumulative_fees_usd, dec!(2));

        state.replace(position, dec!(990));
        assert_eq!(state.rebalance_count, 1);
        assert_eq!(state.cumulative_fees_usd, dec!(2));
    }
}
