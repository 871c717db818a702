//! Stateless AMM math: liquidity sizing, token decomposition and volatility.

pub mod concentrated_liquidity;
pub mod volatility;

pub use concentrated_liquidity::{
    MAX_CONCENTRATION, concentration_multiplier, liquidity_for_capital, token_amounts,
};
pub use volatility::{
    DEFAULT_VOLATILITY, MAX_RANGE_HALF_WIDTH, MIN_RANGE_HALF_WIDTH, MIN_VOLATILITY_SAMPLES,
    dynamic_half_width, in_range_probability, realized_volatility,
    realized_volatility_with_cadence,
};
