use thiserror::Error;

/// Reasons a backtest cannot start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BacktestError {
    #[error("pool history is empty")]
    EmptyHistory,
    #[error("first sample of the simulated window has no usable price")]
    InvalidEntryPrice,
    #[error("warm-up window has {available} usable prices, {required} required")]
    InsufficientWarmup { available: usize, required: usize },
    #[error("invalid backtest configuration: {0}")]
    InvalidConfig(String),
}
