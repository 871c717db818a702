pub mod pool;
pub mod position;
pub mod snapshot;

pub use pool::PoolCandidate;
pub use position::LiquidityPosition;
pub use snapshot::{PoolHistory, PriceSnapshot, relative_prices};
