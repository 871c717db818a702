//! Pool scanner: filters a pool listing, scores each candidate's fee yield
//! against its range-exit loss and ranks the results.

pub mod config;
pub mod error;
pub mod filter;
pub mod metrics;
pub mod objective;
pub mod provider;
pub mod result;
pub mod scanner;

pub mod prelude {
    pub use crate::config::{ChainFilter, ScannerConfig, VerdictThresholds};
    pub use crate::error::ScanError;
    pub use crate::metrics::{PoolMetrics, compute_pool_metrics};
    pub use crate::objective::{RankBy, RankingObjective, rank};
    pub use crate::provider::HistoryProvider;
    pub use crate::result::{ScanResult, Verdict};
    pub use crate::scanner::PoolScanner;
}
