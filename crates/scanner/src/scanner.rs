use crate::config::ScannerConfig;
use crate::error::ScanError;
use crate::filter;
use crate::metrics::compute_pool_metrics;
use crate::objective::rank;
use crate::provider::HistoryProvider;
use crate::result::ScanResult;
use range_scout_domain::entities::{PoolCandidate, PoolHistory};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Filters, scores and ranks pools under one [`ScannerConfig`].
#[derive(Debug, Clone)]
pub struct PoolScanner {
    config: ScannerConfig,
}

impl PoolScanner {
    /// # Errors
    /// Returns [`ScanError::InvalidConfig`] when the configuration fails validation.
    pub fn new(config: ScannerConfig) -> Result<Self, ScanError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    pub fn filter_candidates(&self, pools: &[PoolCandidate]) -> Vec<PoolCandidate> {
        filter::filter_candidates(pools, &self.config)
    }

    /// Scores one pool. `None` when its history cannot support an estimate.
    pub fn evaluate(&self, candidate: &PoolCandidate, history: &PoolHistory) -> Option<ScanResult> {
        let metrics =
            compute_pool_metrics(history, self.config.days_window, self.config.sd_multiplier)?;
        let tvl_usd = if candidate.tvl_usd > Decimal::ZERO {
            candidate.tvl_usd
        } else {
            history.latest_tvl().unwrap_or(Decimal::ZERO)
        };
        Some(ScanResult::new(candidate, tvl_usd, metrics, &self.config.thresholds))
    }

    /// Ranked results for the pools that pass the filter and have usable history.
    pub fn scan<H: HistoryProvider + ?Sized>(
        &self,
        pools: &[PoolCandidate],
        histories: &H,
    ) -> Vec<ScanResult> {
        let candidates = self.filter_candidates(pools);
        let mut results = Vec::with_capacity(candidates.len());

        for candidate in &candidates {
            let Some(history) = histories.pool_history(&candidate.pool_id) else {
                debug!(pool = %candidate.pool_id, "no history, skipping");
                continue;
            };
            match self.evaluate(candidate, history) {
                Some(result) => results.push(result),
                None => debug!(
                    pool = %candidate.pool_id,
                    samples = history.len(),
                    "history unusable, skipping"
                ),
            }
        }

        let scored = results.len();
        let ranked = rank(results, self.config.rank_by.objective(), self.config.top_n);
        if ranked.is_empty() {
            info!(listed = pools.len(), candidates = candidates.len(), "no matches");
        } else {
            info!(
                listed = pools.len(),
                candidates = candidates.len(),
                scored,
                returned = ranked.len(),
                "scan complete"
            );
        }
        ranked
    }

    /// Scores a single pool by id, without filtering or ranking.
    ///
    /// # Errors
    /// Returns [`ScanError::EmptyPoolId`] for a blank id. An unknown pool or an
    /// unusable history is `Ok(None)`.
    pub fn analyze_single<H: HistoryProvider + ?Sized>(
        &self,
        pool_id: &str,
        histories: &H,
    ) -> Result<Option<ScanResult>, ScanError> {
        let pool_id = pool_id.trim();
        if pool_id.is_empty() {
            return Err(ScanError::EmptyPoolId);
        }
        let Some(history) = histories.pool_history(pool_id) else {
            debug!(pool = %pool_id, "unknown pool");
            return Ok(None);
        };
        let candidate = PoolCandidate::new(pool_id, "", "", "", "");
        Ok(self.evaluate(&candidate, history))
    }
}
