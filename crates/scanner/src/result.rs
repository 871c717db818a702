use crate::config::VerdictThresholds;
use crate::metrics::PoolMetrics;
use range_scout_domain::entities::PoolCandidate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative label for a pool's margin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Verdict {
    Unfavorable,
    Marginal,
    Good,
    Best,
}

impl Verdict {
    pub fn from_margin(margin: Decimal, thresholds: &VerdictThresholds) -> Self {
        if margin > thresholds.best {
            Verdict::Best
        } else if margin > thresholds.good {
            Verdict::Good
        } else if margin > thresholds.marginal {
            Verdict::Marginal
        } else {
            Verdict::Unfavorable
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Verdict::Best => "best",
            Verdict::Good => "good",
            Verdict::Marginal => "marginal",
            Verdict::Unfavorable => "unfavorable",
        };
        f.write_str(label)
    }
}

/// One row of a scan result table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub pool_id: String,
    pub chain_id: String,
    pub dex: String,
    pub name: String,
    pub fee_tier: u32,
    pub tvl_usd: Decimal,
    pub metrics: PoolMetrics,
    pub verdict: Verdict,
}

impl ScanResult {
    pub fn new(
        candidate: &PoolCandidate,
        tvl_usd: Decimal,
        metrics: PoolMetrics,
        thresholds: &VerdictThresholds,
    ) -> Self {
        let verdict = Verdict::from_margin(metrics.margin, thresholds);
        Self {
            pool_id: candidate.pool_id.clone(),
            chain_id: candidate.chain_id.clone(),
            dex: candidate.dex_label(),
            name: candidate.display_name(),
            fee_tier: candidate.fee_tier,
            tvl_usd,
            metrics,
            verdict,
        }
    }
}
