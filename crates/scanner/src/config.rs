//! Scanner configuration.
//!
//! Verdict thresholds are policy: they are plain configuration with defaults
//! and can be overridden per scan.

use crate::error::ScanError;
use crate::objective::RankBy;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Default number of candidates kept for the per-pool metric step.
pub const DEFAULT_CANDIDATE_CAP: usize = 150;

/// Shortest price lookback, in days, used for volatility estimates.
pub const MIN_LOOKBACK_DAYS: u32 = 30;

/// Which chains a scan considers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainFilter {
    #[default]
    All,
    Only(Vec<String>),
}

impl ChainFilter {
    /// Case-insensitive membership test.
    pub fn matches(&self, chain_id: &str) -> bool {
        match self {
            ChainFilter::All => true,
            ChainFilter::Only(chains) => chains.iter().any(|c| c.eq_ignore_ascii_case(chain_id)),
        }
    }
}

/// Margin cut points for the qualitative verdict. A margin must be strictly
/// greater than a threshold to earn its label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerdictThresholds {
    pub best: Decimal,
    pub good: Decimal,
    pub marginal: Decimal,
}

impl Default for VerdictThresholds {
    fn default() -> Self {
        Self {
            best: Decimal::new(20, 2),
            good: Decimal::new(5, 2),
            marginal: Decimal::ZERO,
        }
    }
}

impl VerdictThresholds {
    #[must_use]
    pub fn new(best: Decimal, good: Decimal, marginal: Decimal) -> Self {
        Self {
            best,
            good,
            marginal,
        }
    }
}

/// Parameters of a scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub chains: ChainFilter,
    pub min_tvl_usd: Decimal,
    /// Symbols to look for; empty means no asset filter.
    pub assets: Vec<String>,
    /// Holding horizon, in days, for yield and range sizing.
    pub days_window: u32,
    /// Range half-width in standard deviations of the horizon move.
    pub sd_multiplier: Decimal,
    pub thresholds: VerdictThresholds,
    pub candidate_cap: usize,
    pub top_n: usize,
    pub rank_by: RankBy,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            chains: ChainFilter::All,
            min_tvl_usd: Decimal::ZERO,
            assets: Vec::new(),
            days_window: 7,
            sd_multiplier: Decimal::TWO,
            thresholds: VerdictThresholds::default(),
            candidate_cap: DEFAULT_CANDIDATE_CAP,
            top_n: 20,
            rank_by: RankBy::Ratio,
        }
    }
}

impl ScannerConfig {
    #[must_use]
    pub fn with_chains(mut self, chains: ChainFilter) -> Self {
        self.chains = chains;
        self
    }

    #[must_use]
    pub fn with_min_tvl(mut self, min_tvl_usd: Decimal) -> Self {
        self.min_tvl_usd = min_tvl_usd;
        self
    }

    #[must_use]
    pub fn with_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.assets = assets.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_days_window(mut self, days: u32) -> Self {
        self.days_window = days;
        self
    }

    #[must_use]
    pub fn with_sd_multiplier(mut self, sd_multiplier: Decimal) -> Self {
        self.sd_multiplier = sd_multiplier;
        self
    }

    #[must_use]
    pub fn with_thresholds(mut self, thresholds: VerdictThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    #[must_use]
    pub fn with_candidate_cap(mut self, cap: usize) -> Self {
        self.candidate_cap = cap;
        self
    }

    #[must_use]
    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    #[must_use]
    pub fn with_rank_by(mut self, rank_by: RankBy) -> Self {
        self.rank_by = rank_by;
        self
    }

    /// Checks the parameters a scan cannot run without.
    ///
    /// # Errors
    /// Returns [`ScanError::InvalidConfig`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ScanError> {
        if self.days_window == 0 {
            return Err(ScanError::InvalidConfig("days_window must be positive".into()));
        }
        if self.sd_multiplier <= Decimal::ZERO {
            return Err(ScanError::InvalidConfig("sd_multiplier must be positive".into()));
        }
        if self.min_tvl_usd < Decimal::ZERO {
            return Err(ScanError::InvalidConfig("min_tvl_usd must not be negative".into()));
        }
        if self.candidate_cap == 0 || self.top_n == 0 {
            return Err(ScanError::InvalidConfig(
                "candidate_cap and top_n must be positive".into(),
            ));
        }
        let t = &self.thresholds;
        if t.best < t.good || t.good < t.marginal {
            return Err(ScanError::InvalidConfig(
                "verdict thresholds must satisfy best >= good >= marginal".into(),
            ));
        }
        if let ChainFilter::Only(chains) = &self.chains {
            if chains.is_empty() {
                return Err(ScanError::InvalidConfig("chain set must not be empty".into()));
            }
        }
        Ok(())
    }

    /// Days of history the price lookback needs.
    pub fn lookback_days(&self) -> u32 {
        self.days_window.max(MIN_LOOKBACK_DAYS)
    }
}
