use crate::value_objects::percentage::Percentage;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A pool as listed by the market feed, before any history is fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolCandidate {
    pub pool_id: String,
    pub chain_id: String,
    pub dex_id: String,
    pub base_symbol: String,
    pub quote_symbol: String,
    /// Hundredths of a bip: 3000 = 0.30%.
    pub fee_tier: u32,
    pub tvl_usd: Decimal,
    pub volume_usd: Decimal,
}

impl PoolCandidate {
    pub fn new(
        pool_id: impl Into<String>,
        chain_id: impl Into<String>,
        dex_id: impl Into<String>,
        base_symbol: impl Into<String>,
        quote_symbol: impl Into<String>,
    ) -> Self {
        Self {
            pool_id: pool_id.into(),
            chain_id: chain_id.into(),
            dex_id: dex_id.into(),
            base_symbol: base_symbol.into(),
            quote_symbol: quote_symbol.into(),
            fee_tier: 0,
            tvl_usd: Decimal::ZERO,
            volume_usd: Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn with_fee_tier(mut self, fee_tier: u32) -> Self {
        self.fee_tier = fee_tier;
        self
    }

    #[must_use]
    pub fn with_tvl(mut self, tvl_usd: Decimal) -> Self {
        self.tvl_usd = tvl_usd;
        self
    }

    #[must_use]
    pub fn with_volume(mut self, volume_usd: Decimal) -> Self {
        self.volume_usd = volume_usd;
        self
    }

    pub fn fee(&self) -> Percentage {
        Percentage::from_fee_tier(self.fee_tier)
    }

    /// `"WETH / USDC 0.05%"`, or the pool id when the listing carried no symbols.
    pub fn display_name(&self) -> String {
        if self.base_symbol.is_empty() && self.quote_symbol.is_empty() {
            return self.pool_id.clone();
        }
        format!("{} / {} {}", self.base_symbol, self.quote_symbol, self.fee())
    }

    /// Dex id without the protocol-version suffix, capitalized: `uniswap-v3` -> `Uniswap`.
    pub fn dex_label(&self) -> String {
        let trimmed = self
            .dex_id
            .trim()
            .trim_end_matches("-v3")
            .trim_end_matches(" v3");
        capitalize(trimmed)
    }

    /// Case-insensitive containment against either symbol.
    pub fn matches_symbol(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.base_symbol.to_lowercase().contains(&needle)
            || self.quote_symbol.to_lowercase().contains(&needle)
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
