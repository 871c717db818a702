//! Wire shapes of the pool listing and pool history feeds.

use crate::flexible;
use range_scout_domain::entities::{PoolCandidate, PoolHistory, PriceSnapshot};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// `{"pools": [...]}`.
#[derive(Debug, Default, Deserialize)]
pub struct PoolListingEnvelope {
    #[serde(default)]
    pub pools: Vec<Value>,
}

/// `{"pool": {"history": [...]}}`, history newest-first.
#[derive(Debug, Default, Deserialize)]
pub struct PoolHistoryEnvelope {
    #[serde(default)]
    pub pool: Option<PoolHistoryBody>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PoolHistoryBody {
    #[serde(default)]
    pub history: Vec<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PoolListingDto {
    #[serde(rename = "ChainId", default, deserialize_with = "flexible::text")]
    pub chain_id: Option<String>,
    #[serde(rename = "DexId", default, deserialize_with = "flexible::text")]
    pub dex_id: Option<String>,
    #[serde(rename = "BaseToken", default, deserialize_with = "flexible::text")]
    pub base_token: Option<String>,
    #[serde(rename = "QuoteToken", default, deserialize_with = "flexible::text")]
    pub quote_token: Option<String>,
    #[serde(rename = "feeTier", default, deserialize_with = "flexible::decimal")]
    pub fee_tier: Option<Decimal>,
    #[serde(rename = "pairAddress", default, deserialize_with = "flexible::text")]
    pub pair_address: Option<String>,
    #[serde(rename = "_id", default, deserialize_with = "flexible::text")]
    pub id: Option<String>,
    #[serde(rename = "Liquidity", default, deserialize_with = "flexible::decimal")]
    pub liquidity: Option<Decimal>,
    #[serde(rename = "Volume", default, deserialize_with = "flexible::decimal")]
    pub volume: Option<Decimal>,
}

impl PoolListingDto {
    /// `pairAddress`, falling back to `_id`.
    pub fn pool_id(&self) -> Option<&str> {
        self.pair_address.as_deref().or(self.id.as_deref())
    }

    /// `None` when the record carries no pool id.
    pub fn into_candidate(self) -> Option<PoolCandidate> {
        let pool_id = self.pool_id()?.to_string();
        let fee_tier = self
            .fee_tier
            .and_then(|f| f.round().to_u32())
            .unwrap_or_default();
        Some(
            PoolCandidate::new(
                pool_id,
                self.chain_id.unwrap_or_default(),
                self.dex_id.unwrap_or_default(),
                self.base_token.unwrap_or_else(|| "?".into()),
                self.quote_token.unwrap_or_else(|| "?".into()),
            )
            .with_fee_tier(fee_tier)
            .with_tvl(self.liquidity.unwrap_or_default())
            .with_volume(self.volume.unwrap_or_default()),
        )
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnapshotDto {
    #[serde(default, deserialize_with = "flexible::timestamp")]
    pub date: Option<u64>,
    #[serde(rename = "priceNative", default, deserialize_with = "flexible::decimal")]
    pub price_native: Option<Decimal>,
    #[serde(rename = "priceUsd", default, deserialize_with = "flexible::decimal")]
    pub price_usd: Option<Decimal>,
    #[serde(default, deserialize_with = "flexible::decimal")]
    pub apr: Option<Decimal>,
    #[serde(rename = "Liquidity", default, deserialize_with = "flexible::decimal")]
    pub liquidity: Option<Decimal>,
    #[serde(rename = "Volume", default, deserialize_with = "flexible::decimal")]
    pub volume: Option<Decimal>,
}

impl SnapshotDto {
    /// `None` when the record has no timestamp.
    pub fn into_snapshot(self) -> Option<PriceSnapshot> {
        let mut snapshot = PriceSnapshot::new(self.date?, self.price_native, self.price_usd)
            .with_tvl(self.liquidity.unwrap_or_default())
            .with_volume(self.volume.unwrap_or_default());
        snapshot.apr_pct = self.apr;
        Some(snapshot)
    }
}

/// Decodes listing records, dropping the ones that are malformed or carry no id.
pub fn candidates_from_records(records: Vec<Value>) -> Vec<PoolCandidate> {
    records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            match serde_json::from_value::<PoolListingDto>(record) {
                Ok(dto) => {
                    let candidate = dto.into_candidate();
                    if candidate.is_none() {
                        warn!(index, "pool record without id, dropping");
                    }
                    candidate
                }
                Err(error) => {
                    warn!(index, %error, "malformed pool record, dropping");
                    None
                }
            }
        })
        .collect()
}

/// Decodes newest-first history records into a chronological [`PoolHistory`].
pub fn history_from_records(records: Vec<Value>) -> PoolHistory {
    let snapshots = records
        .into_iter()
        .enumerate()
        .filter_map(|(index, record)| {
            match serde_json::from_value::<SnapshotDto>(record) {
                Ok(dto) => {
                    let snapshot = dto.into_snapshot();
                    if snapshot.is_none() {
                        warn!(index, "history record without date, dropping");
                    }
                    snapshot
                }
                Err(error) => {
                    warn!(index, %error, "malformed history record, dropping");
                    None
                }
            }
        })
        .collect();
    PoolHistory::from_newest_first(snapshots)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_listing_record_conversion() {
        let records = vec![
            json!({
                "ChainId": "arbitrum", "DexId": "uniswap-v3",
                "BaseToken": "WETH", "QuoteToken": "USDC",
                "feeTier": "500", "pairAddress": "0xabc",
                "Liquidity": 1250000.5, "Volume": "880000"
            }),
            json!({"ChainId": "base", "_id": "fallback-id", "feeTier": 3000, "Liquidity": null}),
            json!({"ChainId": "base", "Liquidity": 10}),
            json!("not an object"),
        ];
        let pools = candidates_from_records(records);
        assert_eq!(pools.len(), 2);

        assert_eq!(pools[0].pool_id, "0xabc");
        assert_eq!(pools[0].fee_tier, 500);
        assert_eq!(pools[0].tvl_usd, dec!(1250000.5));
        assert_eq!(pools[0].volume_usd, dec!(880000));
        assert_eq!(pools[0].display_name(), "WETH / USDC 0.05%");

        assert_eq!(pools[1].pool_id, "fallback-id");
        assert_eq!(pools[1].tvl_usd, Decimal::ZERO);
        assert_eq!(pools[1].base_symbol, "?");
    }

    #[test]
    fn test_history_is_reversed_to_chronological() {
        let records = vec![
            json!({"date": 20240102080000u64, "priceNative": "1.02", "priceUsd": 1.02, "apr": "12.5", "Liquidity": 900}),
            json!({"date": "20240102000000", "priceNative": 0, "priceUsd": "1.01", "apr": null}),
            json!({"priceNative": 1.0}),
            json!({"date": 20240101160000u64, "priceNative": 1.0, "priceUsd": 1.0, "apr": 10}),
        ];
        let history = history_from_records(records);
        let snaps = history.snapshots();

        assert_eq!(snaps.len(), 3);
        assert_eq!(snaps[0].timestamp, 20240101160000);
        assert_eq!(snaps[2].timestamp, 20240102080000);
        assert_eq!(snaps[2].apr_pct, Some(dec!(12.5)));
        assert_eq!(snaps[1].apr_pct, None);
        // zero native price falls back to the USD price
        assert_eq!(snaps[1].relative_price().map(|p| p.value), Some(dec!(1.01)));
        assert_eq!(history.latest_tvl(), Some(dec!(900)));
        assert_eq!(history.cadence().samples_per_day(), 3);
    }
}
