use crate::config::ScannerConfig;
use range_scout_domain::entities::PoolCandidate;

/// Narrows a pool listing to the candidates worth fetching history for.
///
/// Chain membership, then `tvl >= min_tvl_usd`, then the optional asset
/// filter, then volume descending, truncated to `candidate_cap`.
pub fn filter_candidates(pools: &[PoolCandidate], config: &ScannerConfig) -> Vec<PoolCandidate> {
    let mut candidates: Vec<PoolCandidate> = pools
        .iter()
        .filter(|p| config.chains.matches(&p.chain_id))
        .filter(|p| p.tvl_usd >= config.min_tvl_usd)
        .filter(|p| config.assets.is_empty() || config.assets.iter().any(|a| p.matches_symbol(a)))
        .cloned()
        .collect();

    candidates.sort_by(|a, b| b.volume_usd.cmp(&a.volume_usd));
    candidates.truncate(config.candidate_cap);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChainFilter;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn pool(id: &str, chain: &str, base: &str, tvl: Decimal, volume: Decimal) -> PoolCandidate {
        PoolCandidate::new(id, chain, "uniswap-v3", base, "USDC")
            .with_fee_tier(3000)
            .with_tvl(tvl)
            .with_volume(volume)
    }

    fn listing() -> Vec<PoolCandidate> {
        vec![
            pool("a", "ethereum", "WETH", dec!(5_000_000), dec!(100)),
            pool("b", "arbitrum", "WETH", dec!(2_000_000), dec!(900)),
            pool("c", "arbitrum", "ARB", dec!(50_000), dec!(5000)),
            pool("d", "Arbitrum", "wstETH", dec!(800_000), dec!(300)),
            pool("e", "base", "cbBTC", dec!(1_000_000), dec!(700)),
        ]
    }

    #[test]
    fn test_chain_and_tvl_then_volume_order() {
        let config = ScannerConfig::default()
            .with_chains(ChainFilter::Only(vec!["arbitrum".into()]))
            .with_min_tvl(dec!(100_000));
        let ids: Vec<String> = filter_candidates(&listing(), &config)
            .into_iter()
            .map(|p| p.pool_id)
            .collect();
        assert_eq!(ids, vec!["b", "d"]);
    }

    #[test]
    fn test_asset_filter_is_case_insensitive_containment() {
        let config = ScannerConfig::default().with_assets(["eth"]);
        let ids: Vec<String> = filter_candidates(&listing(), &config)
            .into_iter()
            .map(|p| p.pool_id)
            .collect();
        assert_eq!(ids, vec!["b", "d", "a"]);
    }

    #[test]
    fn test_candidate_cap() {
        let config = ScannerConfig::default().with_candidate_cap(2);
        let ids: Vec<String> = filter_candidates(&listing(), &config)
            .into_iter()
            .map(|p| p.pool_id)
            .collect();
        assert_eq!(ids, vec!["c", "b"]);
    }
}
