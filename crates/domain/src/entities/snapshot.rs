use crate::cadence::SamplingCadence;
use crate::value_objects::price::Price;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One sample of a pool's price/fee history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSnapshot {
    /// `YYYYMMDDHHMMSS` literal or unix time, see [`crate::cadence::parse_timestamp`].
    pub timestamp: u64,
    /// Quote tokens per one base token.
    pub native_price: Option<Decimal>,
    /// USD price of one base token.
    pub base_usd_price: Option<Decimal>,
    /// Reported APR for the period, in percent.
    pub apr_pct: Option<Decimal>,
    pub tvl_usd: Decimal,
    pub volume_usd: Decimal,
}

impl PriceSnapshot {
    #[must_use]
    pub fn new(
        timestamp: u64,
        native_price: Option<Decimal>,
        base_usd_price: Option<Decimal>,
    ) -> Self {
        Self {
            timestamp,
            native_price,
            base_usd_price,
            apr_pct: None,
            tvl_usd: Decimal::ZERO,
            volume_usd: Decimal::ZERO,
        }
    }

    #[must_use]
    pub fn with_apr(mut self, apr_pct: Decimal) -> Self {
        self.apr_pct = Some(apr_pct);
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

    /// The price used for range and loss math.
    ///
    /// Native price when present and positive, otherwise the USD price when
    /// present and positive; `None` marks the sample as unusable.
    pub fn relative_price(&self) -> Option<Price> {
        positive(self.native_price)
            .or_else(|| positive(self.base_usd_price))
            .map(Price::new)
    }

    /// USD price of one base token, when reported and positive.
    pub fn usd_price(&self) -> Option<Decimal> {
        positive(self.base_usd_price)
    }

    /// USD price of one quote token, derived as `base_usd / relative_price`.
    pub fn quote_usd_price(&self) -> Option<Decimal> {
        let base_usd = self.usd_price()?;
        let relative = self.relative_price()?;
        base_usd.checked_div(relative.value)
    }
}

fn positive(value: Option<Decimal>) -> Option<Decimal> {
    value.filter(|v| *v > Decimal::ZERO)
}

/// Relative prices of the usable samples, in input order.
pub fn relative_prices(snapshots: &[PriceSnapshot]) -> Vec<Decimal> {
    snapshots
        .iter()
        .filter_map(PriceSnapshot::relative_price)
        .map(|p| p.value)
        .collect()
}

/// A pool's history in chronological (oldest-first) order.
///
/// Feeds deliver newest-first; [`PoolHistory::from_newest_first`] is the only
/// place that order is undone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolHistory {
    snapshots: Vec<PriceSnapshot>,
}

impl PoolHistory {
    #[must_use]
    pub fn from_newest_first(mut snapshots: Vec<PriceSnapshot>) -> Self {
        snapshots.reverse();
        Self { snapshots }
    }

    #[must_use]
    pub fn from_chronological(snapshots: Vec<PriceSnapshot>) -> Self {
        Self { snapshots }
    }

    pub fn snapshots(&self) -> &[PriceSnapshot] {
        &self.snapshots
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// The most recent `count` samples (all of them if there are fewer).
    pub fn tail(&self, count: usize) -> &[PriceSnapshot] {
        let start = self.snapshots.len().saturating_sub(count);
        &self.snapshots[start..]
    }

    pub fn cadence(&self) -> SamplingCadence {
        let timestamps: Vec<u64> = self.snapshots.iter().map(|s| s.timestamp).collect();
        SamplingCadence::from_timestamps(&timestamps)
    }

    /// Newest positive TVL reading.
    pub fn latest_tvl(&self) -> Option<Decimal> {
        self.snapshots
            .iter()
            .rev()
            .map(|s| s.tvl_usd)
            .find(|tvl| *tvl > Decimal::ZERO)
    }
}
