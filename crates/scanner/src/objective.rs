//! Ranking objectives for scan results.

use crate::result::ScanResult;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

pub trait RankingObjective {
    fn evaluate(&self, result: &ScanResult) -> Decimal;
    fn compare(&self, a: &ScanResult, b: &ScanResult) -> Ordering {
        self.evaluate(a).cmp(&self.evaluate(b))
    }
}

pub struct MaximizeTvl;
impl RankingObjective for MaximizeTvl {
    fn evaluate(&self, result: &ScanResult) -> Decimal {
        result.tvl_usd
    }
}

pub struct MaximizeRatio;
impl RankingObjective for MaximizeRatio {
    fn evaluate(&self, result: &ScanResult) -> Decimal {
        result.metrics.ratio
    }
}

pub struct MaximizeMargin;
impl RankingObjective for MaximizeMargin {
    fn evaluate(&self, result: &ScanResult) -> Decimal {
        result.metrics.margin
    }
}

/// Selectable ranking key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankBy {
    Tvl,
    #[default]
    Ratio,
    Margin,
}

impl RankBy {
    pub fn objective(self) -> &'static dyn RankingObjective {
        match self {
            RankBy::Tvl => &MaximizeTvl,
            RankBy::Ratio => &MaximizeRatio,
            RankBy::Margin => &MaximizeMargin,
        }
    }
}

/// Sorts best-first by `objective` and keeps at most `top_n` rows.
///
/// Ties are broken by pool id so the order does not depend on input order.
pub fn rank(
    mut results: Vec<ScanResult>,
    objective: &dyn RankingObjective,
    top_n: usize,
) -> Vec<ScanResult> {
    results.sort_by(|a, b| {
        objective
            .compare(b, a)
            .then_with(|| a.pool_id.cmp(&b.pool_id))
    });
    results.truncate(top_n);
    results
}
