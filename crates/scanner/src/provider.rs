use range_scout_domain::entities::PoolHistory;
use std::collections::HashMap;

/// In-memory lookup of already fetched pool histories.
pub trait HistoryProvider {
    fn pool_history(&self, pool_id: &str) -> Option<&PoolHistory>;
}

impl HistoryProvider for HashMap<String, PoolHistory> {
    fn pool_history(&self, pool_id: &str) -> Option<&PoolHistory> {
        self.get(pool_id)
    }
}
