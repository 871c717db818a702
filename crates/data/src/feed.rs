//! Pool feed abstraction and its JSON-directory implementation.

use crate::dto::{
    PoolHistoryEnvelope, PoolListingEnvelope, candidates_from_records, history_from_records,
};
use crate::error::FeedError;
use async_trait::async_trait;
use range_scout_domain::entities::{PoolCandidate, PoolHistory};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Source of pool listings and per-pool history.
#[async_trait]
pub trait PoolFeed: Send + Sync {
    async fn list_pools(&self) -> Result<Vec<PoolCandidate>, FeedError>;

    /// Chronological history of one pool, `None` when the feed has none.
    async fn pool_history(&self, pool_id: &str) -> Result<Option<PoolHistory>, FeedError>;
}

/// Fetches the history of every candidate, one after another.
///
/// Pools the feed has no history for are left out of the map, as are pools
/// whose history cannot be parsed or whose id cannot name a history.
///
/// # Errors
/// Propagates I/O failures of the feed itself.
pub async fn fetch_histories<F: PoolFeed + ?Sized>(
    feed: &F,
    candidates: &[PoolCandidate],
) -> Result<HashMap<String, PoolHistory>, FeedError> {
    let mut histories = HashMap::with_capacity(candidates.len());
    for candidate in candidates {
        match feed.pool_history(&candidate.pool_id).await {
            Ok(Some(history)) => {
                histories.insert(candidate.pool_id.clone(), history);
            }
            Ok(None) => debug!(pool = %candidate.pool_id, "no history in feed"),
            Err(e @ (FeedError::Parse { .. } | FeedError::InvalidPoolId(_))) => {
                warn!(pool = %candidate.pool_id, error = %e, "skipping pool with unusable history");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(histories)
}

/// Reads `pools.json` and `history/<pool_id>.json` below a root directory.
#[derive(Debug, Clone)]
pub struct JsonDirectoryFeed {
    root: PathBuf,
}

impl JsonDirectoryFeed {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn listing_path(&self) -> PathBuf {
        self.root.join("pools.json")
    }

    fn history_path(&self, pool_id: &str) -> Result<PathBuf, FeedError> {
        let valid = !pool_id.is_empty()
            && pool_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
            && !pool_id.starts_with('.');
        if !valid {
            return Err(FeedError::InvalidPoolId(pool_id.to_string()));
        }
        Ok(self.root.join("history").join(format!("{pool_id}.json")))
    }
}

/// Reads and parses a JSON file; a missing file is `Ok(None)`.
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, FeedError> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(FeedError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| FeedError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

#[async_trait]
impl PoolFeed for JsonDirectoryFeed {
    async fn list_pools(&self) -> Result<Vec<PoolCandidate>, FeedError> {
        let path = self.listing_path();
        let envelope: PoolListingEnvelope =
            read_json(&path).await?.ok_or_else(|| FeedError::Io {
                path: path.clone(),
                source: std::io::Error::from(ErrorKind::NotFound),
            })?;
        let listed = envelope.pools.len();
        let pools = candidates_from_records(envelope.pools);
        info!(path = %path.display(), listed, usable = pools.len(), "loaded pool listing");
        Ok(pools)
    }

    async fn pool_history(&self, pool_id: &str) -> Result<Option<PoolHistory>, FeedError> {
        let path = self.history_path(pool_id)?;
        let Some(envelope) = read_json::<PoolHistoryEnvelope>(&path).await? else {
            return Ok(None);
        };
        let records = envelope.pool.map(|p| p.history).unwrap_or_default();
        if records.is_empty() {
            return Ok(None);
        }
        let history = history_from_records(records);
        debug!(pool = %pool_id, samples = history.len(), "loaded pool history");
        Ok((!history.is_empty()).then_some(history))
    }
}
