use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading a pool feed.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid pool id {0:?}")]
    InvalidPoolId(String),
}
