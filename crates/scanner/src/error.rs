use thiserror::Error;

/// Errors raised before a scan starts. Pools with unusable history are not errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScanError {
    /// A structurally invalid scanner parameter.
    #[error("Invalid scanner configuration: {0}")]
    InvalidConfig(String),
    /// `analyze_single` was called without a pool id.
    #[error("Pool id must not be empty")]
    EmptyPoolId,
}
