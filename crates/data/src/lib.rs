//! Pool listing and history feeds.
//!
//! Feeds deliver history newest-first with loosely typed numbers; this crate
//! decodes them into the chronological domain types the scanner and the
//! backtester work on.

pub mod dto;
pub mod error;
pub mod feed;
pub mod flexible;

pub use error::FeedError;
pub use feed::{JsonDirectoryFeed, PoolFeed, fetch_histories};
