// FPL data acquisition: JSON decoding plus HTTP and on-disk sources.

pub mod api;
pub mod client;
pub mod snapshot;
pub mod source;

pub use client::FplClient;
pub use snapshot::SnapshotSource;
pub use source::{DataSource, FetchError, PlayerFeed};
