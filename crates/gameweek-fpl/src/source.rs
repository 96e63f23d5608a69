// Data-source seam between the FPL feeds and the scoring pipeline.

use async_trait::async_trait;
use gameweek_core::{Fixture, Player, Team};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("malformed {what} payload: {source}")]
    Json {
        what: &'static str,
        source: serde_json::Error,
    },
}

/// Players plus the team table that came with them.
#[derive(Debug, Clone, Default)]
pub struct PlayerFeed {
    pub players: Vec<Player>,
    pub teams: Vec<Team>,
}

/// Anything that can produce one cycle's player and fixture records.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Human-readable origin for logs (URL or file paths).
    fn describe(&self) -> String;

    async fn fetch_players(&self) -> Result<PlayerFeed, FetchError>;

    async fn fetch_fixtures(&self) -> Result<Vec<Fixture>, FetchError>;
}
