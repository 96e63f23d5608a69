// On-disk snapshot source.
//
// Reads previously saved `bootstrap-static` and `fixtures` payloads, so a
// cycle can be rerun offline against the exact data the API served.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use gameweek_core::Fixture;
use tracing::info;

use crate::api;
use crate::source::{DataSource, FetchError, PlayerFeed};

pub struct SnapshotSource {
    bootstrap_path: PathBuf,
    fixtures_path: PathBuf,
}

impl SnapshotSource {
    pub fn new(bootstrap_path: impl Into<PathBuf>, fixtures_path: impl Into<PathBuf>) -> Self {
        Self {
            bootstrap_path: bootstrap_path.into(),
            fixtures_path: fixtures_path.into(),
        }
    }
}

async fn read_file(path: &Path) -> Result<String, FetchError> {
    info!("reading {}", path.display());
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| FetchError::Io {
            path: path.display().to_string(),
            source: e,
        })
}

#[async_trait]
impl DataSource for SnapshotSource {
    fn describe(&self) -> String {
        format!(
            "{} + {}",
            self.bootstrap_path.display(),
            self.fixtures_path.display()
        )
    }

    async fn fetch_players(&self) -> Result<PlayerFeed, FetchError> {
        let body = read_file(&self.bootstrap_path).await?;
        api::decode_bootstrap(&body).map_err(|e| FetchError::Json {
            what: "bootstrap-static",
            source: e,
        })
    }

    async fn fetch_fixtures(&self) -> Result<Vec<Fixture>, FetchError> {
        let body = read_file(&self.fixtures_path).await?;
        api::decode_fixtures(&body).map_err(|e| FetchError::Json {
            what: "fixtures",
            source: e,
        })
    }
}
