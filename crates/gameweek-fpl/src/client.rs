// HTTP client for the public FPL API.
//
// Two GETs per cycle: `bootstrap-static/` for players and teams, `fixtures/`
// for the schedule. No retries and no caching; a failed request is returned
// to the caller.

use std::time::Duration;

use async_trait::async_trait;
use gameweek_core::Fixture;
use tracing::{debug, info};

use crate::api;
use crate::source::{DataSource, FetchError, PlayerFeed};

pub const DEFAULT_BASE_URL: &str = "https://fantasy.premierleague.com/api";

const USER_AGENT: &str = concat!("gameweek/", env!("CARGO_PKG_VERSION"));

/// Join the API base and an endpoint name, keeping FPL's trailing slash.
pub fn endpoint_url(base_url: &str, endpoint: &str) -> String {
    format!(
        "{}/{}/",
        base_url.trim_end_matches('/'),
        endpoint.trim_matches('/')
    )
}

pub struct FplClient {
    http: reqwest::Client,
    base_url: String,
}

impl FplClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let base_url = base_url.into();
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| FetchError::Http {
                url: base_url.clone(),
                source: e,
            })?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_text(&self, endpoint: &str) -> Result<String, FetchError> {
        let url = endpoint_url(&self.base_url, endpoint);
        info!("GET {}", url);

        let response = self.http.get(&url).send().await.map_err(|e| FetchError::Http {
            url: url.clone(),
            source: e,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Http {
            url: url.clone(),
            source: e,
        })?;
        debug!(bytes = body.len(), "received {}", url);
        Ok(body)
    }
}

#[async_trait]
impl DataSource for FplClient {
    fn describe(&self) -> String {
        self.base_url.clone()
    }

    async fn fetch_players(&self) -> Result<PlayerFeed, FetchError> {
        let body = self.get_text("bootstrap-static").await?;
        api::decode_bootstrap(&body).map_err(|e| FetchError::Json {
            what: "bootstrap-static",
            source: e,
        })
    }

    async fn fetch_fixtures(&self) -> Result<Vec<Fixture>, FetchError> {
        let body = self.get_text("fixtures").await?;
        api::decode_fixtures(&body).map_err(|e| FetchError::Json {
            what: "fixtures",
            source: e,
        })
    }
}
