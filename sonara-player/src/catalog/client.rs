//! HTTP client for the search/stream API
//!
//! Endpoints (relative to the configured base URL):
//! - `GET /search?q={text}` → search results
//! - `GET /stream/{videoId}` → `{stream_url, duration, headers?}`
//! - `GET /search/exact?song_title={..}&artist={..}` → same shape as stream
//!
//! plus the public ip-api locale lookup used to pick the country chart.

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use sonara_common::track::{ResolvedStream, SearchResult};
use sonara_common::{Track, TrackOrigin};
use std::time::Duration;
use tracing::{debug, warn};

use super::StreamResolver;
use crate::error::{Error, Result};

const LOCALE_URL: &str = "http://ip-api.com/json";

/// Country as reported by the locale lookup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Locale {
    pub country: String,
    #[serde(rename = "countryCode")]
    pub country_code: String,
}

pub struct CatalogClient {
    client: reqwest::Client,
    base_url: Url,
    locale_url: Url,
}

impl CatalogClient {
    /// Create a client for `base_url` with a per-request timeout
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = Url::parse(base_url.trim())
            .map_err(|e| Error::Config(format!("invalid api_base_url '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!("api_base_url '{}' is not a base URL", base_url)));
        }

        let client = reqwest::Client::builder()
            .user_agent(concat!("sonara-player/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        let locale_url = Url::parse(LOCALE_URL)
            .map_err(|e| Error::Internal(format!("bad locale URL: {}", e)))?;

        Ok(Self {
            client,
            base_url,
            locale_url,
        })
    }

    /// Point the locale lookup somewhere else (self-hosted mirror, tests)
    pub fn with_locale_url(mut self, url: &str) -> Result<Self> {
        self.locale_url =
            Url::parse(url).map_err(|e| Error::Config(format!("invalid locale URL: {}", e)))?;
        Ok(self)
    }

    /// Free-text search
    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let mut url = self.endpoint(&["search"])?;
        url.query_pairs_mut().append_pair("q", query);
        debug!(query, "Searching catalog");

        let results: Vec<SearchResult> = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        debug!(query, count = results.len(), "Search complete");
        Ok(results)
    }

    /// Stream lookup by stream identifier
    pub async fn stream(&self, video_id: &str) -> Result<ResolvedStream> {
        let url = self.endpoint(&["stream", video_id])?;
        self.fetch_stream(url).await
    }

    /// Stream lookup by exact title and artist
    pub async fn exact(&self, title: &str, artist: &str) -> Result<ResolvedStream> {
        let mut url = self.endpoint(&["search", "exact"])?;
        url.query_pairs_mut()
            .append_pair("song_title", title)
            .append_pair("artist", artist);
        self.fetch_stream(url).await
    }

    /// Country of the current network location
    pub async fn locate(&self) -> Result<Locale> {
        let locale: Locale = self
            .client
            .get(self.locale_url.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(locale)
    }

    async fn fetch_stream(&self, url: Url) -> Result<ResolvedStream> {
        let response = self.client.get(url.clone()).send().await?;
        if !response.status().is_success() {
            warn!(url = %url, status = %response.status(), "Stream lookup rejected");
            return Err(Error::Resolution(format!(
                "stream lookup returned {}",
                response.status()
            )));
        }
        Ok(response.json().await?)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Internal(format!("cannot extend {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl StreamResolver for CatalogClient {
    async fn resolve(&self, track: &Track) -> Result<ResolvedStream> {
        match track.origin {
            TrackOrigin::Search => self.stream(&track.id).await,
            TrackOrigin::Catalog => self.exact(&track.title, &track.artist).await,
        }
    }
}
