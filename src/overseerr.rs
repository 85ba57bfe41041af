use crate::error::TransportError;
use crate::models::RequestFilter;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::Client;
use serde::Deserialize;
use std::env;
use std::time::Duration;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct OverseerrClient {
    client: Client,
    base_url: String,
}

/// The five remote calls the aggregation pipeline needs. Everything past the
/// transport seam works against this trait so tests can substitute fakes.
#[async_trait]
pub trait OverseerrApi: Send + Sync {
    async fn server_status(&self) -> Result<serde_json::Value, TransportError>;
    async fn request_page(
        &self,
        take: u32,
        skip: u32,
        filter: Option<RequestFilter>,
    ) -> Result<RequestPage, TransportError>;
    async fn movie_details(&self, id: i64) -> Result<MovieDetail, TransportError>;
    async fn tv_details(&self, id: i64) -> Result<TvDetail, TransportError>;
    async fn season_details(&self, tv_id: i64, season: i64)
        -> Result<SeasonDetail, TransportError>;
}

impl OverseerrClient {
    pub fn from_env() -> Result<Self> {
        let base_url = env::var("OVERSEERR_URL").context("OVERSEERR_URL not set")?;
        let api_key = env::var("OVERSEERR_API_KEY").context("OVERSEERR_API_KEY not set")?;
        Self::new(base_url, &api_key)
    }

    pub fn new(base_url: String, api_key: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            "X-Api-Key",
            HeaderValue::from_str(api_key).context("OVERSEERR_API_KEY is not a valid header")?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json<T: for<'de> Deserialize<'de>>(&self, url: &str) -> Result<T, TransportError> {
        let res = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| TransportError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;
        let status = res.status();
        let text = res.text().await.map_err(|e| TransportError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        if !status.is_success() {
            return Err(TransportError::Http {
                url: url.to_string(),
                status: status.as_u16(),
                body: text,
            });
        }
        serde_json::from_str(&text).map_err(|e| TransportError::Decode {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl OverseerrApi for OverseerrClient {
    async fn server_status(&self) -> Result<serde_json::Value, TransportError> {
        let url = format!("{}/api/v1/status", self.base_url);
        self.get_json(&url).await
    }

    async fn request_page(
        &self,
        take: u32,
        skip: u32,
        filter: Option<RequestFilter>,
    ) -> Result<RequestPage, TransportError> {
        let mut url = format!(
            "{}/api/v1/request?take={}&skip={}&sort=added",
            self.base_url, take, skip
        );
        if let Some(f) = filter {
            url.push_str("&filter=");
            url.push_str(f.as_str());
        }
        self.get_json(&url).await
    }

    async fn movie_details(&self, id: i64) -> Result<MovieDetail, TransportError> {
        let url = format!("{}/api/v1/movie/{}", self.base_url, id);
        self.get_json(&url).await
    }

    async fn tv_details(&self, id: i64) -> Result<TvDetail, TransportError> {
        let url = format!("{}/api/v1/tv/{}", self.base_url, id);
        self.get_json(&url).await
    }

    async fn season_details(
        &self,
        tv_id: i64,
        season: i64,
    ) -> Result<SeasonDetail, TransportError> {
        let url = format!("{}/api/v1/tv/{}/season/{}", self.base_url, tv_id, season);
        self.get_json(&url).await
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RequestPage {
    #[serde(default)]
    pub results: Vec<RawRequest>,
    #[serde(rename = "pageInfo", default)]
    pub page_info: PageInfo,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageInfo {
    #[serde(default)]
    pub pages: u32,
}

/// One unprocessed record from the request-listing endpoint. Overseerr
/// returns far more fields than these; only the ones the pipeline reads are
/// modeled.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRequest {
    pub media: Option<MediaInfo>,
    #[serde(rename = "createdAt", default)]
    pub created_at: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MediaInfo {
    #[serde(rename = "tmdbId")]
    pub tmdb_id: Option<i64>,
    #[serde(rename = "tvdbId")]
    pub tvdb_id: Option<i64>,
    pub status: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MovieDetail {
    pub title: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TvDetail {
    pub name: Option<String>,
    #[serde(default)]
    pub seasons: Vec<Season>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Season {
    #[serde(rename = "seasonNumber", default)]
    pub season_number: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeasonDetail {
    #[serde(default)]
    pub episodes: Vec<Episode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Episode {
    #[serde(rename = "episodeNumber", default)]
    pub episode_number: i64,
    pub name: Option<String>,
}
