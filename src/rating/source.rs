use anyhow::Context;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{EntityId, Rating};

/// Why a remote rating lookup produced no value.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("no rating for {0}")]
    NotFound(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// A live source of ratings keyed by canonical identifier.
#[async_trait]
pub trait RatingSource: Send + Sync {
    async fn fetch_rating(&self, id: &EntityId) -> Result<Rating, LookupError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Rating lookup over HTTP: `GET {base_url}/{ID}` returning `{"rating": N}`.
#[derive(Clone)]
pub struct HttpRatingSource {
    http: Client,
    base_url: Url,
    api_key: Option<String>,
    timeout: Duration,
}

impl HttpRatingSource {
    pub fn new(base_url: &str, api_key: Option<String>, timeout: Duration) -> anyhow::Result<Self> {
        let base_url = Url::parse(base_url).context("Invalid ratings API URL")?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Ratings API URL cannot be used as a base: {}", base_url);
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpRatingSource {
            http,
            base_url,
            api_key,
            timeout,
        })
    }

    fn lookup_url(&self, id: &EntityId) -> Result<Url, LookupError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| LookupError::Malformed("base URL has no path".into()))?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }
}

#[async_trait]
impl RatingSource for HttpRatingSource {
    fn name(&self) -> &str {
        "ratings-api"
    }

    async fn fetch_rating(&self, id: &EntityId) -> Result<Rating, LookupError> {
        let url = self.lookup_url(id)?;
        debug!("Fetching rating for {} from {}", id, url);

        let mut req = self.http.get(url);
        if let Some(key) = &self.api_key {
            req = req.bearer_auth(key);
        }

        let resp = req.send().await.map_err(|e| {
            if e.is_timeout() {
                LookupError::Timeout(self.timeout)
            } else {
                LookupError::Transport(e.to_string())
            }
        })?;

        match resp.status() {
            s if s.is_success() => {}
            StatusCode::NOT_FOUND => return Err(LookupError::NotFound(id.to_string())),
            s => return Err(LookupError::Status(s.as_u16())),
        }

        let raw: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| LookupError::Malformed(e.to_string()))?;

        parse_rating_response(&raw)
    }
}

/// Extract the `rating` field from a lookup response body.
///
/// Accepts a JSON number or a numeric string; anything else is malformed.
pub fn parse_rating_response(raw: &serde_json::Value) -> Result<Rating, LookupError> {
    let field = &raw["rating"];
    let rating = field
        .as_f64()
        .or_else(|| field.as_str().and_then(|s| s.trim().parse::<f64>().ok()))
        .ok_or_else(|| LookupError::Malformed(format!("no numeric rating in {}", raw)))?;

    if !rating.is_finite() {
        return Err(LookupError::Malformed(format!("rating {} is not finite", rating)));
    }
    Ok(rating)
}
