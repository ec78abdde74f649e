use super::{ApiError, FeedApi};
use crate::model::{Feed, FeedId, ItemPage, ItemQuery};
use async_trait::async_trait;
use futures::StreamExt;
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Base URL used when neither the CLI, the environment nor the config file
/// supplies one.
pub const DEFAULT_API_URL: &str = "http://localhost:8080";

/// Upper bound on any response body we are willing to buffer.
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// `FeedApi` over HTTP/JSON.
#[derive(Clone)]
pub struct HttpFeedApi {
    client: reqwest::Client,
    base: Url,
}

impl std::fmt::Debug for HttpFeedApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFeedApi")
            .field("base", &self.base.as_str())
            .finish()
    }
}

impl HttpFeedApi {
    /// Build a client for `base_url`.
    ///
    /// The URL must be absolute http(s). A trailing slash is optional.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .pool_max_idle_per_host(4)
            .pool_idle_timeout(Duration::from_secs(30))
            .tcp_keepalive(Duration::from_secs(60))
            .timeout(Duration::from_secs(30))
            .build()?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: &str) -> Result<Self, ApiError> {
        let base = parse_base_url(base_url)?;
        tracing::debug!(base_url = %base, "Feed API client configured");
        Ok(Self { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Join a path onto the base URL, keeping any path prefix the base has
    /// (e.g. `https://host/api` + `feeds` = `https://host/api/feeds`).
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!(url = %url, status = status.as_u16(), "GET returned non-success");
            return Err(ApiError::HttpStatus(status.as_u16()));
        }
        let body = read_limited(response, MAX_RESPONSE_SIZE).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// Validate and normalise a base URL.
pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ApiError> {
    let url = Url::parse(raw.trim()).map_err(|e| ApiError::InvalidBaseUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => {}
        other => {
            return Err(ApiError::InvalidBaseUrl(format!(
                "{raw}: unsupported scheme '{other}'"
            )))
        }
    }
    if url.cannot_be_a_base() || url.host_str().is_none() {
        return Err(ApiError::InvalidBaseUrl(raw.to_string()));
    }
    Ok(url)
}

#[async_trait]
impl FeedApi for HttpFeedApi {
    async fn list_feeds(&self) -> Result<Vec<Feed>, ApiError> {
        let feeds: Option<Vec<Feed>> = self.get_json(self.endpoint(&["feeds"])).await?;
        // Older servers send `null` for an empty table
        Ok(feeds.unwrap_or_default())
    }

    async fn create_feed(&self, url: &str) -> Result<(), ApiError> {
        let body = serde_json::to_vec(&serde_json::json!({ "url": url }))?;
        let response = self
            .client
            .post(self.endpoint(&["feeds"]))
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(feed_url = %url, status = status.as_u16(), "Create feed rejected");
            return Err(ApiError::HttpStatus(status.as_u16()));
        }
        tracing::info!(feed_url = %url, "Feed created");
        Ok(())
    }

    async fn delete_feed(&self, id: FeedId) -> Result<(), ApiError> {
        let response = self
            .client
            .delete(self.endpoint(&["feeds", &id.to_string()]))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(feed_id = id, status = status.as_u16(), "Delete feed rejected");
            return Err(ApiError::HttpStatus(status.as_u16()));
        }
        tracing::info!(feed_id = id, "Feed deleted");
        Ok(())
    }

    async fn list_items(&self, query: ItemQuery) -> Result<ItemPage, ApiError> {
        let mut url = self.endpoint(&["items"]);
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("page", &query.page.to_string())
                .append_pair("page_size", &query.page_size.to_string());
            if let Some(feed_id) = query.feed_id {
                pairs.append_pair("feed_id", &feed_id.to_string());
            }
        }
        self.get_json(url).await
    }
}

/// Buffer a response body, refusing anything over `limit` bytes.
async fn read_limited(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
