//! Client side of the feed API.
//!
//! - `FeedApi` - the four operations the UI needs, object-safe so the
//!   coordinator can hold an `Arc<dyn FeedApi>` and tests can swap in fakes
//! - `http` - `HttpFeedApi`, the reqwest implementation
//! - `ingest` - bounded poll that waits for a newly added feed's items

mod http;
pub mod ingest;

use crate::model::{Feed, FeedId, ItemPage, ItemQuery};
use async_trait::async_trait;
use thiserror::Error;

pub(crate) use http::parse_base_url;
pub use http::{HttpFeedApi, DEFAULT_API_URL};
pub use ingest::{await_ingest, IngestOutcome, IngestPolicy};

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    #[error("Malformed response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// True when the server answered with a non-success status, as opposed
    /// to the request never completing.
    pub fn is_status(&self) -> bool {
        matches!(self, ApiError::HttpStatus(_))
    }
}

/// The external feed/item service.
#[async_trait]
pub trait FeedApi: Send + Sync {
    /// `GET /feeds`
    async fn list_feeds(&self) -> Result<Vec<Feed>, ApiError>;

    /// `POST /feeds` with `{"url": ...}`. The created feed is not returned;
    /// callers refetch the feed list to observe it.
    async fn create_feed(&self, url: &str) -> Result<(), ApiError>;

    /// `DELETE /feeds/{id}`
    async fn delete_feed(&self, id: FeedId) -> Result<(), ApiError>;

    /// `GET /items?page=..&page_size=..[&feed_id=..]`
    async fn list_items(&self, query: ItemQuery) -> Result<ItemPage, ApiError>;
}
