//! Waiting out server-side ingestion after a feed is added.
//!
//! `POST /feeds` returns before the server has fetched the feed, so a newly
//! added feed has no items for a while. Rather than refetching once after a
//! guessed delay, poll with exponential backoff until the feed shows up with
//! at least one item or the attempt budget runs out.

use super::FeedApi;
use crate::model::{FeedId, ItemQuery};
use std::time::Duration;

/// Backoff schedule for `await_ingest`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for IngestPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(4),
        }
    }
}

impl IngestPolicy {
    /// Delay before attempt `n` (0-based): initial * 2^n, capped.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1u32.checked_shl(attempt.min(16)).unwrap_or(u32::MAX);
        self.initial_delay
            .checked_mul(factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// The feed is listed and has items.
    Ready { feed_id: FeedId, total_count: u64 },
    /// Budget exhausted. `feed_id` is set if the feed was listed but empty.
    TimedOut {
        attempts: u32,
        feed_id: Option<FeedId>,
    },
}

/// Poll until the feed subscribed as `url` has items.
///
/// Each attempt sleeps first, then lists feeds to resolve `url` to an id and
/// asks for a single item of that feed. API errors are logged and consume an
/// attempt.
pub async fn await_ingest(api: &dyn FeedApi, url: &str, policy: IngestPolicy) -> IngestOutcome {
    let wanted = url.trim();
    let mut known_id = None;

    for attempt in 0..policy.max_attempts {
        tokio::time::sleep(policy.delay_for(attempt)).await;

        if known_id.is_none() {
            match api.list_feeds().await {
                Ok(feeds) => {
                    known_id = feeds
                        .iter()
                        .find(|f| urls_match(&f.url, wanted))
                        .map(|f| f.id);
                }
                Err(e) => {
                    tracing::warn!(error = %e, attempt, "Ingest poll: listing feeds failed");
                    continue;
                }
            }
        }

        let Some(feed_id) = known_id else {
            tracing::debug!(feed_url = %wanted, attempt, "Ingest poll: feed not listed yet");
            continue;
        };

        let query = ItemQuery {
            page: 1,
            page_size: 1,
            feed_id: Some(feed_id),
        };
        match api.list_items(query).await {
            Ok(page) if page.total_count > 0 || !page.items.is_empty() => {
                let total_count = page.total_count.max(page.items.len() as u64);
                tracing::info!(feed_id, total_count, attempt, "Ingest poll: feed has items");
                return IngestOutcome::Ready {
                    feed_id,
                    total_count,
                };
            }
            Ok(_) => {
                tracing::debug!(feed_id, attempt, "Ingest poll: no items yet");
            }
            Err(e) => {
                tracing::warn!(error = %e, feed_id, attempt, "Ingest poll: listing items failed");
            }
        }
    }

    tracing::info!(
        feed_url = %wanted,
        attempts = policy.max_attempts,
        "Ingest poll gave up waiting for items"
    );
    IngestOutcome::TimedOut {
        attempts: policy.max_attempts,
        feed_id: known_id,
    }
}

/// Compare feed URLs ignoring surrounding whitespace and a trailing slash.
fn urls_match(listed: &str, wanted: &str) -> bool {
    listed.trim().trim_end_matches('/') == wanted.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::model::{Feed, ItemPage};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Lists the feed from the second call on; has items from the `ready_at`th
    /// item query on.
    struct SlowServer {
        feed_calls: AtomicU32,
        item_calls: AtomicU32,
        ready_at: u32,
    }

    impl SlowServer {
        fn new(ready_at: u32) -> Self {
            Self {
                feed_calls: AtomicU32::new(0),
                item_calls: AtomicU32::new(0),
                ready_at,
            }
        }
    }

    #[async_trait]
    impl FeedApi for SlowServer {
        async fn list_feeds(&self) -> Result<Vec<Feed>, ApiError> {
            let n = self.feed_calls.fetch_add(1, Ordering::SeqCst);
            if n == 0 {
                return Ok(Vec::new());
            }
            Ok(vec![Feed {
                id: 5,
                url: "https://new.example/rss/".to_string(),
                title: None,
                created_at: None,
            }])
        }

        async fn create_feed(&self, _url: &str) -> Result<(), ApiError> {
            Ok(())
        }

        async fn delete_feed(&self, _id: FeedId) -> Result<(), ApiError> {
            Ok(())
        }

        async fn list_items(&self, query: ItemQuery) -> Result<ItemPage, ApiError> {
            assert_eq!(query.feed_id, Some(5));
            let n = self.item_calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(ItemPage {
                items: Vec::new(),
                total_count: if n >= self.ready_at { 3 } else { 0 },
            })
        }
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let policy = IngestPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(500));
        assert_eq!(policy.delay_for(1), Duration::from_secs(1));
        assert_eq!(policy.delay_for(2), Duration::from_secs(2));
        assert_eq!(policy.delay_for(3), Duration::from_secs(4));
        assert_eq!(policy.delay_for(10), Duration::from_secs(4));
        assert_eq!(policy.delay_for(u32::MAX), Duration::from_secs(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_once_items_appear() {
        let server = SlowServer::new(2);
        let outcome = await_ingest(&server, "https://new.example/rss", IngestPolicy::default()).await;
        assert_eq!(
            outcome,
            IngestOutcome::Ready {
                feed_id: 5,
                total_count: 3
            }
        );
        // Feed id resolved once, then reused
        assert_eq!(server.feed_calls.load(Ordering::SeqCst), 2);
        assert_eq!(server.item_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_times_out_within_budget() {
        let server = SlowServer::new(u32::MAX);
        let policy = IngestPolicy {
            max_attempts: 3,
            ..IngestPolicy::default()
        };
        let start = tokio::time::Instant::now();
        let outcome = await_ingest(&server, "https://new.example/rss", policy).await;
        assert_eq!(
            outcome,
            IngestOutcome::TimedOut {
                attempts: 3,
                feed_id: Some(5)
            }
        );
        // 0.5s + 1s + 2s of sleeping
        assert_eq!(start.elapsed(), Duration::from_millis(3500));
    }

    #[test]
    fn test_urls_match_ignores_trailing_slash() {
        assert!(urls_match("https://a.example/rss/", "https://a.example/rss"));
        assert!(urls_match(" https://a.example/rss", "https://a.example/rss"));
        assert!(!urls_match("https://a.example/atom", "https://a.example/rss"));
    }
}
