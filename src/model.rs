//! Wire types shared with the feed API.
//!
//! The server owns every record; the client only holds transient copies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Feed identifier as assigned by the server.
pub type FeedId = i64;

/// A subscribed RSS/Atom source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feed {
    pub id: FeedId,
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Feed {
    /// Title for display. Falls back to the URL when the server has not
    /// resolved a title yet (absent or blank).
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(t) if !t.trim().is_empty() => t,
            _ => &self.url,
        }
    }
}

/// A single article ingested by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: i64,
    pub feed_id: FeedId,
    pub title: String,
    pub link: String,
    /// HTML fragment.
    #[serde(default)]
    pub description: String,
    /// HTML body, when the feed carries full content.
    #[serde(default)]
    pub content: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guid: Option<String>,
}

/// One page of the server's item collection.
///
/// The server also echoes `page` and `page_size`; they are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemPage {
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub total_count: u64,
}

impl ItemPage {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Parameters for one `GET /items` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemQuery {
    pub page: u32,
    pub page_size: u32,
    pub feed_id: Option<FeedId>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(title: Option<&str>) -> Feed {
        Feed {
            id: 1,
            url: "https://example.com/rss".to_string(),
            title: title.map(str::to_string),
            created_at: None,
        }
    }

    #[test]
    fn display_title_prefers_title() {
        assert_eq!(feed(Some("Example")).display_title(), "Example");
    }

    #[test]
    fn display_title_falls_back_to_url() {
        assert_eq!(feed(None).display_title(), "https://example.com/rss");
        assert_eq!(feed(Some("  ")).display_title(), "https://example.com/rss");
    }

    #[test]
    fn feed_accepts_server_shape() {
        let json = r#"{"id":3,"url":"https://a.example/feed","title":"","created_at":"2024-05-01T10:00:00Z"}"#;
        let feed: Feed = serde_json::from_str(json).unwrap();
        assert_eq!(feed.id, 3);
        assert_eq!(feed.display_title(), "https://a.example/feed");
        assert!(feed.created_at.is_some());
    }

    #[test]
    fn item_page_tolerates_extra_and_missing_fields() {
        let json = r#"{"page":2,"page_size":12,"total_count":45}"#;
        let page: ItemPage = serde_json::from_str(json).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 45);
    }

    #[test]
    fn item_without_content_deserializes() {
        let json = r#"{
            "id": 9, "feed_id": 3, "title": "Hello", "link": "https://a.example/1",
            "description": "<p>Hi</p>", "published_at": "2024-05-01T10:00:00Z", "guid": "g-9"
        }"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.content, None);
        assert_eq!(item.guid.as_deref(), Some("g-9"));
    }
}
