//! Integration tests for the coordinator: selection, paging, add, delete and
//! theme persistence.
//!
//! Each test drives an `App` against an in-memory API that paginates like the
//! real server and records every call it receives. Time is paused, so the
//! ingest poll and artificial latency cost nothing.

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, TimeZone, Utc};
use feedview::api::{ApiError, FeedApi, IngestPolicy};
use feedview::app::{App, AppEvent, ClickTarget, Focus, Settings};
use feedview::model::{Feed, FeedId, Item, ItemPage, ItemQuery};
use feedview::prefs::PreferenceStore;
use feedview::presentation::Opener;
use feedview::theme::ThemeVariant;
use feedview::view_state::ViewMode;
use pretty_assertions::assert_eq;
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq)]
enum Call {
    ListFeeds,
    CreateFeed(String),
    DeleteFeed(FeedId),
    ListItems(ItemQuery),
}

#[derive(Default)]
struct MemoryState {
    feeds: Vec<Feed>,
    /// Newest first, as the server orders them.
    items: Vec<Item>,
    calls: Vec<Call>,
    /// Item requests for this page are delayed.
    slow_page: Option<u32>,
    /// Newly created feeds stay empty.
    stall_ingest: bool,
}

#[derive(Default)]
struct MemoryApi {
    state: Mutex<MemoryState>,
}

impl MemoryApi {
    fn with_feeds(counts: &[(FeedId, usize)]) -> Self {
        let api = Self::default();
        {
            let mut state = api.state.lock().unwrap();
            for &(feed_id, count) in counts {
                state.feeds.push(feed(feed_id));
                add_items(&mut state.items, feed_id, count);
            }
            sort_newest_first(&mut state.items);
        }
        api
    }

    fn call_count(&self) -> usize {
        self.state.lock().unwrap().calls.len()
    }

    fn item_calls(&self) -> Vec<ItemQuery> {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::ListItems(q) => Some(*q),
                _ => None,
            })
            .collect()
    }
}

fn feed(id: FeedId) -> Feed {
    Feed {
        id,
        url: format!("https://feed{id}.example/rss"),
        title: Some(format!("Feed {id}")),
        created_at: None,
    }
}

fn add_items(items: &mut Vec<Item>, feed_id: FeedId, count: usize) {
    let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    let start = items.len() as i64;
    for n in 0..count as i64 {
        let id = start + n + 1;
        items.push(Item {
            id,
            feed_id,
            title: format!("Item {id}"),
            link: format!("https://feed{feed_id}.example/posts/{id}"),
            description: format!("<p>Body of item {id}</p>"),
            content: None,
            published_at: base - ChronoDuration::minutes(id),
            guid: Some(format!("guid-{id}")),
        });
    }
}

fn sort_newest_first(items: &mut [Item]) {
    items.sort_by(|a, b| b.published_at.cmp(&a.published_at).then(a.id.cmp(&b.id)));
}

#[async_trait]
impl FeedApi for MemoryApi {
    async fn list_feeds(&self) -> Result<Vec<Feed>, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::ListFeeds);
        Ok(state.feeds.clone())
    }

    async fn create_feed(&self, url: &str) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::CreateFeed(url.to_string()));
        if url.contains("invalid") {
            return Err(ApiError::HttpStatus(422));
        }
        let id = state.feeds.iter().map(|f| f.id).max().unwrap_or(0) + 1;
        state.feeds.push(Feed {
            id,
            url: url.to_string(),
            title: None,
            created_at: None,
        });
        if !state.stall_ingest {
            add_items(&mut state.items, id, 3);
            sort_newest_first(&mut state.items);
        }
        Ok(())
    }

    async fn delete_feed(&self, id: FeedId) -> Result<(), ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(Call::DeleteFeed(id));
        if !state.feeds.iter().any(|f| f.id == id) {
            return Err(ApiError::HttpStatus(404));
        }
        state.feeds.retain(|f| f.id != id);
        state.items.retain(|i| i.feed_id != id);
        Ok(())
    }

    async fn list_items(&self, query: ItemQuery) -> Result<ItemPage, ApiError> {
        let (page, delay) = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(Call::ListItems(query));
            let matching: Vec<&Item> = state
                .items
                .iter()
                .filter(|i| query.feed_id.map_or(true, |id| i.feed_id == id))
                .collect();
            let skip = (query.page.saturating_sub(1) * query.page_size) as usize;
            let page = ItemPage {
                items: matching
                    .iter()
                    .skip(skip)
                    .take(query.page_size as usize)
                    .map(|i| (*i).clone())
                    .collect(),
                total_count: matching.len() as u64,
            };
            let delay = (state.slow_page == Some(query.page)).then(|| Duration::from_millis(500));
            (page, delay)
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(page)
    }
}

#[derive(Default)]
struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl Opener for RecordingOpener {
    fn open(&self, link: &str) -> anyhow::Result<()> {
        self.opened.lock().unwrap().push(link.to_string());
        Ok(())
    }
}

struct Harness {
    app: App,
    rx: mpsc::Receiver<AppEvent>,
    api: Arc<MemoryApi>,
    opener: Arc<RecordingOpener>,
    dir: TempDir,
}

fn settings() -> Settings {
    Settings {
        page_size: 12,
        view_mode: ViewMode::Grid,
        default_theme: ThemeVariant::Dark,
        ingest: IngestPolicy {
            max_attempts: 3,
            initial_delay: Duration::from_millis(50),
            max_delay: Duration::from_millis(200),
        },
    }
}

fn harness(api: MemoryApi) -> Harness {
    let dir = TempDir::new().unwrap();
    let api = Arc::new(api);
    let opener = Arc::new(RecordingOpener::default());
    let (tx, rx) = mpsc::channel(32);
    let prefs = PreferenceStore::open(dir.path().join("state.json")).unwrap();
    let app = App::new(api.clone(), tx, settings(), prefs).with_opener(opener.clone());
    Harness {
        app,
        rx,
        api,
        opener,
        dir,
    }
}

impl Harness {
    /// Apply background results until nothing arrives for a while.
    async fn settle(&mut self) {
        while let Ok(Some(event)) =
            tokio::time::timeout(Duration::from_secs(5), self.rx.recv()).await
        {
            self.app.handle_event(event);
        }
    }

    async fn started(api: MemoryApi) -> Self {
        let mut h = harness(api);
        h.app.start();
        h.settle().await;
        h
    }
}

// ============================================================================
// Mount and selection
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_start_fetches_feeds_and_first_page_once() {
    let h = Harness::started(MemoryApi::with_feeds(&[(1, 20), (2, 25)])).await;

    let calls = h.api.state.lock().unwrap().calls.clone();
    assert_eq!(calls.iter().filter(|c| **c == Call::ListFeeds).count(), 1);
    assert_eq!(
        h.api.item_calls(),
        vec![ItemQuery {
            page: 1,
            page_size: 12,
            feed_id: None
        }]
    );
    assert_eq!(h.app.feeds.len(), 2);
    assert_eq!(h.app.items.len(), 12);
    assert_eq!(h.app.view.total_count, 45);
    assert_eq!(h.app.view.total_pages(), 4);
    assert!(!h.app.loading);
}

#[tokio::test(start_paused = true)]
async fn test_select_then_page_requests_page_one_first() {
    let mut h = Harness::started(MemoryApi::with_feeds(&[(1, 20), (2, 25)])).await;

    h.app.select_feed(Some(2));
    h.app.set_page(2);
    h.settle().await;

    let calls = h.api.item_calls();
    let first_filtered = calls.iter().position(|q| q.feed_id == Some(2)).unwrap();
    assert_eq!(calls[first_filtered].page, 1);
    assert_eq!(
        calls[first_filtered + 1],
        ItemQuery {
            page: 2,
            page_size: 12,
            feed_id: Some(2)
        }
    );
    assert_eq!(h.app.view.current_page, 2);
    assert!(h.app.items.iter().all(|i| i.feed_id == 2));
}

#[tokio::test(start_paused = true)]
async fn test_stale_page_never_overwrites_newer_request() {
    let mut h = Harness::started(MemoryApi::with_feeds(&[(1, 20), (2, 25)])).await;
    h.api.state.lock().unwrap().slow_page = Some(1);

    // Page 1 of feed 1 is slow; page 2 is requested right after and wins
    h.app.select_feed(Some(1));
    h.app.set_page(2);
    h.settle().await;

    assert_eq!(h.app.view.current_page, 2);
    assert_eq!(h.app.view.total_count, 20);
    assert_eq!(h.app.items.len(), 8);
    assert!(h.app.items.iter().all(|i| i.feed_id == 1));
    assert!(!h.app.loading);
}

// ============================================================================
// Paging
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_paging_covers_collection_exactly_once() {
    let mut h = Harness::started(MemoryApi::with_feeds(&[(1, 20), (2, 25)])).await;

    let mut seen = Vec::new();
    loop {
        assert!(h.app.items.len() <= 12);
        seen.extend(h.app.items.iter().map(|i| i.id));
        if !h.app.view.has_next() {
            break;
        }
        h.app.next_page();
        h.settle().await;
    }

    let unique: HashSet<_> = seen.iter().copied().collect();
    assert_eq!(seen.len(), 45);
    assert_eq!(unique.len(), 45);
    assert_eq!(h.app.view.current_page, 4);
    assert!(!h.app.view.has_next());
}

#[tokio::test(start_paused = true)]
async fn test_shrunk_collection_moves_to_last_page() {
    let mut h = Harness::started(MemoryApi::with_feeds(&[(1, 20), (2, 25)])).await;
    h.app.set_page(4);
    h.settle().await;
    assert_eq!(h.app.items.len(), 9);

    h.api.state.lock().unwrap().items.truncate(20);
    h.app.refresh();
    h.settle().await;

    assert_eq!(
        h.api.item_calls().last(),
        Some(&ItemQuery {
            page: 2,
            page_size: 12,
            feed_id: None
        })
    );
    assert_eq!(h.app.view.current_page, 2);
    assert_eq!(h.app.view.total_pages(), 2);
    assert_eq!(h.app.items.len(), 8);
    assert_eq!(h.app.view.page_window(), 1..=2);
    assert!(!h.app.loading);
}

#[tokio::test(start_paused = true)]
async fn test_prev_at_first_page_does_not_fetch() {
    let mut h = Harness::started(MemoryApi::with_feeds(&[(1, 5)])).await;
    h.app.prev_page();
    h.app.next_page();
    h.settle().await;
    assert_eq!(h.api.item_calls().len(), 1);
}

// ============================================================================
// Add feed
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_add_feed_refetches_and_polls_until_ready() {
    let mut h = Harness::started(MemoryApi::with_feeds(&[(1, 4)])).await;

    h.app.add_feed("https://new.example/rss".to_string());
    h.settle().await;

    assert_eq!(h.app.feeds.len(), 2);
    assert_eq!(h.app.feeds[1].display_title(), "https://new.example/rss");
    assert_eq!(h.app.view.total_count, 7);
    assert!(h.app.alert.is_none());
    let status = h.app.status_message.as_ref().map(|(m, _)| m.to_string());
    assert_eq!(status.as_deref(), Some("New feed ready: 3 articles"));
}

#[tokio::test(start_paused = true)]
async fn test_add_feed_refetches_when_ingest_times_out() {
    let mut h = Harness::started(MemoryApi::with_feeds(&[(1, 4)])).await;
    h.api.state.lock().unwrap().stall_ingest = true;

    h.app.add_feed("https://quiet.example/rss".to_string());
    h.settle().await;

    let calls = h.api.state.lock().unwrap().calls.clone();
    let last_poll = calls
        .iter()
        .rposition(|c| matches!(c, Call::ListItems(q) if q.feed_id == Some(2)))
        .unwrap();
    let after_poll = &calls[last_poll + 1..];
    assert!(after_poll.contains(&Call::ListFeeds));
    assert!(after_poll.iter().any(|c| matches!(
        c,
        Call::ListItems(q) if q.feed_id.is_none() && q.page == 1
    )));

    assert_eq!(h.app.feeds.len(), 2);
    assert_eq!(h.app.view.total_count, 4);
    assert!(h.app.alert.is_none());
    let status = h.app.status_message.as_ref().map(|(m, _)| m.to_string());
    assert_eq!(
        status.as_deref(),
        Some("Feed added; articles may take a while to appear")
    );
}

#[tokio::test(start_paused = true)]
async fn test_dropping_app_stops_ingest_poll() {
    let mut h = Harness::started(MemoryApi::with_feeds(&[(1, 4)])).await;
    h.api.state.lock().unwrap().stall_ingest = true;

    h.app.add_feed("https://quiet.example/rss".to_string());
    let created = h.rx.recv().await.unwrap();
    assert!(matches!(created, AppEvent::FeedCreated { .. }));
    h.app.handle_event(created);

    // First attempt fires after 50ms
    tokio::time::sleep(Duration::from_millis(60)).await;
    assert!(h
        .api
        .item_calls()
        .iter()
        .any(|q| q.feed_id == Some(2) && q.page_size == 1));

    let Harness { app, rx, api, .. } = h;
    let before = api.call_count();
    drop(app);
    tokio::time::sleep(Duration::from_secs(5)).await;

    assert_eq!(api.call_count(), before);
    drop(rx);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_feed_raises_alert() {
    let mut h = Harness::started(MemoryApi::with_feeds(&[(1, 4)])).await;

    h.app.add_feed("https://invalid.example/rss".to_string());
    h.settle().await;

    let alert = h.app.alert.clone().unwrap();
    assert_eq!(alert.title, "Failed to add feed");
    assert_eq!(h.app.feeds.len(), 1);
}

// ============================================================================
// Delete feed
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_deleting_selected_feed_clears_selection() {
    let mut h = Harness::started(MemoryApi::with_feeds(&[(1, 20), (2, 25)])).await;

    h.app.select_feed(Some(2));
    h.settle().await;
    h.app.request_delete(2);
    h.app.confirm_pending();
    h.settle().await;

    assert_eq!(h.app.view.selected_feed_id, None);
    assert_eq!(h.app.view.current_page, 1);
    assert!(h.app.feeds.iter().all(|f| f.id != 2));
    assert!(h.app.sidebar_rows().iter().all(|r| r.target != Some(2)));
    assert_eq!(h.app.view.total_count, 20);
    assert_eq!(
        h.api.item_calls().last(),
        Some(&ItemQuery {
            page: 1,
            page_size: 12,
            feed_id: None
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_unconfirmed_delete_sends_nothing() {
    let mut h = Harness::started(MemoryApi::with_feeds(&[(1, 2)])).await;

    h.app.select_feed(Some(1));
    h.settle().await;
    h.app.request_delete(1);
    h.app.cancel_pending();
    h.settle().await;

    let calls = h.api.state.lock().unwrap().calls.clone();
    assert!(!calls.iter().any(|c| matches!(c, Call::DeleteFeed(_))));
    assert_eq!(h.app.feeds.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_failed_delete_raises_alert() {
    let mut h = Harness::started(MemoryApi::with_feeds(&[(1, 2)])).await;

    h.app.select_feed(Some(1));
    h.settle().await;
    h.api.state.lock().unwrap().feeds.clear();
    h.app.request_delete(1);
    h.app.confirm_pending();
    h.settle().await;

    assert_eq!(h.app.alert.as_ref().unwrap().title, "Failed to delete feed");
}

// ============================================================================
// Opening and theme
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_title_click_opens_article_once() {
    let mut h = Harness::started(MemoryApi::with_feeds(&[(1, 3)])).await;
    let link = h.app.items[1].link.clone();

    h.app.click(&[
        ClickTarget::ArticleTitle(1),
        ClickTarget::Article(1),
        ClickTarget::Panel(Focus::Articles),
    ]);

    assert_eq!(*h.opener.opened.lock().unwrap(), vec![link]);
}

#[tokio::test(start_paused = true)]
async fn test_theme_survives_reload() {
    let mut h = Harness::started(MemoryApi::with_feeds(&[(1, 1)])).await;
    assert_eq!(h.app.view.theme, ThemeVariant::Dark);
    h.app.toggle_theme();

    let state_path = h.dir.path().join("state.json");
    let (tx, _rx) = mpsc::channel(32);
    let prefs = PreferenceStore::open(&state_path).unwrap();
    let reloaded = App::new(h.api.clone(), tx, settings(), prefs);

    assert_eq!(reloaded.view.theme, ThemeVariant::Light);
}
