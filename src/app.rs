//! Application state and the view-state coordinator.
//!
//! `App` owns everything the UI shows. User actions update the `ViewState`
//! and spawn fetches; results come back as `AppEvent`s on the channel and are
//! applied by `handle_event`. All mutation happens on the UI task.

use crate::api::{ApiError, FeedApi, IngestOutcome, IngestPolicy};
use crate::keybindings::KeybindingRegistry;
use crate::model::{Feed, FeedId, Item, ItemPage, ItemQuery};
use crate::prefs::PreferenceStore;
use crate::presentation::{Opener, Propagation, SystemOpener};
use crate::sidebar::{self, SidebarRow, SidebarState};
use crate::tasks;
use crate::theme::{StyleMap, ThemeVariant};
use crate::view_state::{ViewMode, ViewState};
use ratatui::layout::{Position, Rect};
use ratatui::style::Style;
use std::borrow::Cow;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// How long a status message stays visible.
const STATUS_TTL_SECS: u64 = 3;

/// Number of frames in the loading spinner animation.
pub const SPINNER_FRAMES: usize = 10;

// ============================================================================
// Events and UI state types
// ============================================================================

/// Results from background tasks.
#[derive(Debug)]
pub enum AppEvent {
    FeedsLoaded {
        seq: u64,
        result: Result<Vec<Feed>, ApiError>,
    },
    ItemsLoaded {
        seq: u64,
        query: ItemQuery,
        result: Result<ItemPage, ApiError>,
    },
    FeedCreated {
        url: String,
        result: Result<(), ApiError>,
    },
    FeedDeleted {
        feed_id: FeedId,
        result: Result<(), ApiError>,
    },
    /// The post-add poll finished, successfully or not.
    IngestSettled { url: String, outcome: IngestOutcome },
    TaskPanicked { task: &'static str, error: String },
}

/// Which panel has keyboard focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Articles,
}

/// Pending confirmation for a destructive operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmAction {
    DeleteFeed { feed_id: FeedId, title: String },
}

impl ConfirmAction {
    pub fn prompt(&self) -> String {
        match self {
            Self::DeleteFeed { title, .. } => format!(
                "Delete \"{}\"? All associated articles will also be removed.",
                title
            ),
        }
    }
}

/// Blocking error dialog. Any key dismisses it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub title: Cow<'static, str>,
    pub detail: String,
}

/// Something on screen that reacts to a mouse click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    /// A panel background; clicking focuses it.
    Panel(Focus),
    /// "All Articles" (`None`) or a feed row.
    SidebarRow(Option<FeedId>),
    SidebarDelete(FeedId),
    AddFeedButton,
    /// A whole card or list row.
    Article(usize),
    ArticleTitle(usize),
    ArticleOpen(usize),
    PrevPage,
    NextPage,
    Page(u32),
    ViewToggle,
    ThemeToggle,
}

/// Screen rectangle recorded during render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRegion {
    pub area: Rect,
    pub target: ClickTarget,
}

/// Startup settings resolved from config and CLI.
#[derive(Debug, Clone)]
pub struct Settings {
    pub page_size: u32,
    pub view_mode: ViewMode,
    /// Used when no theme has been persisted yet.
    pub default_theme: ThemeVariant,
    pub ingest: IngestPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            page_size: crate::config::DEFAULT_PAGE_SIZE,
            view_mode: ViewMode::Grid,
            default_theme: ThemeVariant::Dark,
            ingest: IngestPolicy::default(),
        }
    }
}

// ============================================================================
// Application State
// ============================================================================

pub struct App {
    api: Arc<dyn FeedApi>,
    event_tx: mpsc::Sender<AppEvent>,
    opener: Arc<dyn Opener>,
    prefs: PreferenceStore,
    ingest_policy: IngestPolicy,

    pub view: ViewState,
    /// Active style map, rebuilt when the theme toggles.
    pub theme: StyleMap,
    pub keybindings: KeybindingRegistry,

    /// Feed list wrapped in Arc so render can hold it cheaply.
    pub feeds: Arc<Vec<Feed>>,
    /// Items of the current page.
    pub items: Arc<Vec<Item>>,
    /// An item fetch is outstanding.
    pub loading: bool,

    pub focus: Focus,
    pub sidebar: SidebarState,
    /// Row index into `sidebar_rows()`.
    pub sidebar_cursor: usize,
    pub article_cursor: usize,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub pending_confirm: Option<ConfirmAction>,
    pub alert: Option<Alert>,
    pub show_help: bool,

    /// Clickable regions from the last render, outermost first.
    pub hit_regions: Vec<HitRegion>,
    pub needs_redraw: bool,
    pub spinner_frame: usize,

    feed_seq: u64,
    item_seq: u64,
    ingest_handles: Vec<JoinHandle<()>>,
}

impl App {
    /// Build the app. The persisted theme, if any, wins over
    /// `settings.default_theme`. Nothing is fetched until `start`.
    pub fn new(
        api: Arc<dyn FeedApi>,
        event_tx: mpsc::Sender<AppEvent>,
        settings: Settings,
        prefs: PreferenceStore,
    ) -> Self {
        let theme = prefs.theme().unwrap_or(settings.default_theme);
        Self {
            api,
            event_tx,
            opener: Arc::new(SystemOpener),
            prefs,
            ingest_policy: settings.ingest,
            view: ViewState::new(settings.page_size, settings.view_mode, theme),
            theme: StyleMap::for_variant(theme),
            keybindings: KeybindingRegistry::new(),
            feeds: Arc::new(Vec::new()),
            items: Arc::new(Vec::new()),
            loading: false,
            focus: Focus::Sidebar,
            sidebar: SidebarState::default(),
            sidebar_cursor: 0,
            article_cursor: 0,
            status_message: None,
            pending_confirm: None,
            alert: None,
            show_help: false,
            hit_regions: Vec::new(),
            needs_redraw: true,
            spinner_frame: 0,
            feed_seq: 0,
            item_seq: 0,
            ingest_handles: Vec::new(),
        }
    }

    pub fn with_opener(mut self, opener: Arc<dyn Opener>) -> Self {
        self.opener = opener;
        self
    }

    pub fn with_keybindings(mut self, keybindings: KeybindingRegistry) -> Self {
        self.keybindings = keybindings;
        self
    }

    /// Look up a theme role.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    // ========================================================================
    // Fetching
    // ========================================================================

    /// Initial load: the feed list and the first item page, once each.
    pub fn start(&mut self) {
        self.request_feeds();
        self.request_items();
    }

    /// Refetch the feed list. Earlier outstanding feed requests become stale.
    pub fn request_feeds(&mut self) {
        self.feed_seq += 1;
        tracing::debug!(seq = self.feed_seq, "Requesting feeds");
        tasks::spawn_feeds_fetch(Arc::clone(&self.api), self.feed_seq, self.event_tx.clone());
    }

    /// Refetch the item page for the current view. Earlier outstanding item
    /// requests become stale.
    pub fn request_items(&mut self) {
        self.item_seq += 1;
        self.loading = true;
        let query = self.view.item_query();
        tracing::debug!(
            seq = self.item_seq,
            page = query.page,
            feed_id = ?query.feed_id,
            "Requesting items"
        );
        tasks::spawn_items_fetch(
            Arc::clone(&self.api),
            self.item_seq,
            query,
            self.event_tx.clone(),
        );
        self.needs_redraw = true;
    }

    /// Reload feeds and the current page.
    pub fn refresh(&mut self) {
        self.request_feeds();
        self.request_items();
        self.set_status("Refreshing...");
    }

    // ========================================================================
    // View-state transitions
    // ========================================================================

    /// Filter by `feed_id` (`None` for all). A new selection starts at page 1
    /// and fetches; re-selecting the current one does nothing.
    pub fn select_feed(&mut self, feed_id: Option<FeedId>) {
        if self.view.select_feed(feed_id) {
            self.article_cursor = 0;
            self.request_items();
        }
        self.sync_sidebar_cursor();
    }

    /// Jump to `page` (clamped). Fetches only if the page changed.
    pub fn set_page(&mut self, page: u32) {
        if self.view.set_page(page) {
            self.article_cursor = 0;
            self.request_items();
        }
    }

    pub fn next_page(&mut self) {
        if self.view.next_page() {
            self.article_cursor = 0;
            self.request_items();
        }
    }

    pub fn prev_page(&mut self) {
        if self.view.prev_page() {
            self.article_cursor = 0;
            self.request_items();
        }
    }

    pub fn toggle_view_mode(&mut self) {
        let mode = self.view.toggle_view_mode();
        self.set_status(format!("{} view", mode.name()));
    }

    /// Flip the theme, restyle, and persist the choice.
    pub fn toggle_theme(&mut self) {
        let theme = self.view.toggle_theme();
        self.theme = StyleMap::for_variant(theme);
        match self.prefs.save_theme(theme) {
            Ok(()) => self.set_status(format!("Theme: {}", theme.name())),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to persist theme");
                self.set_status(format!("Theme: {} (not saved)", theme.name()));
            }
        }
    }

    // ========================================================================
    // Feed mutations
    // ========================================================================

    /// Subscribe to `url`. Outcome arrives as `AppEvent::FeedCreated`.
    pub fn add_feed(&mut self, url: String) {
        tracing::info!(feed_url = %url, "Adding feed");
        self.set_status("Adding feed...");
        tasks::spawn_create_feed(Arc::clone(&self.api), url, self.event_tx.clone());
    }

    /// Submit the sidebar form. Blank input keeps the form open.
    pub fn submit_add_feed(&mut self) {
        if let Some(url) = self.sidebar.submit() {
            self.add_feed(url);
        }
    }

    /// Ask for confirmation before deleting `feed_id`. Only the selected feed
    /// can be deleted.
    pub fn request_delete(&mut self, feed_id: FeedId) {
        if !sidebar::can_delete(feed_id, self.view.selected_feed_id) {
            self.set_status("Select a feed to delete it");
            return;
        }
        let title = self
            .feeds
            .iter()
            .find(|f| f.id == feed_id)
            .map(|f| f.display_title().to_string())
            .unwrap_or_else(|| format!("feed {feed_id}"));
        self.pending_confirm = Some(ConfirmAction::DeleteFeed { feed_id, title });
    }

    /// Carry out the pending confirmation, if any.
    pub fn confirm_pending(&mut self) {
        match self.pending_confirm.take() {
            Some(ConfirmAction::DeleteFeed { feed_id, title }) => {
                tracing::info!(feed_id, title = %title, "Deleting feed");
                self.set_status(format!("Deleting {}...", title));
                tasks::spawn_delete_feed(Arc::clone(&self.api), feed_id, self.event_tx.clone());
            }
            None => {}
        }
    }

    pub fn cancel_pending(&mut self) {
        if self.pending_confirm.take().is_some() {
            self.set_status("Cancelled");
        }
    }

    // ========================================================================
    // Articles
    // ========================================================================

    pub fn selected_article(&self) -> Option<&Item> {
        self.items.get(self.article_cursor)
    }

    /// Open the article at `index` externally.
    pub fn open_article(&mut self, index: usize) {
        let Some(item) = self.items.get(index) else {
            return;
        };
        let link = item.link.clone();
        match self.opener.open(&link) {
            Ok(()) => self.set_status("Opened in browser"),
            Err(e) => {
                tracing::warn!(link = %link, error = %e, "Failed to open article");
                self.set_status(format!("Cannot open link: {}", e));
            }
        }
    }

    // ========================================================================
    // Clicks
    // ========================================================================

    /// Targets under `(column, row)`, innermost first.
    pub fn click_path_at(&self, column: u16, row: u16) -> Vec<ClickTarget> {
        let point = Position::new(column, row);
        self.hit_regions
            .iter()
            .rev()
            .filter(|r| r.area.contains(point))
            .map(|r| r.target)
            .collect()
    }

    /// Dispatch a click along `path` (innermost first) until a handler stops
    /// propagation.
    pub fn click(&mut self, path: &[ClickTarget]) {
        for &target in path {
            if self.handle_click(target) == Propagation::Stop {
                break;
            }
        }
    }

    fn handle_click(&mut self, target: ClickTarget) -> Propagation {
        match target {
            ClickTarget::Panel(focus) => {
                self.focus = focus;
                Propagation::Continue
            }
            ClickTarget::SidebarRow(feed_id) => {
                self.focus = Focus::Sidebar;
                self.select_feed(feed_id);
                Propagation::Continue
            }
            ClickTarget::SidebarDelete(feed_id) => {
                self.request_delete(feed_id);
                Propagation::Stop
            }
            ClickTarget::AddFeedButton => {
                self.sidebar.toggle_form();
                Propagation::Stop
            }
            ClickTarget::ArticleTitle(index) | ClickTarget::ArticleOpen(index) => {
                self.article_cursor = index;
                self.open_article(index);
                Propagation::Stop
            }
            ClickTarget::Article(index) => {
                self.focus = Focus::Articles;
                self.article_cursor = index;
                self.open_article(index);
                Propagation::Continue
            }
            ClickTarget::PrevPage => {
                self.prev_page();
                Propagation::Stop
            }
            ClickTarget::NextPage => {
                self.next_page();
                Propagation::Stop
            }
            ClickTarget::Page(page) => {
                self.set_page(page);
                Propagation::Stop
            }
            ClickTarget::ViewToggle => {
                self.toggle_view_mode();
                Propagation::Stop
            }
            ClickTarget::ThemeToggle => {
                self.toggle_theme();
                Propagation::Stop
            }
        }
    }

    // ========================================================================
    // Sidebar
    // ========================================================================

    pub fn sidebar_rows(&self) -> Vec<SidebarRow> {
        sidebar::rows(&self.feeds, self.view.selected_feed_id)
    }

    fn sync_sidebar_cursor(&mut self) {
        let selected = self.view.selected_feed_id;
        self.sidebar_cursor = match selected {
            None => 0,
            Some(id) => self
                .feeds
                .iter()
                .position(|f| f.id == id)
                .map_or(0, |i| i + 1),
        };
    }

    pub fn nav_down(&mut self) {
        match self.focus {
            Focus::Sidebar => {
                // Row 0 is "All Articles"
                if self.sidebar_cursor < self.feeds.len() {
                    self.sidebar_cursor += 1;
                }
            }
            Focus::Articles => {
                if self.article_cursor + 1 < self.items.len() {
                    self.article_cursor += 1;
                }
            }
        }
    }

    pub fn nav_up(&mut self) {
        match self.focus {
            Focus::Sidebar => self.sidebar_cursor = self.sidebar_cursor.saturating_sub(1),
            Focus::Articles => self.article_cursor = self.article_cursor.saturating_sub(1),
        }
    }

    /// Enter: select the feed under the cursor, or open the article.
    pub fn activate(&mut self) {
        match self.focus {
            Focus::Sidebar => {
                let target = match self.sidebar_cursor {
                    0 => None,
                    n => match self.feeds.get(n - 1) {
                        Some(feed) => Some(feed.id),
                        None => return,
                    },
                };
                self.select_feed(target);
            }
            Focus::Articles => self.open_article(self.article_cursor),
        }
    }

    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Articles,
            Focus::Articles => Focus::Sidebar,
        };
    }

    fn clamp_cursors(&mut self) {
        self.sidebar_cursor = self.sidebar_cursor.min(self.feeds.len());
        self.article_cursor = self
            .article_cursor
            .min(self.items.len().saturating_sub(1));
    }

    // ========================================================================
    // Status, alerts, ticks
    // ========================================================================

    /// Set status message (expires after 3 seconds).
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
        self.needs_redraw = true;
    }

    /// Clear the status message if expired. Returns true if one was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, set_at)) = &self.status_message {
            if set_at.elapsed().as_secs() >= STATUS_TTL_SECS {
                self.status_message = None;
                return true;
            }
        }
        false
    }

    pub fn raise_alert(&mut self, title: impl Into<Cow<'static, str>>, detail: impl Into<String>) {
        self.alert = Some(Alert {
            title: title.into(),
            detail: detail.into(),
        });
        self.needs_redraw = true;
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// 250ms tick: animate the spinner while loading.
    pub fn tick(&mut self) {
        if self.loading {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES;
            self.needs_redraw = true;
        }
    }

    // ========================================================================
    // Background results
    // ========================================================================

    /// Apply one background result.
    pub fn handle_event(&mut self, event: AppEvent) {
        self.needs_redraw = true;
        match event {
            AppEvent::FeedsLoaded { seq, result } => self.apply_feeds(seq, result),
            AppEvent::ItemsLoaded { seq, query, result } => self.apply_items(seq, query, result),
            AppEvent::FeedCreated { url, result } => self.apply_feed_created(url, result),
            AppEvent::FeedDeleted { feed_id, result } => self.apply_feed_deleted(feed_id, result),
            AppEvent::IngestSettled { url, outcome } => self.apply_ingest_settled(url, outcome),
            AppEvent::TaskPanicked { task, error } => {
                tracing::error!(task, error = %error, "Background task panicked");
                if task == "list_items" {
                    self.loading = false;
                }
                self.set_status(format!("Internal error in {}", task));
            }
        }
    }

    fn apply_feeds(&mut self, seq: u64, result: Result<Vec<Feed>, ApiError>) {
        if seq != self.feed_seq {
            tracing::debug!(seq, latest = self.feed_seq, "Discarding stale feed list");
            return;
        }
        match result {
            Ok(feeds) => {
                tracing::debug!(count = feeds.len(), "Feeds loaded");
                self.feeds = Arc::new(feeds);
                self.clamp_cursors();
            }
            Err(e) => {
                // Keep whatever was shown before
                tracing::warn!(error = %e, "Failed to fetch feeds");
            }
        }
    }

    fn apply_items(&mut self, seq: u64, query: ItemQuery, result: Result<ItemPage, ApiError>) {
        if seq != self.item_seq {
            tracing::debug!(
                seq,
                latest = self.item_seq,
                page = query.page,
                "Discarding stale item page"
            );
            return;
        }
        self.loading = false;
        let page = result.unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                page = query.page,
                feed_id = ?query.feed_id,
                "Failed to fetch items"
            );
            ItemPage::empty()
        });
        tracing::debug!(
            count = page.items.len(),
            total_count = page.total_count,
            page = query.page,
            "Items loaded"
        );
        self.view.total_count = page.total_count;
        self.items = Arc::new(page.items);
        self.clamp_cursors();

        // The list shrank under us: fall back to the last page that exists
        let last = self.view.total_pages().max(1);
        if self.view.current_page > last {
            tracing::debug!(page = query.page, last, "Page out of range, moving to last page");
            self.set_page(last);
        }
    }

    fn apply_feed_created(&mut self, url: String, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                tracing::info!(feed_url = %url, "Feed added, waiting for ingestion");
                self.set_status("Feed added, fetching articles...");
                self.request_feeds();
                self.ingest_handles.retain(|h| !h.is_finished());
                self.ingest_handles.push(tasks::spawn_ingest_poll(
                    Arc::clone(&self.api),
                    url,
                    self.ingest_policy,
                    self.event_tx.clone(),
                ));
            }
            Err(e) if e.is_status() => {
                tracing::warn!(feed_url = %url, error = %e, "Server rejected feed");
                self.raise_alert("Failed to add feed", e.to_string());
            }
            Err(e) => {
                tracing::error!(feed_url = %url, error = %e, "Add feed request failed");
                self.raise_alert("Error adding feed", e.to_string());
            }
        }
    }

    fn apply_feed_deleted(&mut self, feed_id: FeedId, result: Result<(), ApiError>) {
        match result {
            Ok(()) => {
                tracing::info!(feed_id, "Feed deleted");
                self.set_status("Feed deleted");
                self.request_feeds();
                if self.view.selected_feed_id == Some(feed_id) {
                    self.select_feed(None);
                } else {
                    self.request_items();
                }
            }
            Err(e) => {
                tracing::error!(feed_id, error = %e, "Delete feed failed");
                self.raise_alert("Failed to delete feed", e.to_string());
            }
        }
    }

    fn apply_ingest_settled(&mut self, url: String, outcome: IngestOutcome) {
        match outcome {
            IngestOutcome::Ready { total_count, .. } => {
                self.set_status(format!("New feed ready: {} articles", total_count));
            }
            IngestOutcome::TimedOut { attempts, .. } => {
                tracing::info!(feed_url = %url, attempts, "Feed still empty after polling");
                self.set_status("Feed added; articles may take a while to appear");
            }
        }
        self.request_feeds();
        self.request_items();
    }
}

impl Drop for App {
    fn drop(&mut self) {
        for handle in self.ingest_handles.drain(..) {
            handle.abort();
        }
    }
}
