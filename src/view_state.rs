//! The coordinator's view state as a plain value.
//!
//! Every transition is a method returning whether anything changed, so the
//! caller decides what to refetch and the transitions stay testable without a
//! terminal or a network.

use crate::model::{FeedId, ItemQuery};
use crate::pagination;
use crate::theme::ThemeVariant;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

/// Visual density of the article collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

impl ViewMode {
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "grid" => Some(Self::Grid),
            "list" => Some(Self::List),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Grid => Self::List,
            Self::List => Self::Grid,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Grid => "Grid",
            Self::List => "List",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub selected_feed_id: Option<FeedId>,
    /// 1-based.
    pub current_page: u32,
    /// Fixed for the session.
    pub page_size: u32,
    /// As last reported by the server.
    pub total_count: u64,
    pub view_mode: ViewMode,
    pub theme: ThemeVariant,
}

impl ViewState {
    pub fn new(page_size: u32, view_mode: ViewMode, theme: ThemeVariant) -> Self {
        Self {
            selected_feed_id: None,
            current_page: 1,
            page_size: page_size.max(1),
            total_count: 0,
            view_mode,
            theme,
        }
    }

    /// Change the feed filter. A different selection resets to page 1.
    ///
    /// Returns `true` if the selection changed.
    pub fn select_feed(&mut self, feed_id: Option<FeedId>) -> bool {
        if self.selected_feed_id == feed_id {
            return false;
        }
        self.selected_feed_id = feed_id;
        self.current_page = 1;
        true
    }

    /// Move to `page`, clamped to the known page range.
    ///
    /// Returns `true` if the page changed.
    pub fn set_page(&mut self, page: u32) -> bool {
        let last = self.total_pages().max(1);
        let page = page.clamp(1, last);
        if page == self.current_page {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn next_page(&mut self) -> bool {
        self.has_next() && self.set_page(self.current_page + 1)
    }

    pub fn prev_page(&mut self) -> bool {
        self.has_prev() && self.set_page(self.current_page - 1)
    }

    pub fn total_pages(&self) -> u32 {
        pagination::total_pages(self.total_count, self.page_size)
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages()
    }

    /// Page-number buttons to show in the pager.
    pub fn page_window(&self) -> RangeInclusive<u32> {
        pagination::page_window(self.current_page, self.total_pages())
    }

    pub fn toggle_view_mode(&mut self) -> ViewMode {
        self.view_mode = self.view_mode.toggled();
        self.view_mode
    }

    pub fn toggle_theme(&mut self) -> ThemeVariant {
        self.theme = self.theme.toggled();
        self.theme
    }

    /// The `GET /items` parameters for the current view.
    pub fn item_query(&self) -> ItemQuery {
        ItemQuery {
            page: self.current_page,
            page_size: self.page_size,
            feed_id: self.selected_feed_id,
        }
    }
}
