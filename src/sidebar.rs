//! Feed navigation state: the add-feed form and the row model.
//!
//! The sidebar knows nothing about items. Selecting, adding and deleting are
//! reported to the coordinator, which owns the feed list and the selection.

use crate::model::{Feed, FeedId};
use crate::util::strip_control_chars;

/// Longest URL accepted into the add-feed input.
pub const MAX_URL_INPUT: usize = 2048;

pub const ALL_ARTICLES_LABEL: &str = "All Articles";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SidebarState {
    /// Add-feed form visible.
    pub adding: bool,
    pub url_input: String,
}

impl SidebarState {
    pub fn toggle_form(&mut self) {
        self.adding = !self.adding;
    }

    pub fn push_char(&mut self, c: char) {
        if !c.is_control() && self.url_input.chars().count() < MAX_URL_INPUT {
            self.url_input.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        self.url_input.pop();
    }

    /// Close the form and discard what was typed.
    pub fn cancel(&mut self) {
        self.adding = false;
        self.url_input.clear();
    }

    /// Take the typed URL for the add-feed handler.
    ///
    /// Blank input is a no-op: the form stays open and `None` is returned.
    /// Otherwise the form is reset and hidden.
    pub fn submit(&mut self) -> Option<String> {
        let url = self.url_input.trim();
        if url.is_empty() {
            return None;
        }
        let url = url.to_string();
        self.cancel();
        Some(url)
    }
}

/// One selectable row: "All Articles" or a feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SidebarRow {
    /// Selection this row stands for (`None` is "All Articles").
    pub target: Option<FeedId>,
    pub label: String,
    /// Matches the current selection.
    pub selected: bool,
    /// The delete control is offered on this row.
    pub deletable: bool,
}

/// Rows in display order: "All Articles" first, then feeds as listed.
pub fn rows(feeds: &[Feed], selected: Option<FeedId>) -> Vec<SidebarRow> {
    let mut out = Vec::with_capacity(feeds.len() + 1);
    out.push(SidebarRow {
        target: None,
        label: ALL_ARTICLES_LABEL.to_string(),
        selected: selected.is_none(),
        deletable: false,
    });
    out.extend(feeds.iter().map(|feed| {
        let is_selected = selected == Some(feed.id);
        SidebarRow {
            target: Some(feed.id),
            label: strip_control_chars(feed.display_title()).into_owned(),
            selected: is_selected,
            deletable: can_delete(feed.id, selected),
        }
    }));
    out
}

/// Deletion is only offered on the feed that is currently selected.
pub fn can_delete(feed_id: FeedId, selected: Option<FeedId>) -> bool {
    selected == Some(feed_id)
}
