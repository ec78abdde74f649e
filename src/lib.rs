//! feedview: a terminal client for a feed aggregation API.
//!
//! The server stores feeds and ingested items; this crate lists feeds in a
//! sidebar, pages through items as a card grid or a compact list, and adds
//! or deletes feeds.

pub mod api;
pub mod app;
pub mod config;
pub mod keybindings;
pub mod model;
pub mod pagination;
pub mod prefs;
pub mod presentation;
pub mod sidebar;
mod tasks;
pub mod theme;
pub mod ui;
pub mod util;
pub mod view_state;
