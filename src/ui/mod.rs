//! Terminal User Interface module.
//!
//! - `loop_runner` - main event loop and terminal management
//! - `input` - keyboard and mouse dispatch
//! - `render` - screen layout and overlays
//! - `feeds` - sidebar panel (feed list and add form)
//! - `articles` - article grid and list
//! - `pager` - page-number row
//! - `help` - keybinding overlay
//! - `status` - status bar

mod articles;
mod feeds;
mod help;
mod input;
mod loop_runner;
mod pager;
mod render;
mod status;

pub use loop_runner::{run, Action};
