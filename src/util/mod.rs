//! Small helpers shared by the presentation and UI layers.
//!
//! - **Text**: display-width aware truncation and terminal sanitization
//! - **Links**: scheme checks before anything is opened externally

mod text;
mod url_validator;

pub use text::{display_width, fit_width, strip_control_chars, truncate_to_width};
pub use url_validator::{validate_link, LinkError};
