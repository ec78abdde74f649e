use thiserror::Error;
use url::Url;

/// Reasons a link is refused before being handed to the system opener.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LinkError {
    #[error("Empty link")]
    Empty,
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    /// Article links come from arbitrary feeds; only web pages are opened.
    #[error("Unsupported scheme: {0} (only http/https allowed)")]
    UnsupportedScheme(String),
    #[error("URL has no host")]
    MissingHost,
}

/// Check an article link before opening it externally.
///
/// Accepts absolute `http`/`https` URLs with a host. Anything else
/// (`file://`, `javascript:`, relative paths) is refused.
///
/// ```
/// use feedview::util::validate_link;
///
/// assert!(validate_link("https://example.com/post/1").is_ok());
/// assert!(validate_link("file:///etc/passwd").is_err());
/// ```
pub fn validate_link(link: &str) -> Result<Url, LinkError> {
    let link = link.trim();
    if link.is_empty() {
        return Err(LinkError::Empty);
    }

    let url = Url::parse(link)?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(LinkError::UnsupportedScheme(scheme.to_owned())),
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(LinkError::MissingHost);
    }
    Ok(url)
}
