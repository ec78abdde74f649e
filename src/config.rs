//! Configuration file parser for ~/.config/feedview/config.toml.
//!
//! The config file is optional: a missing or empty file yields
//! `Config::default()`. Unknown keys are accepted but logged as warnings.
use crate::api::{parse_base_url, IngestPolicy, DEFAULT_API_URL};
use crate::theme::ThemeVariant;
use crate::view_state::ViewMode;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable consulted for the API base URL.
pub const API_URL_ENV: &str = "FEEDVIEW_API_URL";
pub const CONFIG_DIR_NAME: &str = "feedview";
pub const CONFIG_FILE_NAME: &str = "config.toml";

pub const DEFAULT_PAGE_SIZE: u32 = 12;
pub const MAX_PAGE_SIZE: u32 = 100;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0} bytes (max {max} bytes)", max = Config::MAX_FILE_SIZE)]
    TooLarge(u64),

    #[error("Invalid API URL: {0}")]
    InvalidApiUrl(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the feed API. CLI flag and env var take precedence.
    pub api_url: Option<String>,

    /// Articles per page, fixed for the session.
    pub page_size: u32,

    /// Initial article layout.
    pub view_mode: ViewMode,

    /// Theme used until the user toggles one (the toggle is persisted
    /// separately and wins on later starts).
    pub theme: ThemeVariant,

    /// Periodic item refetch in seconds. 0 disables it.
    pub auto_refresh_secs: u64,

    pub ingest: IngestConfig,

    /// Keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            page_size: DEFAULT_PAGE_SIZE,
            view_mode: ViewMode::Grid,
            theme: ThemeVariant::Dark,
            auto_refresh_secs: 0,
            ingest: IngestConfig::default(),
            keybindings: HashMap::new(),
        }
    }
}

/// `[ingest]`: how long to wait for a newly added feed's first items.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct IngestConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        let policy = IngestPolicy::default();
        Self {
            max_attempts: policy.max_attempts,
            initial_delay_ms: policy.initial_delay.as_millis() as u64,
            max_delay_ms: policy.max_delay.as_millis() as u64,
        }
    }
}

impl IngestConfig {
    pub fn policy(&self) -> IngestPolicy {
        let initial_delay = Duration::from_millis(self.initial_delay_ms);
        IngestPolicy {
            max_attempts: self.max_attempts,
            initial_delay,
            max_delay: Duration::from_millis(self.max_delay_ms).max(initial_delay),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 7] = [
        "api_url",
        "page_size",
        "view_mode",
        "theme",
        "auto_refresh_secs",
        "ingest",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing or empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line info
    /// - Unknown keys → accepted, logged as warning
    /// - `page_size` outside `1..=100` → clamped, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(meta.len()));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        let config = Self::parse(&content)?;
        tracing::info!(
            path = %path.display(),
            page_size = config.page_size,
            view_mode = config.view_mode.name(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Parse TOML text. Blank text is the default config.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let mut config: Config = toml::from_str(content)?;
        let clamped = config.page_size.clamp(1, MAX_PAGE_SIZE);
        if clamped != config.page_size {
            tracing::warn!(
                page_size = config.page_size,
                using = clamped,
                "page_size out of range, clamping"
            );
            config.page_size = clamped;
        }
        Ok(config)
    }
}

/// `~/.config/feedview`, or `None` when no home directory is known.
pub fn default_config_dir() -> Option<PathBuf> {
    std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .map(|base| base.join(CONFIG_DIR_NAME))
}

/// Pick the API base URL: CLI flag, then environment, then config file,
/// then the localhost default. Blank values are skipped.
pub fn resolve_api_url(
    cli: Option<&str>,
    env: Option<&str>,
    config: Option<&str>,
) -> Result<String, ConfigError> {
    let (source, raw) = [("--api-url", cli), (API_URL_ENV, env), ("config", config)]
        .into_iter()
        .find_map(|(source, value)| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(|v| (source, v))
        })
        .unwrap_or(("default", DEFAULT_API_URL));

    let url = parse_base_url(raw).map_err(|e| ConfigError::InvalidApiUrl(e.to_string()))?;
    tracing::debug!(source, api_url = %url, "Resolved API base URL");
    Ok(url.to_string())
}

// ============================================================================
// Tests
// ============================================================================
