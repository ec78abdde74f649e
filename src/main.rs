use anyhow::{Context, Result};
use clap::Parser;
use feedview::api::HttpFeedApi;
use feedview::app::{App, AppEvent, Settings};
use feedview::config::{self, Config, API_URL_ENV, CONFIG_FILE_NAME, MAX_PAGE_SIZE};
use feedview::keybindings::KeybindingRegistry;
use feedview::prefs::{PreferenceStore, STATE_FILE_NAME};
use feedview::ui;
use feedview::view_state::ViewMode;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(
    name = "feedview",
    version,
    about = "Terminal client for a feed aggregation API"
)]
struct Args {
    /// Base URL of the feed API (overrides FEEDVIEW_API_URL and config)
    #[arg(long, value_name = "URL")]
    api_url: Option<String>,

    /// Config file (default: ~/.config/feedview/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Articles per page (1-100)
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..=MAX_PAGE_SIZE as i64))]
    page_size: Option<u32>,

    /// Initial layout: grid or list
    #[arg(long, value_parser = parse_view_mode)]
    view: Option<ViewMode>,
}

fn parse_view_mode(s: &str) -> Result<ViewMode, String> {
    ViewMode::from_str_name(s).ok_or_else(|| format!("expected 'grid' or 'list', got '{}'", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never land in the alternate screen
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config_dir = config::default_config_dir();
    let config_path = match (&args.config, &config_dir) {
        (Some(path), _) => Some(path.clone()),
        (None, Some(dir)) => Some(dir.join(CONFIG_FILE_NAME)),
        (None, None) => None,
    };

    let config = match &config_path {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => {
            tracing::warn!("No home directory, using default configuration");
            Config::default()
        }
    };

    let env_url = std::env::var(API_URL_ENV).ok();
    let api_url = config::resolve_api_url(
        args.api_url.as_deref(),
        env_url.as_deref(),
        config.api_url.as_deref(),
    )?;
    let api = HttpFeedApi::new(&api_url).context("Failed to create API client")?;
    tracing::info!(api_url = %api_url, "Using feed API");

    let prefs = match &config_dir {
        Some(dir) => PreferenceStore::open_or_default(dir.join(STATE_FILE_NAME)),
        None => PreferenceStore::open_or_default(STATE_FILE_NAME),
    };

    let mut keybindings = KeybindingRegistry::new();
    for warning in keybindings.apply_overrides(&config.keybindings) {
        eprintln!("Warning: {}", warning);
    }

    let settings = Settings {
        page_size: args.page_size.unwrap_or(config.page_size),
        view_mode: args.view.unwrap_or(config.view_mode),
        default_theme: config.theme,
        ingest: config.ingest.policy(),
    };

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(32);
    let mut app = App::new(Arc::new(api), event_tx, settings, prefs).with_keybindings(keybindings);

    ui::run(
        &mut app,
        event_rx,
        Duration::from_secs(config.auto_refresh_secs),
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parse() {
        let args = Args::try_parse_from([
            "feedview",
            "--api-url",
            "http://api.local:9000",
            "--page-size",
            "20",
            "--view",
            "list",
        ])
        .unwrap();
        assert_eq!(args.api_url.as_deref(), Some("http://api.local:9000"));
        assert_eq!(args.page_size, Some(20));
        assert_eq!(args.view, Some(ViewMode::List));
    }

    #[test]
    fn test_args_reject_bad_values() {
        assert!(Args::try_parse_from(["feedview", "--page-size", "0"]).is_err());
        assert!(Args::try_parse_from(["feedview", "--page-size", "500"]).is_err());
        assert!(Args::try_parse_from(["feedview", "--view", "tiles"]).is_err());
    }
}
