//! Client-side preferences that outlive a session.
//!
//! A flat JSON object of string values in `state.json` next to the config
//! file. Only `theme` is written today. Unknown keys are kept on rewrite.

use crate::theme::ThemeVariant;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const STATE_FILE_NAME: &str = "state.json";
const THEME_KEY: &str = "theme";
/// Larger files are treated as corrupt.
const MAX_STATE_FILE_SIZE: u64 = 64 * 1024;

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("Preference file I/O failed for {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Preference file is not a JSON object of strings: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Preference file too large: {0} bytes")]
    TooLarge(u64),
}

/// Persisted key/value preferences backed by one JSON file.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl PreferenceStore {
    /// Read the store at `path`. A missing file is an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, PrefsError> {
        let path = path.into();
        let values = match std::fs::metadata(&path) {
            Ok(meta) if meta.len() > MAX_STATE_FILE_SIZE => {
                return Err(PrefsError::TooLarge(meta.len()))
            }
            Ok(_) => {
                let raw = std::fs::read_to_string(&path).map_err(|source| PrefsError::Io {
                    path: path.clone(),
                    source,
                })?;
                if raw.trim().is_empty() {
                    BTreeMap::new()
                } else {
                    serde_json::from_str(&raw)?
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(PrefsError::Io { path, source }),
        };
        Ok(Self { path, values })
    }

    /// Like `open`, but a broken file is logged and replaced by an empty
    /// store. The next save overwrites it.
    pub fn open_or_default(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        match Self::open(&path) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable preference file");
                Self {
                    path,
                    values: BTreeMap::new(),
                }
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// Set `key` and write the whole file.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), PrefsError> {
        self.values.insert(key.to_string(), value.to_string());
        self.save()
    }

    /// The persisted theme, if one was saved and is recognised.
    pub fn theme(&self) -> Option<ThemeVariant> {
        self.get(THEME_KEY).and_then(ThemeVariant::from_str_name)
    }

    pub fn save_theme(&mut self, theme: ThemeVariant) -> Result<(), PrefsError> {
        self.set(THEME_KEY, theme.as_key())
    }

    /// Write atomically: temp file in the same directory, fsync, rename.
    fn save(&self) -> Result<(), PrefsError> {
        let io_err = |source| PrefsError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(io_err)?;
        }

        let body = serde_json::to_string_pretty(&self.values)?;
        let temp_path = self
            .path
            .with_extension(format!("json.tmp.{}", std::process::id()));

        let write = || -> std::io::Result<()> {
            let mut file = std::fs::File::create(&temp_path)?;
            file.write_all(body.as_bytes())?;
            file.sync_all()?;
            drop(file);
            std::fs::rename(&temp_path, &self.path)
        };

        write().map_err(|source| {
            let _ = std::fs::remove_file(&temp_path);
            io_err(source)
        })?;

        tracing::debug!(path = %self.path.display(), "Saved preferences");
        Ok(())
    }
}
