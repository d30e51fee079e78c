//! Configuration loading and validation.

use std::{
    env, fs,
    io::ErrorKind,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::Deserialize;

use crate::{
    error::{Error, Result},
    paths,
};

/// Environment variable holding a Google Fonts developer API key.
pub const API_KEY_VAR: &str = "GOOGLE_FONTS_API_KEY";

/// Public mirror of the catalog listing used when no API key is configured.
const MIRROR_CATALOG_URL: &str =
    "https://raw.githubusercontent.com/nureon22/gfont/main/data/webfonts.json";

/// Official catalog listing endpoint; the key is appended as a query parameter.
const API_CATALOG_URL: &str = "https://www.googleapis.com/webfonts/v1/webfonts";

/// Seconds per day.
const DAY: u64 = 24 * 3600;

/// Parsed configuration for the CLI.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for installed families.
    pub(crate) fonts_dir: PathBuf,
    /// Directory for catalog and metadata caches.
    pub(crate) cache_dir: PathBuf,
    /// Optional Google Fonts developer API key.
    pub(crate) api_key: Option<String>,
    /// Catalog listing URL used without an API key.
    pub(crate) catalog_url: String,
    /// Maximum concurrent downloads per batch.
    pub(crate) max_workers: usize,
    /// Extra attempts per file after the first failure.
    pub(crate) retries: u32,
    /// Per-request timeout.
    pub(crate) request_timeout: Duration,
    /// Age below which a downloaded font is reused.
    pub(crate) font_cache_age: Duration,
    /// Age below which the catalog snapshot is reused.
    pub(crate) catalog_max_age: Duration,
    /// Age below which cached per-family metadata is reused.
    pub(crate) metadata_max_age: Duration,
    /// Command run after installing or removing fonts.
    pub(crate) font_cache_command: String,
    /// Command that renders a preview image.
    pub(crate) preview_renderer: String,
    /// Command that displays a preview image.
    pub(crate) preview_viewer: String,
}

/// Raw config file structure.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    /// Root directory for installed families.
    fonts_dir: Option<String>,
    /// Directory for caches.
    cache_dir: Option<String>,
    /// Google Fonts developer API key.
    api_key: Option<String>,
    /// Catalog listing URL override.
    catalog_url: Option<String>,
    /// Maximum concurrent downloads.
    max_workers: Option<usize>,
    /// Retry budget per file.
    retries: Option<u32>,
    /// Request timeout in seconds.
    request_timeout_secs: Option<u64>,
    /// Font reuse window in days.
    font_cache_age_days: Option<u64>,
    /// Catalog reuse window in days.
    catalog_max_age_days: Option<u64>,
    /// Metadata reuse window in days.
    metadata_max_age_days: Option<u64>,
    /// Font cache refresh command.
    font_cache_command: Option<String>,
    /// Preview renderer command.
    preview_renderer: Option<String>,
    /// Preview viewer command.
    preview_viewer: Option<String>,
}

impl Config {
    /// Load the default config from disk, falling back to defaults when absent.
    pub(crate) fn load() -> Result<Self> {
        let path = paths::default_config_path()?;
        let mut config = Self::load_from(&path)?;
        config.apply_api_key(env::var(API_KEY_VAR).ok());
        Ok(config)
    }

    /// Let a non-blank key from the environment replace the configured one.
    fn apply_api_key(&mut self, key: Option<String>) {
        if let Some(key) = key
            && !key.trim().is_empty()
        {
            self.api_key = Some(key.trim().to_string());
        }
    }

    /// Load a config file from an explicit path.
    pub(crate) fn load_from(path: &Path) -> Result<Self> {
        let raw = match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).map_err(|error| Error::ConfigParse {
                path: path.to_path_buf(),
                source: error,
            })?,
            Err(error) if error.kind() == ErrorKind::NotFound => RawConfig::default(),
            Err(error) => {
                return Err(Error::ConfigRead {
                    path: path.to_path_buf(),
                    source: error,
                });
            }
        };

        let base_dir = path.parent().unwrap_or(Path::new("."));
        Self::from_raw(raw, base_dir)
    }

    /// Build a config rooted at explicit directories with default settings.
    pub(crate) fn with_dirs(fonts_dir: PathBuf, cache_dir: PathBuf) -> Self {
        Self {
            fonts_dir,
            cache_dir,
            api_key: None,
            catalog_url: MIRROR_CATALOG_URL.to_string(),
            max_workers: 10,
            retries: 5,
            request_timeout: Duration::from_secs(10),
            font_cache_age: Duration::from_secs(30 * DAY),
            catalog_max_age: Duration::from_secs(7 * DAY),
            metadata_max_age: Duration::from_secs(DAY),
            font_cache_command: "fc-cache".to_string(),
            preview_renderer: "convert".to_string(),
            preview_viewer: "display".to_string(),
        }
    }

    /// Apply file values over the defaults.
    fn from_raw(raw: RawConfig, base_dir: &Path) -> Result<Self> {
        let fonts_dir = match raw.fonts_dir {
            Some(dir) => paths::expand_path(&dir, base_dir)?,
            None => paths::default_fonts_dir()?,
        };
        let cache_dir = match raw.cache_dir {
            Some(dir) => paths::expand_path(&dir, base_dir)?,
            None => paths::default_cache_dir()?,
        };

        let mut config = Self::with_dirs(fonts_dir, cache_dir);
        config.api_key = raw.api_key.filter(|key| !key.trim().is_empty());
        if let Some(url) = raw.catalog_url {
            config.catalog_url = url;
        }
        if let Some(workers) = raw.max_workers {
            if workers == 0 {
                return Err(Error::ConfigValue {
                    key: "max_workers",
                    message: "must be at least 1".to_string(),
                });
            }
            config.max_workers = workers;
        }
        if let Some(retries) = raw.retries {
            config.retries = retries;
        }
        if let Some(secs) = raw.request_timeout_secs {
            if secs == 0 {
                return Err(Error::ConfigValue {
                    key: "request_timeout_secs",
                    message: "must be at least 1".to_string(),
                });
            }
            config.request_timeout = Duration::from_secs(secs);
        }
        if let Some(days) = raw.font_cache_age_days {
            config.font_cache_age = days_duration("font_cache_age_days", days)?;
        }
        if let Some(days) = raw.catalog_max_age_days {
            config.catalog_max_age = days_duration("catalog_max_age_days", days)?;
        }
        if let Some(days) = raw.metadata_max_age_days {
            config.metadata_max_age = days_duration("metadata_max_age_days", days)?;
        }
        if let Some(command) = raw.font_cache_command {
            config.font_cache_command = command;
        }
        if let Some(command) = raw.preview_renderer {
            config.preview_renderer = command;
        }
        if let Some(command) = raw.preview_viewer {
            config.preview_viewer = command;
        }
        Ok(config)
    }

    /// URL of the full catalog listing.
    pub(crate) fn listing_url(&self) -> String {
        match &self.api_key {
            Some(key) => format!("{API_CATALOG_URL}?key={key}"),
            None => self.catalog_url.clone(),
        }
    }
}

/// Convert a day count from the config file into a duration.
fn days_duration(key: &'static str, days: u64) -> Result<Duration> {
    days.checked_mul(DAY)
        .map(Duration::from_secs)
        .ok_or_else(|| Error::ConfigValue {
            key,
            message: format!("{days} days is out of range"),
        })
}
