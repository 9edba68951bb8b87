//! Configuration structures and loading logic.

use crate::config::modes::DownloadMode;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub account: AccountConfig,

    #[serde(default)]
    pub target: TargetConfig,

    #[serde(default)]
    pub options: OptionsConfig,

    #[serde(default)]
    pub network: NetworkConfig,
}

/// Session credentials configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountConfig {
    /// JSON file holding the saved session cookies.
    #[serde(default = "default_cookie_file")]
    pub cookie_file: PathBuf,

    /// Browser user agent string sent with image requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Target account configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Numeric pixiv user ID whose artworks are downloaded.
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Download options configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Download mode (all, page, url, search).
    #[serde(default)]
    pub download_mode: DownloadMode,

    /// Listing page for page mode (1-based).
    #[serde(default = "default_page")]
    pub page: u32,

    /// Artwork URL for url mode.
    #[serde(default)]
    pub artwork_url: Option<String>,

    /// Base directory for downloads.
    #[serde(default = "default_download_directory")]
    pub download_directory: PathBuf,

    /// Whether to show the browser window instead of running headless.
    #[serde(default)]
    pub show_browser: bool,

    /// Chromium executable; auto-detected when unset.
    #[serde(default)]
    pub chrome_executable: Option<PathBuf>,

    /// Whether to put each artwork's images into its own folder.
    #[serde(default)]
    pub separate_artworks: bool,

    /// Whether to log each downloaded file.
    #[serde(default = "default_true")]
    pub show_downloads: bool,

    /// Whether to log skipped files.
    #[serde(default = "default_true")]
    pub show_skipped_downloads: bool,

    /// Plain-text run log, appended on every run.
    #[serde(default = "default_log_file")]
    pub log_file: PathBuf,
}

impl Default for OptionsConfig {
    fn default() -> Self {
        Self {
            download_mode: DownloadMode::default(),
            page: default_page(),
            artwork_url: None,
            download_directory: default_download_directory(),
            show_browser: false,
            chrome_executable: None,
            separate_artworks: false,
            show_downloads: true,
            show_skipped_downloads: true,
            log_file: default_log_file(),
        }
    }
}

/// Site, timeout and retry configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NetworkConfig {
    /// Site root, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Bound for every wait on a page condition.
    #[serde(default = "default_page_timeout")]
    pub page_timeout_seconds: u64,

    /// Per-request timeout for image downloads.
    #[serde(default = "default_download_timeout")]
    pub download_timeout_seconds: u64,

    /// Attempts per image before it is recorded as failed.
    #[serde(default = "default_download_attempts")]
    pub download_attempts: u32,

    /// Navigation attempts per artwork page.
    #[serde(default = "default_extract_attempts")]
    pub extract_attempts: u32,

    /// Lookups of the "next page" control before the walk ends.
    #[serde(default = "default_next_page_attempts")]
    pub next_page_attempts: u32,

    #[serde(default = "default_retry_delay_min")]
    pub retry_delay_min_ms: u64,

    #[serde(default = "default_retry_delay_max")]
    pub retry_delay_max_ms: u64,

    /// CSS selector of the listing's pagination container.
    #[serde(default = "default_paginator_selector")]
    pub paginator_selector: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            page_timeout_seconds: default_page_timeout(),
            download_timeout_seconds: default_download_timeout(),
            download_attempts: default_download_attempts(),
            extract_attempts: default_extract_attempts(),
            next_page_attempts: default_next_page_attempts(),
            retry_delay_min_ms: default_retry_delay_min(),
            retry_delay_max_ms: default_retry_delay_max(),
            paginator_selector: default_paginator_selector(),
        }
    }
}

impl NetworkConfig {
    pub fn page_timeout(&self) -> Duration {
        Duration::from_secs(self.page_timeout_seconds)
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_seconds)
    }
}

fn default_cookie_file() -> PathBuf {
    PathBuf::from("pixiv_cookies.json")
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36".to_string()
}

fn default_page() -> u32 {
    1
}

fn default_download_directory() -> PathBuf {
    PathBuf::from("pixiv_images")
}

fn default_log_file() -> PathBuf {
    PathBuf::from("output.log")
}

fn default_true() -> bool {
    true
}

fn default_base_url() -> String {
    "https://www.pixiv.net".to_string()
}

fn default_page_timeout() -> u64 {
    20
}

fn default_download_timeout() -> u64 {
    10
}

fn default_download_attempts() -> u32 {
    5
}

fn default_extract_attempts() -> u32 {
    3
}

fn default_next_page_attempts() -> u32 {
    3
}

fn default_retry_delay_min() -> u64 {
    1000
}

fn default_retry_delay_max() -> u64 {
    3000
}

fn default_paginator_selector() -> String {
    "nav[class*='sc-xhhh7v-0']".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::Config(format!(
                    "Configuration file not found: {}. Create one from config.example.toml",
                    path.display()
                ))
            } else {
                Error::Io(e)
            }
        })?;

        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Site root without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.network.base_url.trim_end_matches('/')
    }
}

impl Default for AccountConfig {
    fn default() -> Self {
        Self {
            cookie_file: default_cookie_file(),
            user_agent: default_user_agent(),
        }
    }
}
