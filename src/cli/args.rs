//! Command-line argument definitions using clap.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{Config, DownloadMode};

/// pixiv artwork downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "pixiv-downloader",
    version,
    about = "Download original-resolution artworks from pixiv users",
    long_about = "A CLI tool that drives a Chromium session with your pixiv cookies to list a \
                  user's artworks and download every original image.\n\n\
                  Supports whole accounts, single listing pages, single artworks and a \
                  search mode that only reports counts."
)]
pub struct Args {
    /// Numeric pixiv user ID to download from.
    #[arg(short, long, env = "PIXIV_USER_ID")]
    pub user: Option<String>,

    /// Download mode. Defaults to "url" when --url is given.
    #[arg(long, value_enum)]
    pub mode: Option<DownloadModeArg>,

    /// Listing page to download (requires --mode page).
    #[arg(short, long)]
    pub page: Option<u32>,

    /// Artwork URL or ID to download.
    #[arg(long)]
    pub url: Option<String>,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory")]
    pub download_directory: Option<PathBuf>,

    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Cookie string or JSON cookie list to save before the run.
    #[arg(long, env = "PIXIV_COOKIE", hide_env_values = true)]
    pub cookie: Option<String>,

    /// File holding the saved cookies.
    #[arg(long)]
    pub cookie_file: Option<PathBuf>,

    /// Delete the saved cookies and exit.
    #[arg(long)]
    pub clear_cookies: bool,

    /// Browser user agent string.
    #[arg(short = 'a', long = "user-agent", env = "PIXIV_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Show the browser window instead of running headless.
    #[arg(long)]
    pub show_browser: bool,

    /// Chromium executable to launch.
    #[arg(long)]
    pub chrome: Option<PathBuf>,

    /// Save each artwork's images in its own folder.
    #[arg(long)]
    pub separate_artworks: bool,

    /// Run log file, appended on every run.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Hide per-file download and skip messages.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

/// CLI download mode argument.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DownloadModeArg {
    /// Walk every listing page of the user.
    All,
    /// Download one listing page.
    Page,
    /// Download one artwork.
    Url,
    /// Report artwork and page counts only.
    Search,
}

impl From<DownloadModeArg> for DownloadMode {
    fn from(arg: DownloadModeArg) -> Self {
        match arg {
            DownloadModeArg::All => DownloadMode::All,
            DownloadModeArg::Page => DownloadMode::Page,
            DownloadModeArg::Url => DownloadMode::Url,
            DownloadModeArg::Search => DownloadMode::Search,
        }
    }
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        if let Some(ref user) = self.user {
            config.target.user_id = Some(user.clone());
        }

        if let Some(ref user_agent) = self.user_agent {
            config.account.user_agent = user_agent.clone();
        }

        if let Some(ref path) = self.cookie_file {
            config.account.cookie_file = path.clone();
        }

        if let Some(ref dir) = self.download_directory {
            config.options.download_directory = dir.clone();
        }

        if let Some(ref url) = self.url {
            config.options.artwork_url = Some(url.clone());
        }

        match self.mode {
            Some(mode) => config.options.download_mode = mode.into(),
            None if self.url.is_some() => config.options.download_mode = DownloadMode::Url,
            None => {}
        }

        if let Some(page) = self.page {
            config.options.page = page;
        }

        if let Some(ref chrome) = self.chrome {
            config.options.chrome_executable = Some(chrome.clone());
        }

        if let Some(ref log_file) = self.log_file {
            config.options.log_file = log_file.clone();
        }

        // Boolean flags (only override if set to non-default)
        if self.show_browser {
            config.options.show_browser = true;
        }

        if self.separate_artworks {
            config.options.separate_artworks = true;
        }

        if self.quiet {
            config.options.show_downloads = false;
            config.options.show_skipped_downloads = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::parse_from([
            "pixiv-downloader",
            "--user",
            "4242",
            "--mode",
            "page",
            "--page",
            "3",
            "--show-browser",
            "--quiet",
        ]);
        let mut config = Config::default();
        args.merge_into_config(&mut config);

        assert_eq!(config.target.user_id.as_deref(), Some("4242"));
        assert_eq!(config.options.download_mode, DownloadMode::Page);
        assert_eq!(config.options.page, 3);
        assert!(config.options.show_browser);
        assert!(!config.options.show_downloads);
    }

    #[test]
    fn test_url_implies_url_mode() {
        let args = Args::parse_from([
            "pixiv-downloader",
            "--url",
            "https://www.pixiv.net/en/artworks/118000001",
        ]);
        let mut config = Config::default();
        args.merge_into_config(&mut config);
        assert_eq!(config.options.download_mode, DownloadMode::Url);
        assert!(config.options.artwork_url.is_some());
    }

    #[test]
    fn test_unset_flags_keep_config() {
        let args = Args::parse_from(["pixiv-downloader"]);
        let mut config = Config::default();
        config.options.download_mode = DownloadMode::Search;
        config.options.separate_artworks = true;
        args.merge_into_config(&mut config);
        assert_eq!(config.options.download_mode, DownloadMode::Search);
        assert!(config.options.separate_artworks);
    }
}
