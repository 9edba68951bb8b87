//! pixiv downloader - archive a pixiv user's artworks at original resolution
//!
//! This library drives an authenticated Chromium session through a user's
//! artwork listing, derives the original image URLs of each artwork and
//! downloads them with bounded retries.
//!
//! # Features
//!
//! - Cookie-based sessions, saved between runs
//! - Download a whole account, one listing page, or one artwork
//! - Search mode reporting artwork and page counts
//! - Idempotent re-runs: existing files are skipped
//! - Cooperative cancellation with a summary of what was left undone
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use pixiv_downloader::browser::ChromeDriver;
//! use pixiv_downloader::download::{CancelFlag, Downloader, ImageDownloader};
//! use pixiv_downloader::session::{CookieStore, SessionContext};
//! use pixiv_downloader::Config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load(Path::new("config.toml"))?;
//!     let cookies = CookieStore::new(&config.account.cookie_file)
//!         .load()?
//!         .unwrap_or_default();
//!
//!     let driver = ChromeDriver::launch(&config, &cookies).await?;
//!     let session = SessionContext::new(
//!         &cookies,
//!         &config.account.user_agent,
//!         config.network.download_timeout(),
//!     )?;
//!     let images = ImageDownloader::from_config(session, &config);
//!
//!     let mut downloader =
//!         Downloader::new(Box::new(driver), config, images, CancelFlag::new());
//!     let report = downloader.download_page("4242", 1).await;
//!     println!("{} artworks processed", report.record.processed_count);
//!     downloader.shutdown().await?;
//!     Ok(())
//! }
//! ```

pub mod browser;
pub mod cli;
pub mod config;
pub mod download;
pub mod error;
pub mod extract;
pub mod fs;
pub mod output;
pub mod session;

// Re-exports for convenience
pub use config::{Config, DownloadMode};
pub use download::{Downloader, DownloadRecord, RunReport};
pub use error::{Error, Result};
pub use session::SessionContext;
