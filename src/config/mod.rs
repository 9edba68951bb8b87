//! Configuration module for the pixiv-downloader.
//!
//! This module handles:
//! - Loading configuration from TOML files
//! - Download mode selection
//! - Configuration validation

pub mod loader;
pub mod modes;
pub mod validation;

pub use loader::{AccountConfig, Config, NetworkConfig, OptionsConfig, TargetConfig};
pub use modes::DownloadMode;
pub use validation::{parse_artwork_id, validate_config, validate_page, validate_user_id};
