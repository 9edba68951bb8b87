//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::Result;
use crate::fs::naming::sanitize_path_component;

/// Folder receiving every image downloaded for `owner` (a user or artwork ID).
pub fn account_folder(config: &Config, owner: &str) -> Result<PathBuf> {
    let folder = sanitize_path_component(&format!("pixiv_{}_images", owner))?;
    Ok(config.options.download_directory.join(folder))
}

/// Folder for one artwork's images, honoring `separate_artworks`.
pub fn artwork_folder(config: &Config, account_dir: &Path, artwork_url: &str) -> Result<PathBuf> {
    if !config.options.separate_artworks {
        return Ok(account_dir.to_path_buf());
    }

    let artwork_id = artwork_url
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(artwork_url);
    Ok(account_dir.join(sanitize_path_component(artwork_id)?))
}
