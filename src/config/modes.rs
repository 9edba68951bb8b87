//! Download mode definitions.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Available download modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadMode {
    /// Walk every listing page of the user (default).
    #[default]
    All,
    /// Download a single listing page.
    Page,
    /// Download a single artwork by URL.
    Url,
    /// Only report the user's artwork and page counts.
    Search,
}

impl DownloadMode {
    /// Whether the mode needs a target user ID.
    pub fn needs_user(&self) -> bool {
        !matches!(self, DownloadMode::Url)
    }
}

impl fmt::Display for DownloadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadMode::All => write!(f, "all"),
            DownloadMode::Page => write!(f, "page"),
            DownloadMode::Url => write!(f, "url"),
            DownloadMode::Search => write!(f, "search"),
        }
    }
}

impl FromStr for DownloadMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "all" => Ok(DownloadMode::All),
            "page" => Ok(DownloadMode::Page),
            "url" => Ok(DownloadMode::Url),
            "search" => Ok(DownloadMode::Search),
            _ => Err(format!("Unknown download mode: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_round_trips_through_display() {
        for mode in [
            DownloadMode::All,
            DownloadMode::Page,
            DownloadMode::Url,
            DownloadMode::Search,
        ] {
            assert_eq!(mode.to_string().parse::<DownloadMode>().unwrap(), mode);
        }
        assert!("timeline".parse::<DownloadMode>().is_err());
    }
}
