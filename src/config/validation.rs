//! Configuration validation logic.

use crate::config::loader::Config;
use crate::config::modes::DownloadMode;
use crate::error::{Error, Result};
use regex::Regex;

/// Validate the entire configuration for the selected mode.
pub fn validate_config(config: &Config) -> Result<()> {
    let mode = config.options.download_mode;

    if mode.needs_user() {
        let user_id = config
            .target
            .user_id
            .as_deref()
            .ok_or_else(|| Error::MissingConfig("user_id (numeric pixiv user ID)".to_string()))?;
        validate_user_id(user_id)?;
    }

    match mode {
        DownloadMode::Page => validate_page(config.options.page)?,
        DownloadMode::Url => {
            let url = config.options.artwork_url.as_deref().ok_or_else(|| {
                Error::MissingConfig("artwork_url (required for url mode)".to_string())
            })?;
            parse_artwork_id(url)?;
        }
        DownloadMode::All | DownloadMode::Search => {}
    }

    validate_network(config)?;

    if config.account.user_agent.trim().is_empty() {
        return Err(Error::MissingConfig("user_agent".to_string()));
    }

    Ok(())
}

/// Validate a pixiv user ID (digits only).
pub fn validate_user_id(user_id: &str) -> Result<()> {
    if user_id.is_empty() || !user_id.chars().all(|c| c.is_ascii_digit()) {
        return Err(Error::ConfigValidation {
            field: "user_id".to_string(),
            message: format!(
                "Invalid User ID '{}'. Please enter a valid number.",
                user_id
            ),
        });
    }
    Ok(())
}

/// Validate a 1-based listing page number.
pub fn validate_page(page: u32) -> Result<()> {
    if page == 0 {
        return Err(Error::ConfigValidation {
            field: "page".to_string(),
            message: "Page numbers start at 1".to_string(),
        });
    }
    Ok(())
}

fn validate_network(config: &Config) -> Result<()> {
    let network = &config.network;

    for (field, value) in [
        ("download_attempts", network.download_attempts),
        ("extract_attempts", network.extract_attempts),
        ("next_page_attempts", network.next_page_attempts),
    ] {
        if value == 0 {
            return Err(Error::ConfigValidation {
                field: field.to_string(),
                message: "Must be at least 1".to_string(),
            });
        }
    }

    if network.retry_delay_min_ms > network.retry_delay_max_ms {
        return Err(Error::ConfigValidation {
            field: "retry_delay_min_ms".to_string(),
            message: format!(
                "Minimum delay ({}ms) exceeds maximum delay ({}ms)",
                network.retry_delay_min_ms, network.retry_delay_max_ms
            ),
        });
    }

    url::Url::parse(&network.base_url)?;

    Ok(())
}

/// Extract the artwork ID from an artwork URL or a bare ID.
pub fn parse_artwork_id(input: &str) -> Result<String> {
    let input = input.trim();

    if input.starts_with("http://") || input.starts_with("https://") {
        // Pattern: https://www.pixiv.net/en/artworks/12345678
        let artwork_pattern = Regex::new(r"^https?://[^/]+/(?:en/)?artworks/(\d+)/?$")
            .map_err(|e| Error::Config(e.to_string()))?;

        if let Some(id) = artwork_pattern.captures(input).and_then(|c| c.get(1)) {
            return Ok(id.as_str().to_string());
        }

        return Err(Error::ConfigValidation {
            field: "artwork_url".to_string(),
            message: format!(
                "Invalid artwork URL: {}. Expected e.g. https://www.pixiv.net/en/artworks/12345678",
                input
            ),
        });
    }

    if !input.is_empty() && input.chars().all(|c| c.is_ascii_digit()) {
        return Ok(input.to_string());
    }

    Err(Error::ConfigValidation {
        field: "artwork_url".to_string(),
        message: format!(
            "Invalid artwork: '{}'. Must be a numeric ID or a pixiv artwork URL.",
            input
        ),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_user_id() {
        assert!(validate_user_id("11").is_ok());
        assert!(validate_user_id("123456789").is_ok());
    }

    #[test]
    fn test_invalid_user_id() {
        assert!(validate_user_id("").is_err());
        assert!(validate_user_id("abc").is_err());
        assert!(validate_user_id("12 34").is_err());
    }

    #[test]
    fn test_parse_artwork_id_url() {
        let url = "https://www.pixiv.net/en/artworks/12345678";
        assert_eq!(parse_artwork_id(url).unwrap(), "12345678");
        assert_eq!(
            parse_artwork_id("https://www.pixiv.net/artworks/987/").unwrap(),
            "987"
        );
    }

    #[test]
    fn test_parse_artwork_id_direct() {
        assert_eq!(parse_artwork_id(" 12345 ").unwrap(), "12345");
    }

    #[test]
    fn test_parse_artwork_id_invalid() {
        assert!(parse_artwork_id("https://www.pixiv.net/en/users/123").is_err());
        assert!(parse_artwork_id("not-a-number").is_err());
        assert!(parse_artwork_id("").is_err());
    }

    #[test]
    fn test_validate_config_by_mode() {
        let mut config = Config::default();
        assert!(matches!(
            validate_config(&config),
            Err(Error::MissingConfig(_))
        ));

        config.target.user_id = Some("123".into());
        assert!(validate_config(&config).is_ok());

        config.options.download_mode = DownloadMode::Page;
        config.options.page = 0;
        assert!(validate_config(&config).is_err());

        // url mode does not need a user
        config.target.user_id = None;
        config.options.download_mode = DownloadMode::Url;
        config.options.artwork_url = Some("https://www.pixiv.net/en/artworks/1".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_network_bounds() {
        let mut config = Config::default();
        config.target.user_id = Some("123".into());

        config.network.download_attempts = 0;
        assert!(validate_config(&config).is_err());

        config.network.download_attempts = 5;
        config.network.retry_delay_min_ms = 5000;
        assert!(validate_config(&config).is_err());
    }
}
