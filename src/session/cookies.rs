//! Cookie parsing and persistence.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Domain assigned to cookies pasted as a plain `name=value` string.
pub const DEFAULT_COOKIE_DOMAIN: &str = ".pixiv.net";

/// A single credential fragment copied from an authenticated browser session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default = "default_domain")]
    pub domain: String,
}

fn default_domain() -> String {
    DEFAULT_COOKIE_DOMAIN.to_string()
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            domain: default_domain(),
        }
    }
}

// Cookie values are credentials, keep them out of logs.
impl fmt::Debug for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cookie")
            .field("name", &self.name)
            .field("value", &"[REDACTED]")
            .field("domain", &self.domain)
            .finish()
    }
}

/// Parse a cookie string pasted by the user.
///
/// Accepts either a JSON list of `{name, value[, domain]}` objects (as exported
/// by browser extensions) or a `Cookie` header value such as
/// `PHPSESSID=123_abc; device_token=xyz`.
pub fn parse_cookie_string(input: &str) -> Result<Vec<Cookie>> {
    let input = input.trim();
    if input.is_empty() {
        return Err(Error::InvalidCookies("no cookie string provided".into()));
    }

    let cookies = if input.starts_with('[') {
        let raw: Vec<serde_json::Value> = serde_json::from_str(input)?;
        raw.into_iter()
            .map(|entry| {
                serde_json::from_value::<Cookie>(entry).map_err(|_| {
                    Error::InvalidCookies(
                        "Invalid JSON cookie format. Each cookie must have 'name' and 'value'."
                            .into(),
                    )
                })
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        let pairs: Vec<Cookie> = input
            .split("; ")
            .filter_map(|part| part.split_once('='))
            .map(|(name, value)| Cookie::new(name.trim(), value))
            .collect();
        if pairs.is_empty() {
            return Err(Error::InvalidCookies(
                "cookie string must contain at least one 'name=value' pair".into(),
            ));
        }
        pairs
    };

    if cookies.is_empty() {
        return Err(Error::InvalidCookies(
            "no valid cookies parsed from the string".into(),
        ));
    }

    Ok(cookies)
}

/// Render cookies as a `Cookie` request header value.
pub fn cookie_header(cookies: &[Cookie]) -> String {
    cookies
        .iter()
        .map(|c| format!("{}={}", c.name, c.value))
        .collect::<Vec<_>>()
        .join("; ")
}

/// File-backed cookie store (a JSON list of cookies).
#[derive(Debug, Clone)]
pub struct CookieStore {
    path: PathBuf,
}

impl CookieStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load saved cookies, `None` when nothing has been saved yet.
    pub fn load(&self) -> Result<Option<Vec<Cookie>>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;
        let cookies: Vec<Cookie> = serde_json::from_str(&content)?;
        tracing::debug!("Loaded {} cookies from {}", cookies.len(), self.path.display());
        Ok(Some(cookies))
    }

    pub fn save(&self, cookies: &[Cookie]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(cookies)?;
        fs::write(&self.path, json)?;
        tracing::info!("Saved {} cookies to {}", cookies.len(), self.path.display());
        Ok(())
    }

    /// Remove the cookie file. Returns whether a file was removed.
    pub fn clear(&self) -> Result<bool> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
            return Ok(true);
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_header_string() {
        let cookies = parse_cookie_string("PHPSESSID=123_abc; device_token=x=y; junk").unwrap();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0].name, "PHPSESSID");
        assert_eq!(cookies[0].value, "123_abc");
        assert_eq!(cookies[0].domain, DEFAULT_COOKIE_DOMAIN);
        // Only the first '=' separates name and value
        assert_eq!(cookies[1].value, "x=y");
    }

    #[test]
    fn test_parse_json_list() {
        let json = r#"[{"name":"PHPSESSID","value":"abc","domain":".pixiv.net"},{"name":"a","value":"b"}]"#;
        let cookies = parse_cookie_string(json).unwrap();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[1].domain, DEFAULT_COOKIE_DOMAIN);
    }

    #[test]
    fn test_parse_json_missing_value() {
        let json = r#"[{"name":"PHPSESSID"}]"#;
        assert!(matches!(
            parse_cookie_string(json),
            Err(Error::InvalidCookies(_))
        ));
    }

    #[test]
    fn test_parse_rejects_empty_and_pairless() {
        assert!(parse_cookie_string("   ").is_err());
        assert!(parse_cookie_string("no pairs here").is_err());
        assert!(parse_cookie_string("[]").is_err());
        assert!(parse_cookie_string("[not json").is_err());
    }

    #[test]
    fn test_cookie_header() {
        let cookies = vec![Cookie::new("a", "1"), Cookie::new("b", "2")];
        assert_eq!(cookie_header(&cookies), "a=1; b=2");
    }

    #[test]
    fn test_debug_redacts_value() {
        let rendered = format!("{:?}", Cookie::new("PHPSESSID", "secret"));
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("REDACTED"));
    }

    #[test]
    fn test_store_save_load_clear() {
        let dir = TempDir::new().unwrap();
        let store = CookieStore::new(dir.path().join("nested/cookies.json"));

        assert!(store.load().unwrap().is_none());
        assert!(!store.clear().unwrap());

        let cookies = vec![Cookie::new("PHPSESSID", "abc")];
        store.save(&cookies).unwrap();
        assert_eq!(store.load().unwrap(), Some(cookies));

        assert!(store.clear().unwrap());
        assert!(store.load().unwrap().is_none());
    }
}
