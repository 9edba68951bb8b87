//! Explicit session context shared by every HTTP call of a run.

use std::time::Duration;

use reqwest::{header, Client, Response};

use crate::error::{Error, Result};
use crate::session::cookies::{cookie_header, Cookie};

/// Referer the image host expects on original-image requests.
pub const IMAGE_REFERER: &str = "https://www.pixiv.net/";

/// Authenticated HTTP session: a client carrying the referer, user agent and
/// cookie headers, plus the per-request timeout.
#[derive(Debug, Clone)]
pub struct SessionContext {
    client: Client,
}

impl SessionContext {
    /// Build a session context from the saved cookies.
    pub fn new(cookies: &[Cookie], user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(header::REFERER, header::HeaderValue::from_static(IMAGE_REFERER));

        if !cookies.is_empty() {
            let value = header::HeaderValue::from_str(&cookie_header(cookies)).map_err(|e| {
                Error::InvalidCookies(format!("cookie value is not a valid header: {}", e))
            })?;
            headers.insert(header::COOKIE, value);
        }

        let client = Client::builder()
            .user_agent(user_agent)
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Download(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { client })
    }

    /// Issue a GET and fail on a non-success status.
    pub async fn get(&self, url: &str) -> Result<Response> {
        tracing::debug!("GET {}", url);
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Download(format!("HTTP {}", status)));
        }

        Ok(response)
    }
}
