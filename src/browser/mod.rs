//! Browser controller module.
//!
//! This module provides:
//! - The `PageDriver` seam used by the pagination walker and run orchestrator
//! - A Chromium implementation over the DevTools protocol
//! - Session validation against the site's login redirect

pub mod chrome;

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};

use crate::error::{Error, Result};

pub use chrome::ChromeDriver;

/// Interval between polls of a page condition.
pub const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A controlled browser tab.
///
/// Implementations must tolerate being called after the window was closed by
/// returning errors rather than panicking.
#[async_trait]
pub trait PageDriver: Send {
    /// Navigate to a URL and wait for the load to settle.
    async fn navigate(&mut self, url: &str) -> Result<()>;

    /// URL currently shown.
    async fn current_url(&mut self) -> Result<String>;

    /// Rendered HTML of the current document.
    async fn page_source(&mut self) -> Result<String>;

    /// Whether an element matches the CSS selector right now.
    async fn has_element(&mut self, selector: &str) -> Result<bool>;

    /// Scroll to the bottom so lazily rendered controls appear.
    async fn scroll_to_bottom(&mut self) -> Result<()>;

    /// Click the first anchor whose `href` contains `href_fragment`.
    ///
    /// Returns `false` when no such anchor exists.
    async fn click_link(&mut self, href_fragment: &str) -> Result<bool>;

    /// Whether the browser session is still usable.
    async fn is_alive(&mut self) -> bool;

    /// Tear down the browser.
    async fn quit(&mut self) -> Result<()>;

    /// Poll until an element matches `selector` or `timeout` elapses.
    async fn wait_for_selector(&mut self, selector: &str, timeout: Duration) -> Result<()> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.has_element(selector).await? {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout(format!("element '{}'", selector)));
            }
            sleep(POLL_INTERVAL).await;
        }
    }

    /// Poll until the current URL differs from `previous` or `timeout` elapses.
    async fn wait_for_url_change(&mut self, previous: &str, timeout: Duration) -> Result<String> {
        let deadline = Instant::now() + timeout;
        loop {
            let current = self.current_url().await?;
            if current != previous {
                return Ok(current);
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout(format!("navigation away from {}", previous)));
            }
            sleep(POLL_INTERVAL).await;
        }
    }
}

/// Check that the injected cookies still authenticate the session.
///
/// The site redirects anonymous visitors of the landing page to a login URL.
pub async fn validate_session(driver: &mut dyn PageDriver, base_url: &str) -> Result<()> {
    let landing = format!("{}/en/", base_url.trim_end_matches('/'));
    driver.navigate(&landing).await?;
    let current = driver.current_url().await?;

    if current.to_lowercase().contains("login") {
        return Err(Error::Authentication(
            "Cookies are invalid or expired. Please provide a new cookie string.".into(),
        ));
    }

    tracing::info!("Cookie validation successful!");
    Ok(())
}
