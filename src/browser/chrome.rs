//! Chromium-backed page driver using the DevTools protocol.

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::CookieParam;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::browser::PageDriver;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::session::Cookie;

/// A single Chromium tab with the session cookies injected.
pub struct ChromeDriver {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl ChromeDriver {
    /// Launch Chromium, open the site root and inject the cookies.
    pub async fn launch(config: &Config, cookies: &[Cookie]) -> Result<Self> {
        let headless = !config.options.show_browser;
        tracing::info!("Launching browser (headless={})", headless);

        let mut builder = BrowserConfig::builder()
            .request_timeout(config.network.page_timeout())
            .arg("--log-level=3")
            .arg("--disable-blink-features=AutomationControlled")
            .arg("--no-first-run")
            .arg("--no-default-browser-check")
            .arg(format!("--user-agent={}", config.account.user_agent));

        if !headless {
            builder = builder.with_head();
        }

        if let Some(ref path) = config.options.chrome_executable {
            builder = builder.chrome_executable(path);
        }

        let browser_config = builder
            .build()
            .map_err(|e| Error::Browser(format!("Failed to build browser config: {}", e)))?;

        let (browser, mut handler) = Browser::launch(browser_config).await?;

        // The CDP event loop must be polled for any command to complete.
        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser.new_page(config.base_url()).await?;

        let params = cookies
            .iter()
            .map(|c| {
                CookieParam::builder()
                    .name(c.name.clone())
                    .value(c.value.clone())
                    .domain(c.domain.clone())
                    .build()
                    .map_err(|e| Error::InvalidCookies(format!("{}: {}", c.name, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        if !params.is_empty() {
            page.set_cookies(params).await?;
        }
        tracing::debug!("Injected {} cookies", cookies.len());

        Ok(Self {
            browser,
            page,
            handler,
        })
    }
}

#[async_trait]
impl PageDriver for ChromeDriver {
    async fn navigate(&mut self, url: &str) -> Result<()> {
        tracing::debug!("Navigating to {}", url);
        self.page.goto(url).await?;
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String> {
        Ok(self.page.url().await?.unwrap_or_default())
    }

    async fn page_source(&mut self) -> Result<String> {
        Ok(self.page.content().await?)
    }

    async fn has_element(&mut self, selector: &str) -> Result<bool> {
        let elements = self.page.find_elements(selector).await?;
        Ok(!elements.is_empty())
    }

    async fn scroll_to_bottom(&mut self) -> Result<()> {
        self.page
            .evaluate("window.scrollTo(0, document.body.scrollHeight);")
            .await?;
        Ok(())
    }

    async fn click_link(&mut self, href_fragment: &str) -> Result<bool> {
        let selector = format!("a[href*=\"{}\"]", href_fragment.replace('"', "\\\""));
        let Some(anchor) = self.page.find_elements(selector).await?.into_iter().next() else {
            return Ok(false);
        };
        anchor.scroll_into_view().await?;
        anchor.click().await?;
        Ok(true)
    }

    async fn is_alive(&mut self) -> bool {
        self.page.url().await.is_ok()
    }

    async fn quit(&mut self) -> Result<()> {
        if let Err(e) = self.browser.close().await {
            tracing::debug!("Browser close failed: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Browser wait failed: {}", e);
        }
        self.handler.abort();
        Ok(())
    }
}
