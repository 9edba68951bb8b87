//! Listing pagination walker.

use std::fmt;

use crate::browser::PageDriver;
use crate::config::NetworkConfig;
use crate::download::cancel::CancelFlag;
use crate::download::retry::RetryPolicy;
use crate::error::{Error, Result};
use crate::extract::next_page_href;

/// Why a listing walk stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaginationEnd {
    /// The paginator is there but has no link to the next page.
    LastPage,
    /// The listing has no pagination container.
    NoPaginator,
    /// A next-page link was found but navigation never happened.
    Stalled(String),
    Cancelled,
}

impl PaginationEnd {
    /// Whether the walk may have stopped before the real last page.
    pub fn is_suspect(&self) -> bool {
        matches!(self, PaginationEnd::Stalled(_))
    }
}

impl fmt::Display for PaginationEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaginationEnd::LastPage => write!(f, "reached the last page"),
            PaginationEnd::NoPaginator => write!(f, "no pagination on the listing"),
            PaginationEnd::Stalled(reason) => write!(f, "pagination stalled: {}", reason),
            PaginationEnd::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Result of trying to move to the next listing page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageAdvance {
    Advanced(u32),
    Ended(PaginationEnd),
}

/// Advance the listing currently shown on `page` to `page + 1`.
///
/// Each attempt scrolls down, waits for the paginator, clicks the link to the
/// next page and waits for the URL to change. Failed attempts, driver errors
/// included, are retried per `policy`; the last failure decides how the walk
/// ended. A lost browser session ends the walk at once.
pub async fn advance(
    driver: &mut dyn PageDriver,
    page: u32,
    network: &NetworkConfig,
    policy: &RetryPolicy,
    cancel: &CancelFlag,
) -> Result<PageAdvance> {
    let next = page + 1;
    let max_attempts = policy.max_attempts();
    let mut end = PaginationEnd::NoPaginator;

    for attempt in 1..=max_attempts {
        if cancel.is_cancelled() {
            return Ok(PageAdvance::Ended(PaginationEnd::Cancelled));
        }

        let outcome = match try_advance(driver, next, network).await {
            Ok(outcome) => outcome,
            Err(e) if !driver.is_alive().await => {
                tracing::warn!("Browser session lost while leaving page {}: {}", page, e);
                return Ok(PageAdvance::Ended(PaginationEnd::Stalled(format!(
                    "browser session lost: {}",
                    e
                ))));
            }
            Err(e) => Some(PaginationEnd::Stalled(e.to_string())),
        };

        match outcome {
            None => {
                tracing::debug!("Moved to page {}", next);
                policy.pause().await;
                return Ok(PageAdvance::Advanced(next));
            }
            Some(reason) => {
                tracing::debug!(
                    "Next page attempt {}/{} on page {}: {}",
                    attempt,
                    max_attempts,
                    page,
                    reason
                );
                end = reason;
            }
        }

        if attempt < max_attempts {
            policy.pause().await;
        }
    }

    if end.is_suspect() {
        tracing::warn!("Stopping at page {}: {}", page, end);
    } else {
        tracing::info!("Stopping at page {}: {}", page, end);
    }
    Ok(PageAdvance::Ended(end))
}

// `None` on success, otherwise why this attempt did not advance.
async fn try_advance(
    driver: &mut dyn PageDriver,
    next: u32,
    network: &NetworkConfig,
) -> Result<Option<PaginationEnd>> {
    driver.scroll_to_bottom().await?;

    match driver
        .wait_for_selector(&network.paginator_selector, network.page_timeout())
        .await
    {
        Ok(()) => {}
        Err(Error::Timeout(_)) => return Ok(Some(PaginationEnd::NoPaginator)),
        Err(e) => return Err(e),
    }

    let html = driver.page_source().await?;
    let Some(href) = next_page_href(&html, next) else {
        return Ok(Some(PaginationEnd::LastPage));
    };

    let previous = driver.current_url().await?;
    if !driver.click_link(&href).await? {
        return Ok(Some(PaginationEnd::LastPage));
    }

    match driver
        .wait_for_url_change(&previous, network.page_timeout())
        .await
    {
        Ok(_) => Ok(None),
        Err(Error::Timeout(_)) => Ok(Some(PaginationEnd::Stalled(format!(
            "clicking {} did not leave {}",
            href, previous
        )))),
        Err(e) => Err(e),
    }
}

/// Open `listing_url` and count its pages by walking until the walk ends.
pub async fn count_pages(
    driver: &mut dyn PageDriver,
    listing_url: &str,
    network: &NetworkConfig,
    policy: &RetryPolicy,
    cancel: &CancelFlag,
) -> Result<(u32, PaginationEnd)> {
    driver.navigate(listing_url).await?;

    let mut page = 1;
    loop {
        match advance(driver, page, network, policy, cancel).await? {
            PageAdvance::Advanced(next) => page = next,
            PageAdvance::Ended(end) => return Ok((page, end)),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::browser::testing::FakeDriver;
    use crate::extract::listing_page_url;

    pub const BASE: &str = "https://www.pixiv.net";
    pub const USER: &str = "4242";

    /// A listing page with the given artworks and links to `links` pages.
    pub fn listing_html(artwork_ids: &[u64], links: &[u32]) -> String {
        let mut html = String::from("<html><body><section><ul>");
        for id in artwork_ids {
            html.push_str(&format!(
                "<li><a href=\"/en/artworks/{id}\"><img src=\"t.jpg\"></a></li>"
            ));
        }
        html.push_str("</ul></section>");
        if !links.is_empty() {
            html.push_str("<nav class=\"sc-xhhh7v-0 kYDpSN\">");
            for p in links {
                html.push_str(&format!(
                    "<a href=\"/en/users/{USER}/artworks?p={p}\">{p}</a>"
                ));
            }
            html.push_str("</nav>");
        }
        html.push_str("</body></html>");
        html
    }

    pub fn fast_network() -> NetworkConfig {
        NetworkConfig {
            page_timeout_seconds: 0,
            ..NetworkConfig::default()
        }
    }

    fn three_pages() -> FakeDriver {
        FakeDriver::new([
            (listing_page_url(BASE, USER, 1), listing_html(&[3], &[1, 2, 3])),
            (listing_page_url(BASE, USER, 2), listing_html(&[2], &[1, 2, 3])),
            (listing_page_url(BASE, USER, 3), listing_html(&[1], &[1, 2, 3])),
        ])
    }

    #[tokio::test]
    async fn test_advance_moves_to_next_page() {
        let mut driver = three_pages();
        driver.navigate(&listing_page_url(BASE, USER, 1)).await.unwrap();

        let result = advance(
            &mut driver,
            1,
            &fast_network(),
            &RetryPolicy::immediate(3),
            &CancelFlag::new(),
        )
        .await
        .unwrap();

        assert_eq!(result, PageAdvance::Advanced(2));
        assert_eq!(
            driver.current_url().await.unwrap(),
            listing_page_url(BASE, USER, 2)
        );
    }

    #[tokio::test]
    async fn test_count_pages_stops_at_last_page() {
        let mut driver = three_pages();
        let (pages, end) = count_pages(
            &mut driver,
            &listing_page_url(BASE, USER, 1),
            &fast_network(),
            &RetryPolicy::immediate(3),
            &CancelFlag::new(),
        )
        .await
        .unwrap();

        assert_eq!(pages, 3);
        assert_eq!(end, PaginationEnd::LastPage);
    }

    #[tokio::test]
    async fn test_missing_paginator_ends_after_bounded_attempts() {
        let url = listing_page_url(BASE, USER, 1);
        let mut driver = FakeDriver::new([(url.clone(), listing_html(&[1], &[]))]);
        driver.navigate(&url).await.unwrap();

        let result = advance(
            &mut driver,
            1,
            &fast_network(),
            &RetryPolicy::immediate(3),
            &CancelFlag::new(),
        )
        .await
        .unwrap();

        assert_eq!(result, PageAdvance::Ended(PaginationEnd::NoPaginator));
        assert!(driver.log.lock().unwrap().clicks.is_empty());
    }

    #[tokio::test]
    async fn test_link_that_never_navigates_is_stalled() {
        let mut driver = three_pages();
        driver.clicks_navigate = false;
        driver.navigate(&listing_page_url(BASE, USER, 1)).await.unwrap();

        let result = advance(
            &mut driver,
            1,
            &fast_network(),
            &RetryPolicy::immediate(3),
            &CancelFlag::new(),
        )
        .await
        .unwrap();

        match result {
            PageAdvance::Ended(end @ PaginationEnd::Stalled(_)) => assert!(end.is_suspect()),
            other => panic!("expected stall, got {:?}", other),
        }
        assert_eq!(driver.log.lock().unwrap().clicks.len(), 3);
    }

    #[tokio::test]
    async fn test_click_error_is_retried() {
        let mut driver = three_pages();
        driver.failing_clicks = 1;
        driver.navigate(&listing_page_url(BASE, USER, 1)).await.unwrap();

        let result = advance(
            &mut driver,
            1,
            &fast_network(),
            &RetryPolicy::immediate(3),
            &CancelFlag::new(),
        )
        .await
        .unwrap();

        assert_eq!(result, PageAdvance::Advanced(2));
        assert_eq!(driver.log.lock().unwrap().clicks.len(), 2);
    }

    #[tokio::test]
    async fn test_persistent_click_errors_end_walk_as_stalled() {
        let mut driver = three_pages();
        driver.failing_clicks = u32::MAX;
        driver.navigate(&listing_page_url(BASE, USER, 1)).await.unwrap();

        let result = advance(
            &mut driver,
            1,
            &fast_network(),
            &RetryPolicy::immediate(3),
            &CancelFlag::new(),
        )
        .await
        .unwrap();

        match result {
            PageAdvance::Ended(PaginationEnd::Stalled(reason)) => {
                assert!(reason.contains("element not interactable"))
            }
            other => panic!("expected stall, got {:?}", other),
        }
        assert_eq!(driver.log.lock().unwrap().clicks.len(), 3);
    }

    #[tokio::test]
    async fn test_lost_browser_ends_walk_immediately() {
        let mut driver = three_pages();
        driver.failing_clicks = u32::MAX;
        driver.alive = false;
        driver.navigate(&listing_page_url(BASE, USER, 1)).await.unwrap();

        let result = advance(
            &mut driver,
            1,
            &fast_network(),
            &RetryPolicy::immediate(3),
            &CancelFlag::new(),
        )
        .await
        .unwrap();

        assert!(matches!(
            result,
            PageAdvance::Ended(PaginationEnd::Stalled(ref reason)) if reason.contains("session lost")
        ));
        assert_eq!(driver.log.lock().unwrap().clicks.len(), 1);
    }

    #[tokio::test]
    async fn test_cancel_ends_walk() {
        let mut driver = three_pages();
        driver.navigate(&listing_page_url(BASE, USER, 1)).await.unwrap();
        let cancel = CancelFlag::new();
        cancel.cancel();

        let result = advance(
            &mut driver,
            1,
            &fast_network(),
            &RetryPolicy::immediate(3),
            &cancel,
        )
        .await
        .unwrap();
        assert_eq!(result, PageAdvance::Ended(PaginationEnd::Cancelled));
    }
}
