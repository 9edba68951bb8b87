//! Run orchestration.
//!
//! A `Downloader` owns the browser for the length of one run and drives it
//! through listing pages and artwork pages, handing image URLs to the
//! `ImageDownloader`. Every run produces a `RunReport`, including runs that
//! were cancelled or aborted by an error.

use std::collections::HashSet;
use std::iter;
use std::path::PathBuf;

use crate::browser::PageDriver;
use crate::config::{parse_artwork_id, Config, DownloadMode};
use crate::download::cancel::CancelFlag;
use crate::download::image::{ImageDownloader, ImageOutcome};
use crate::download::pagination::{advance, count_pages, PageAdvance, PaginationEnd};
use crate::download::retry::RetryPolicy;
use crate::download::state::{DownloadRecord, RunPhase, EXTRACTION_FAILED};
use crate::error::{Error, Result};
use crate::extract::{
    artwork_count, artwork_links, artwork_url, extract_image_urls, listing_page_url, user_url,
};
use crate::fs::{account_folder, artwork_folder};
use crate::output::PageProgress;

/// Present once a listing has rendered its artwork grid.
const ARTWORK_LINK_SELECTOR: &str = "a[href*='/artworks/']";

/// Present once a profile page has rendered its section headings.
const PROFILE_HEADING_SELECTOR: &str = "h2";

/// Present once an artwork page has rendered its images.
const ARTWORK_IMAGE_SELECTOR: &str = "img";

/// What a user search found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserOverview {
    pub user_id: String,
    pub artwork_count: u32,
    pub pages: u32,
    pub pagination_end: PaginationEnd,
}

/// Outcome of a download run.
#[derive(Debug)]
pub struct RunReport {
    pub record: DownloadRecord,
    /// Error that aborted the run early.
    pub error: Option<Error>,
}

impl RunReport {
    pub fn into_result(self) -> Result<DownloadRecord> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.record),
        }
    }
}

/// Result of running the configured mode.
#[derive(Debug)]
pub enum RunOutcome {
    Overview(Result<UserOverview>),
    Report(RunReport),
}

enum ArtworkStep {
    Finished,
    Failed,
    /// Cancelled, or the browser went away.
    Interrupted,
}

/// Drives one browser session through listing and artwork pages.
pub struct Downloader {
    driver: Box<dyn PageDriver>,
    config: Config,
    images: ImageDownloader,
    cancel: CancelFlag,
    navigation: RetryPolicy,
    pagination: RetryPolicy,
    show_progress: bool,
}

impl Downloader {
    pub fn new(
        driver: Box<dyn PageDriver>,
        config: Config,
        images: ImageDownloader,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            navigation: RetryPolicy::navigation(&config.network),
            pagination: RetryPolicy::pagination(&config.network),
            driver,
            config,
            images,
            cancel,
            show_progress: false,
        }
    }

    /// Draw a progress bar per listing page.
    pub fn with_progress(mut self, visible: bool) -> Self {
        self.show_progress = visible;
        self
    }

    /// Run whatever `download_mode` the config selects.
    pub async fn run(&mut self) -> RunOutcome {
        let user_id = self.config.target.user_id.clone().unwrap_or_default();

        match self.config.options.download_mode {
            DownloadMode::Search => RunOutcome::Overview(self.search_user(&user_id).await),
            DownloadMode::All => RunOutcome::Report(self.download_all(&user_id).await),
            DownloadMode::Page => {
                let page = self.config.options.page;
                RunOutcome::Report(self.download_page(&user_id, page).await)
            }
            DownloadMode::Url => {
                let input = self.config.options.artwork_url.clone().unwrap_or_default();
                RunOutcome::Report(self.download_url(&input).await)
            }
        }
    }

    /// Look up a user's artwork count and number of listing pages.
    pub async fn search_user(&mut self, user_id: &str) -> Result<UserOverview> {
        let count = self.read_artwork_count(user_id).await?;
        tracing::info!("User {} has {} artworks", user_id, count);

        let listing = listing_page_url(self.config.base_url(), user_id, 1);
        let (pages, pagination_end) = count_pages(
            self.driver.as_mut(),
            &listing,
            &self.config.network,
            &self.pagination,
            &self.cancel,
        )
        .await?;
        tracing::info!("User {} has {} listing page(s)", user_id, pages);

        Ok(UserOverview {
            user_id: user_id.to_string(),
            artwork_count: count,
            pages,
            pagination_end,
        })
    }

    /// Download every artwork of a user, walking all listing pages.
    pub async fn download_all(&mut self, user_id: &str) -> RunReport {
        let mut record = DownloadRecord::new(user_id, PathBuf::new());
        let result = self.walk_all(user_id, &mut record).await;
        self.finish(record, result)
    }

    /// Download the artworks of one listing page.
    pub async fn download_page(&mut self, user_id: &str, page: u32) -> RunReport {
        let mut record = DownloadRecord::new(user_id, PathBuf::new());
        let result = self.walk_page(user_id, page, &mut record).await;
        self.finish(record, result)
    }

    /// Download a single artwork by URL or ID.
    pub async fn download_url(&mut self, input: &str) -> RunReport {
        let mut record = DownloadRecord::new(input, PathBuf::new());
        let result = self.fetch_single(input, &mut record).await;
        self.finish(record, result)
    }

    /// Close the browser.
    pub async fn shutdown(mut self) -> Result<()> {
        tracing::debug!("Closing browser");
        self.driver.quit().await
    }

    async fn walk_all(&mut self, user_id: &str, record: &mut DownloadRecord) -> Result<()> {
        record.target_dir = account_folder(&self.config, user_id)?;
        record.enter(RunPhase::Listing);
        // Without a profile count the target grows with the links discovered.
        let counted = match self.read_artwork_count(user_id).await {
            Ok(count) => {
                record.target_count = u64::from(count);
                true
            }
            Err(Error::UserNotFound(_)) => {
                tracing::warn!(
                    "No artwork count on the profile of {}, walking the listing anyway",
                    user_id
                );
                record.target_count = 0;
                false
            }
            Err(e) => return Err(e),
        };

        let mut seen = HashSet::new();
        let mut page = 1;

        loop {
            if self.cancel.is_cancelled() {
                record.cancelled = true;
                break;
            }

            let listing = listing_page_url(self.config.base_url(), user_id, page);
            record.enter(RunPhase::Listing);
            let links: Vec<String> = self
                .open_listing(&listing)
                .await?
                .into_iter()
                .filter(|url| seen.insert(url.clone()))
                .collect();
            if !counted {
                record.target_count = seen.len() as u64;
            }
            tracing::info!(
                "Page {}: Found {} new artworks (Total so far: {})",
                page,
                links.len(),
                seen.len()
            );

            if !self.process_page(record, &links, page).await? {
                break;
            }

            record.enter(RunPhase::Listing);
            tracing::info!("Returning to artworks list: {}", listing);
            self.open_listing(&listing).await?;

            match advance(
                self.driver.as_mut(),
                page,
                &self.config.network,
                &self.pagination,
                &self.cancel,
            )
            .await?
            {
                PageAdvance::Advanced(next) => page = next,
                PageAdvance::Ended(PaginationEnd::Cancelled) => {
                    record.cancelled = true;
                    break;
                }
                PageAdvance::Ended(end) => {
                    record.pagination_end = Some(end);
                    break;
                }
            }
        }

        Ok(())
    }

    async fn walk_page(&mut self, user_id: &str, page: u32, record: &mut DownloadRecord) -> Result<()> {
        record.target_dir = account_folder(&self.config, user_id)?;
        record.enter(RunPhase::Listing);

        let listing = listing_page_url(self.config.base_url(), user_id, page);
        let links = self.open_listing(&listing).await?;
        record.target_count = links.len() as u64;
        tracing::info!("Page {}: Found {} artworks", page, links.len());

        self.process_page(record, &links, page).await?;
        Ok(())
    }

    async fn fetch_single(&mut self, input: &str, record: &mut DownloadRecord) -> Result<()> {
        let artwork_id = parse_artwork_id(input)?;
        let owner = self
            .config
            .target
            .user_id
            .clone()
            .unwrap_or_else(|| artwork_id.clone());
        record.target_dir = account_folder(&self.config, &owner)?;
        record.target_count = 1;

        let url = artwork_url(self.config.base_url(), &artwork_id);
        tracing::info!("Processing artwork URL: {}", url);

        let mut progress = PageProgress::new(1, 1, self.show_progress);
        match self.process_artwork(record, &url, 1).await? {
            ArtworkStep::Finished => progress.tick(),
            ArtworkStep::Failed => {}
            ArtworkStep::Interrupted => {
                record.interrupt_remaining(iter::once(&url), 1);
                record.cancelled = true;
                tracing::info!("Session interrupted. Stopping process.");
            }
        }
        progress.finish();
        Ok(())
    }

    /// Process the given artworks in order. Returns `false` when interrupted.
    async fn process_page(
        &mut self,
        record: &mut DownloadRecord,
        links: &[String],
        page: u32,
    ) -> Result<bool> {
        let mut progress = PageProgress::new(page, links.len() as u64, self.show_progress);

        for (index, artwork_url) in links.iter().enumerate() {
            let step = if self.cancel.is_cancelled() {
                ArtworkStep::Interrupted
            } else {
                self.process_artwork(record, artwork_url, page).await?
            };

            match step {
                ArtworkStep::Finished => {
                    progress.tick();
                    if record.target_count > 0 {
                        tracing::info!(
                            "Processed artworks: {}/{}",
                            record.processed_count,
                            record.target_count
                        );
                    }
                }
                ArtworkStep::Failed => {}
                ArtworkStep::Interrupted => {
                    record.interrupt_remaining(&links[index..], page);
                    record.cancelled = true;
                    progress.finish();
                    tracing::info!("Session interrupted. Stopping process on Page {}.", page);
                    return Ok(false);
                }
            }
        }

        progress.finish();
        Ok(true)
    }

    async fn process_artwork(
        &mut self,
        record: &mut DownloadRecord,
        artwork_url: &str,
        page: u32,
    ) -> Result<ArtworkStep> {
        record.enter(RunPhase::ExtractingArtwork);
        let Some(image_urls) = self.extract_with_retries(artwork_url).await? else {
            return Ok(ArtworkStep::Interrupted);
        };

        if image_urls.is_empty() {
            tracing::warn!("{}: {}", EXTRACTION_FAILED, artwork_url);
            record.fail_artwork(artwork_url, page, EXTRACTION_FAILED);
            return Ok(ArtworkStep::Failed);
        }

        let target_dir = artwork_folder(&self.config, &record.target_dir, artwork_url)?;
        record.enter(RunPhase::DownloadingImages);

        let mut all_skipped = true;
        for image_url in &image_urls {
            if self.cancel.is_cancelled() {
                return Ok(ArtworkStep::Interrupted);
            }

            match self.images.download(image_url, &target_dir, &self.cancel).await {
                ImageOutcome::Downloaded(_) => {
                    all_skipped = false;
                    record.images_downloaded += 1;
                }
                ImageOutcome::Skipped(_) => record.images_skipped += 1,
                ImageOutcome::Failed(reason) => {
                    all_skipped = false;
                    record.fail_image(image_url, artwork_url, page, reason);
                }
                ImageOutcome::Cancelled => return Ok(ArtworkStep::Interrupted),
            }
        }

        record.finish_artwork(all_skipped);
        Ok(ArtworkStep::Finished)
    }

    /// Image URLs of an artwork, retrying navigation. `None` when interrupted.
    async fn extract_with_retries(&mut self, artwork_url: &str) -> Result<Option<Vec<String>>> {
        let max_attempts = self.navigation.max_attempts();

        for attempt in 1..=max_attempts {
            if self.cancel.is_cancelled() {
                return Ok(None);
            }

            match self.try_extract(artwork_url).await {
                Ok(urls) if !urls.is_empty() => return Ok(Some(urls)),
                Ok(_) => tracing::warn!(
                    "Attempt {}/{}: no image URLs on {}",
                    attempt,
                    max_attempts,
                    artwork_url
                ),
                Err(e) => {
                    if !self.driver.is_alive().await {
                        tracing::warn!("Browser session lost on {}: {}", artwork_url, e);
                        return Ok(None);
                    }
                    tracing::warn!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt,
                        max_attempts,
                        artwork_url,
                        e
                    );
                }
            }

            if attempt < max_attempts {
                self.navigation.pause().await;
            }
        }

        Ok(Some(Vec::new()))
    }

    async fn try_extract(&mut self, artwork_url: &str) -> Result<Vec<String>> {
        self.driver.navigate(artwork_url).await?;
        self.driver
            .wait_for_selector(ARTWORK_IMAGE_SELECTOR, self.config.network.page_timeout())
            .await?;
        let html = self.driver.page_source().await?;
        Ok(extract_image_urls(&html, artwork_url))
    }

    /// Show a listing page and return its artwork links.
    async fn open_listing(&mut self, listing_url: &str) -> Result<Vec<String>> {
        if self.driver.current_url().await? != listing_url {
            self.driver.navigate(listing_url).await?;
        }

        match self
            .driver
            .wait_for_selector(ARTWORK_LINK_SELECTOR, self.config.network.page_timeout())
            .await
        {
            Ok(()) => {}
            Err(Error::Timeout(_)) => {
                tracing::warn!("No artworks rendered on {}", listing_url);
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        }

        let html = self.driver.page_source().await?;
        Ok(artwork_links(&html, self.config.base_url()))
    }

    async fn read_artwork_count(&mut self, user_id: &str) -> Result<u32> {
        let url = user_url(self.config.base_url(), user_id);
        self.driver.navigate(&url).await?;

        match self
            .driver
            .wait_for_selector(PROFILE_HEADING_SELECTOR, self.config.network.page_timeout())
            .await
        {
            Ok(()) | Err(Error::Timeout(_)) => {}
            Err(e) => return Err(e),
        }

        let html = self.driver.page_source().await?;
        artwork_count(&html).ok_or_else(|| Error::UserNotFound(user_id.to_string()))
    }

    fn finish(&self, mut record: DownloadRecord, result: Result<()>) -> RunReport {
        if self.cancel.is_cancelled() {
            record.cancelled = true;
        }

        let error = match result {
            Ok(()) => None,
            Err(e) => {
                tracing::error!("Run for {} aborted: {}", record.label, e);
                Some(e)
            }
        };

        record.enter(RunPhase::Summarized);
        RunReport { record, error }
    }
}
