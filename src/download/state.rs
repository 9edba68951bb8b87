//! Run state tracking.

use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};

use crate::download::pagination::PaginationEnd;

/// Reason recorded for artworks left unprocessed by a stop request.
pub const INTERRUPTED: &str = "Session interrupted";

/// Reason recorded when an artwork page yields no image URLs.
pub const EXTRACTION_FAILED: &str = "Failed to extract image URLs";

/// Where a run currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunPhase {
    #[default]
    Idle,
    Listing,
    ExtractingArtwork,
    DownloadingImages,
    Summarized,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunPhase::Idle => write!(f, "idle"),
            RunPhase::Listing => write!(f, "listing"),
            RunPhase::ExtractingArtwork => write!(f, "extracting artwork"),
            RunPhase::DownloadingImages => write!(f, "downloading images"),
            RunPhase::Summarized => write!(f, "summarized"),
        }
    }
}

/// An artwork that could not be processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtworkFailure {
    pub artwork_url: String,
    pub page: u32,
    pub reason: String,
}

/// An image that failed after every attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFailure {
    pub image_url: String,
    pub artwork_url: String,
    pub page: u32,
    pub reason: String,
}

/// Counters and failure lists for one run.
#[derive(Debug)]
pub struct DownloadRecord {
    /// Account folder or artwork ID the run targets.
    pub label: String,
    pub target_dir: PathBuf,

    phase: RunPhase,
    started: Instant,
    pub started_at: DateTime<Local>,

    /// Artworks the run expects to process, when known.
    pub target_count: u64,

    // Statistics
    pub processed_count: u64,
    pub downloaded_count: u64,
    pub skipped_count: u64,
    pub images_downloaded: u64,
    pub images_skipped: u64,

    pub failed_artworks: Vec<ArtworkFailure>,
    pub failed_downloads: Vec<ImageFailure>,

    /// Why the listing walk stopped, for walks that visited several pages.
    pub pagination_end: Option<PaginationEnd>,
    pub cancelled: bool,
}

impl DownloadRecord {
    pub fn new(label: impl Into<String>, target_dir: PathBuf) -> Self {
        Self {
            label: label.into(),
            target_dir,
            phase: RunPhase::Idle,
            started: Instant::now(),
            started_at: Local::now(),
            target_count: 0,
            processed_count: 0,
            downloaded_count: 0,
            skipped_count: 0,
            images_downloaded: 0,
            images_skipped: 0,
            failed_artworks: Vec::new(),
            failed_downloads: Vec::new(),
            pagination_end: None,
            cancelled: false,
        }
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    pub fn enter(&mut self, phase: RunPhase) {
        if self.phase != phase {
            tracing::debug!("Run {}: {} -> {}", self.label, self.phase, phase);
            self.phase = phase;
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Count a finished artwork; it is "skipped" only if every image was.
    pub fn finish_artwork(&mut self, all_skipped: bool) {
        self.processed_count += 1;
        if all_skipped {
            self.skipped_count += 1;
        } else {
            self.downloaded_count += 1;
        }
    }

    pub fn fail_artwork(&mut self, artwork_url: &str, page: u32, reason: impl Into<String>) {
        self.failed_artworks.push(ArtworkFailure {
            artwork_url: artwork_url.to_string(),
            page,
            reason: reason.into(),
        });
    }

    pub fn fail_image(&mut self, image_url: &str, artwork_url: &str, page: u32, reason: String) {
        self.failed_downloads.push(ImageFailure {
            image_url: image_url.to_string(),
            artwork_url: artwork_url.to_string(),
            page,
            reason,
        });
    }

    /// Record every artwork in `remaining` as interrupted.
    pub fn interrupt_remaining<'a>(&mut self, remaining: impl IntoIterator<Item = &'a String>, page: u32) {
        for url in remaining {
            self.fail_artwork(url, page, INTERRUPTED);
        }
    }

    pub fn has_failures(&self) -> bool {
        !self.failed_artworks.is_empty() || !self.failed_downloads.is_empty()
    }
}

/// Format a duration as `MM:SS`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finish_artwork_counters() {
        let mut record = DownloadRecord::new("pixiv_1_images", PathBuf::from("/tmp"));
        record.finish_artwork(true);
        record.finish_artwork(false);
        record.finish_artwork(false);
        assert_eq!(record.processed_count, 3);
        assert_eq!(record.skipped_count, 1);
        assert_eq!(record.downloaded_count, 2);
    }

    #[test]
    fn test_interrupt_remaining() {
        let mut record = DownloadRecord::new("x", PathBuf::new());
        let urls = vec!["a".to_string(), "b".to_string()];
        record.interrupt_remaining(&urls, 4);
        assert_eq!(record.failed_artworks.len(), 2);
        assert!(record.failed_artworks.iter().all(|f| f.reason == INTERRUPTED && f.page == 4));
        assert!(record.has_failures());
    }

    #[test]
    fn test_phase_transitions() {
        let mut record = DownloadRecord::new("x", PathBuf::new());
        assert_eq!(record.phase(), RunPhase::Idle);
        record.enter(RunPhase::Listing);
        record.enter(RunPhase::Summarized);
        assert_eq!(record.phase(), RunPhase::Summarized);
    }

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_secs(0)), "00:00");
        assert_eq!(format_elapsed(Duration::from_secs(125)), "02:05");
        assert_eq!(format_elapsed(Duration::from_secs(3600)), "60:00");
    }
}
