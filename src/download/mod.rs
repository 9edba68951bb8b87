//! Download module.
//!
//! This module provides:
//! - Run orchestration over listing and artwork pages
//! - Listing pagination
//! - Image downloading with bounded retries
//! - Cancellation and run state tracking

pub mod cancel;
pub mod image;
pub mod pagination;
pub mod retry;
pub mod run;
pub mod state;

pub use cancel::CancelFlag;
pub use image::{image_filename, ImageDownloader, ImageOutcome};
pub use pagination::{advance, count_pages, PageAdvance, PaginationEnd};
pub use retry::RetryPolicy;
pub use run::{Downloader, RunOutcome, RunReport, UserOverview};
pub use state::{
    format_elapsed, ArtworkFailure, DownloadRecord, ImageFailure, RunPhase, EXTRACTION_FAILED,
    INTERRUPTED,
};
