//! Run summary reporting.

use console::style;

use crate::download::{format_elapsed, DownloadRecord, UserOverview};

/// Summary lines of a run, as written to the terminal and the run log.
pub fn summary_lines(record: &DownloadRecord) -> Vec<String> {
    let mut lines = Vec::new();

    if !record.failed_artworks.is_empty() {
        lines.push("Failed artworks:".to_string());
        for failure in &record.failed_artworks {
            lines.push(format!(
                "  {} (Page {}): {}",
                failure.artwork_url, failure.page, failure.reason
            ));
        }
    }

    if !record.failed_downloads.is_empty() {
        lines.push("Failed downloads:".to_string());
        for failure in &record.failed_downloads {
            lines.push(format!(
                "  {} from {} (Page {}): {}",
                failure.image_url, failure.artwork_url, failure.page, failure.reason
            ));
        }
    }

    if let Some(end) = record.pagination_end.as_ref().filter(|end| end.is_suspect()) {
        lines.push(format!("Listing may be incomplete: {}", end));
    }

    if record.cancelled {
        lines.push("Run was interrupted before completion.".to_string());
    }

    lines.push(format!(
        "Total artworks processed: {}/{} ({} downloaded, {} skipped) in {}",
        record.processed_count,
        record.target_count,
        record.downloaded_count,
        record.skipped_count,
        format_elapsed(record.elapsed())
    ));

    lines
}

/// Print the end-of-run summary.
pub fn print_run_summary(record: &DownloadRecord) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style(format!("Summary for {}:", record.label)).bold());
    for line in summary_lines(record) {
        tracing::info!("{}", line);
    }
    println!(
        "  Images:   {} downloaded, {} skipped",
        style(record.images_downloaded).green(),
        style(record.images_skipped).yellow()
    );
    if record.has_failures() {
        println!(
            "  Failures: {} artworks, {} images",
            style(record.failed_artworks.len()).red(),
            style(record.failed_downloads.len()).red()
        );
    }
    println!("  Started:  {}", record.started_at.format("%Y-%m-%d %H:%M:%S"));
    println!("  Saved to: {}", record.target_dir.display());
    println!("{}", style("═".repeat(50)).dim());
}

/// Print what a user search found.
pub fn print_user_overview(overview: &UserOverview) {
    println!();
    println!(
        "{}",
        style(format!("User {}:", overview.user_id)).bold()
    );
    println!("  Artworks: {}", overview.artwork_count);
    println!("  Pages:    {}", overview.pages);
    if overview.pagination_end.is_suspect() {
        println!(
            "  {}",
            style(format!("Page count may be low: {}", overview.pagination_end)).yellow()
        );
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::download::PaginationEnd;

    #[test]
    fn test_summary_without_failures() {
        let mut record = DownloadRecord::new("4242", PathBuf::from("/tmp"));
        record.target_count = 2;
        record.finish_artwork(false);
        record.finish_artwork(true);

        let lines = summary_lines(&record);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].starts_with("Total artworks processed: 2/2 (1 downloaded, 1 skipped) in "));
    }

    #[test]
    fn test_summary_lists_failures() {
        let mut record = DownloadRecord::new("4242", PathBuf::from("/tmp"));
        record.target_count = 3;
        record.fail_artwork("https://www.pixiv.net/en/artworks/9", 2, "Session interrupted");
        record.fail_image(
            "https://i.pximg.net/img-original/img/2024/05/01/12/30/45/8_p0.png",
            "https://www.pixiv.net/en/artworks/8",
            1,
            "HTTP 404 Not Found".into(),
        );
        record.pagination_end = Some(PaginationEnd::Stalled("no navigation".into()));

        let lines = summary_lines(&record);
        assert_eq!(lines[0], "Failed artworks:");
        assert_eq!(
            lines[1],
            "  https://www.pixiv.net/en/artworks/9 (Page 2): Session interrupted"
        );
        assert_eq!(lines[2], "Failed downloads:");
        assert!(lines[3].contains("8_p0.png from https://www.pixiv.net/en/artworks/8 (Page 1)"));
        assert!(lines[4].starts_with("Listing may be incomplete"));
        assert!(lines[5].starts_with("Total artworks processed: 0/3"));
    }
}
