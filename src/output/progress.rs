//! Progress bar utilities.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

use crate::download::format_elapsed;

/// Create a spinner for long-running operations.
pub fn create_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Create a progress bar for item counts.
pub fn create_item_bar(total: u64, message: &str) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template(&format!(
                "{{spinner:.green}} {} [{{bar:40.cyan/blue}}] {{pos}}/{{len}}",
                message
            ))
            .unwrap()
            .progress_chars("#>-"),
    );
    bar
}

/// Progress through the artworks of one listing page.
pub struct PageProgress {
    page: u32,
    total: u64,
    done: u64,
    started: Instant,
    bar: ProgressBar,
}

impl PageProgress {
    pub fn new(page: u32, total: u64, visible: bool) -> Self {
        let bar = if visible {
            create_item_bar(total, &format!("Page {}", page))
        } else {
            ProgressBar::hidden()
        };
        Self {
            page,
            total,
            done: 0,
            started: Instant::now(),
            bar,
        }
    }

    /// Count one finished artwork and log the progress line.
    pub fn tick(&mut self) {
        self.done += 1;
        self.bar.inc(1);
        let line = progress_line(self.page, self.done, self.total, self.started.elapsed());
        self.bar.suspend(|| tracing::info!("{}", line));
    }

    pub fn finish(self) {
        self.bar.finish_and_clear();
    }
}

/// `Downloading Page N: P% i/n [MM:SS, X.XXs/artwork]`
pub fn progress_line(page: u32, done: u64, total: u64, elapsed: Duration) -> String {
    let percent = if total == 0 { 100 } else { done * 100 / total };
    let per_artwork = if done == 0 {
        0.0
    } else {
        elapsed.as_secs_f64() / done as f64
    };
    format!(
        "Downloading Page {}: {}% {}/{} [{}, {:.2}s/artwork]",
        page,
        percent,
        done,
        total,
        format_elapsed(elapsed),
        per_artwork
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_line() {
        assert_eq!(
            progress_line(2, 3, 12, Duration::from_secs(75)),
            "Downloading Page 2: 25% 3/12 [01:15, 25.00s/artwork]"
        );
        assert_eq!(
            progress_line(1, 0, 0, Duration::ZERO),
            "Downloading Page 1: 100% 0/0 [00:00, 0.00s/artwork]"
        );
    }

    #[test]
    fn test_hidden_page_progress() {
        let mut progress = PageProgress::new(1, 2, false);
        progress.tick();
        progress.tick();
        assert_eq!(progress.done, 2);
        progress.finish();
    }
}
