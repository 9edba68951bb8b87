//! Console status lines, banner and the pre-run configuration summary.

use console::{style, StyledObject};

use crate::config::{Config, DownloadMode};

/// Severity tag printed in front of a status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Info,
    Ok,
    Warn,
    Error,
}

impl Status {
    fn tag(self) -> StyledObject<&'static str> {
        match self {
            Status::Info => style("INFO").cyan().bold(),
            Status::Ok => style("OK").green().bold(),
            Status::Warn => style("WARN").yellow().bold(),
            Status::Error => style("ERROR").red().bold(),
        }
    }
}

/// Render a status line; errors go to stderr, everything else to stdout.
pub fn print_status(status: Status, message: &str) {
    let line = format!("{} {}", status.tag(), message);
    if status == Status::Error {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

pub fn print_info(message: &str) {
    print_status(Status::Info, message);
}

pub fn print_success(message: &str) {
    print_status(Status::Ok, message);
}

pub fn print_warning(message: &str) {
    print_status(Status::Warn, message);
}

pub fn print_error(message: &str) {
    print_status(Status::Error, message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     pixiv downloader                                  ║
║     Original-resolution artwork archiver              ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// What the run is aimed at, phrased per download mode.
pub fn describe_target(config: &Config) -> String {
    let user = config.target.user_id.as_deref().unwrap_or("?");
    match config.options.download_mode {
        DownloadMode::All => format!("all artworks of user {}", user),
        DownloadMode::Page => format!("listing page {} of user {}", config.options.page, user),
        DownloadMode::Url => format!(
            "artwork {}",
            config.options.artwork_url.as_deref().unwrap_or("?")
        ),
        DownloadMode::Search => format!("overview of user {}", user),
    }
}

/// `(label, value)` rows of the configuration summary.
pub fn config_summary_rows(config: &Config) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Target", describe_target(config)),
        ("Mode", config.options.download_mode.to_string()),
    ];
    if config.options.download_mode != DownloadMode::Search {
        let layout = if config.options.separate_artworks {
            "one folder per artwork"
        } else {
            "flat"
        };
        rows.push((
            "Directory",
            format!("{} ({})", config.options.download_directory.display(), layout),
        ));
    }
    rows.push((
        "Browser",
        if config.options.show_browser { "visible" } else { "headless" }.to_string(),
    ));
    rows.push(("Cookies", config.account.cookie_file.display().to_string()));
    rows.push(("Log", config.options.log_file.display().to_string()));
    rows
}

/// Print the configuration the run is about to use.
pub fn print_config_summary(config: &Config) {
    println!();
    println!("{}", style("Configuration:").bold());
    for (label, value) in config_summary_rows(config) {
        println!("  {}: {}", style(label).dim(), value);
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(mode: DownloadMode) -> Config {
        let mut config = Config::default();
        config.options.download_mode = mode;
        config.target.user_id = Some("4242".into());
        config
    }

    #[test]
    fn test_describe_target_per_mode() {
        assert_eq!(describe_target(&config(DownloadMode::All)), "all artworks of user 4242");

        let mut page = config(DownloadMode::Page);
        page.options.page = 3;
        assert_eq!(describe_target(&page), "listing page 3 of user 4242");

        let mut url = config(DownloadMode::Url);
        url.options.artwork_url = Some("https://www.pixiv.net/en/artworks/1".into());
        assert_eq!(
            describe_target(&url),
            "artwork https://www.pixiv.net/en/artworks/1"
        );
    }

    #[test]
    fn test_search_summary_has_no_directory() {
        let labels: Vec<&str> = config_summary_rows(&config(DownloadMode::Search))
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        assert_eq!(labels, vec!["Target", "Mode", "Browser", "Cookies", "Log"]);
    }

    #[test]
    fn test_directory_row_names_layout() {
        let mut config = config(DownloadMode::All);
        config.options.separate_artworks = true;
        let rows = config_summary_rows(&config);
        let (_, dir) = rows.iter().find(|(label, _)| *label == "Directory").unwrap();
        assert!(dir.ends_with("(one folder per artwork)"));
    }
}
