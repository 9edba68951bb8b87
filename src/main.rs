//! pixiv downloader - CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use pixiv_downloader::{
    browser::{validate_session, ChromeDriver, PageDriver},
    cli::Args,
    config::{validate_config, Config},
    download::{CancelFlag, Downloader, ImageDownloader, RunOutcome},
    error::{exit_codes, Error, Result},
    output::{
        create_spinner, init_logging, print_banner, print_config_summary, print_error,
        print_info, print_run_summary, print_success, print_user_overview, print_warning,
    },
    session::{parse_cookie_string, CookieStore, SessionContext},
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::InvalidCookies(_)
                | Error::TomlParse(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                Error::Authentication(_)
                | Error::UserNotFound(_)
                | Error::Browser(_)
                | Error::Timeout(_)
                | Error::Cdp(_) => ExitCode::from(exit_codes::SITE_ERROR as u8),
                Error::Download(_) | Error::Http(_) | Error::InvalidFilename(_) => {
                    ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8)
                }
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<i32> {
    // Parse CLI arguments
    let args = Args::parse();

    print_banner();

    // Load configuration
    let mut config = if args.config.exists() {
        Config::load(&args.config)?
    } else {
        print_warning(&format!(
            "Configuration file not found: {}",
            args.config.display()
        ));
        print_info("Using default configuration with CLI arguments");
        Config::default()
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    init_logging(args.debug, Some(config.options.log_file.as_path()))?;

    // Cookie management happens before validation so it works without a target.
    let store = CookieStore::new(&config.account.cookie_file);
    if args.clear_cookies {
        if store.clear()? {
            print_success(&format!("Removed saved cookies: {}", store.path().display()));
        } else {
            print_info("No saved cookies to remove");
        }
        return Ok(exit_codes::SUCCESS);
    }

    if let Some(ref raw) = args.cookie {
        let cookies = parse_cookie_string(raw)?;
        if cookies.is_empty() {
            return Err(Error::InvalidCookies("no name=value pairs found".into()));
        }
        store.save(&cookies)?;
    }

    validate_config(&config)?;

    let cookies = store.load()?.ok_or_else(|| {
        Error::MissingConfig(format!(
            "no saved cookies in {}; pass --cookie with your pixiv cookie string",
            store.path().display()
        ))
    })?;

    print_config_summary(&config);

    // Launch the browser and check the session
    let spinner = create_spinner("Launching browser...");
    let launched = ChromeDriver::launch(&config, &cookies).await;
    spinner.finish_and_clear();
    let mut driver = launched?;

    if let Err(e) = validate_session(&mut driver, config.base_url()).await {
        let _ = driver.quit().await;
        return Err(e);
    }
    print_success("Session is valid");

    let session = SessionContext::new(
        &cookies,
        &config.account.user_agent,
        config.network.download_timeout(),
    )?;
    let images = ImageDownloader::from_config(session, &config);
    let cancel = CancelFlag::new();
    let downloader = Downloader::new(Box::new(driver), config.clone(), images, cancel.clone())
        .with_progress(!args.quiet);

    // The worker owns the browser; this task only listens for Ctrl-C.
    let mut worker = tokio::spawn(async move {
        let mut downloader = downloader;
        let outcome = downloader.run().await;
        if let Err(e) = downloader.shutdown().await {
            tracing::warn!("Failed to close browser: {}", e);
        }
        outcome
    });

    let joined = tokio::select! {
        joined = &mut worker => joined,
        _ = tokio::signal::ctrl_c() => {
            print_warning("Stop requested, finishing the current step...");
            cancel.cancel();
            worker.await
        }
    };
    let outcome = joined.map_err(|e| Error::Browser(format!("Download task failed: {}", e)))?;

    match outcome {
        RunOutcome::Overview(overview) => {
            print_user_overview(&overview?);
            Ok(exit_codes::SUCCESS)
        }
        RunOutcome::Report(report) => {
            print_run_summary(&report.record);
            let record = report.into_result()?;
            if record.cancelled {
                Ok(exit_codes::ABORT)
            } else if record.has_failures() {
                print_warning("Some artworks or images failed; re-run to retry them");
                Ok(exit_codes::DOWNLOAD_ERROR)
            } else {
                Ok(exit_codes::SUCCESS)
            }
        }
    }
}
