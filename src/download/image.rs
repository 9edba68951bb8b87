//! Image file downloading.

use std::path::{Path, PathBuf};

use futures::StreamExt;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

use crate::config::Config;
use crate::download::cancel::CancelFlag;
use crate::download::retry::RetryPolicy;
use crate::error::{Error, Result};
use crate::fs::sanitize_filename;
use crate::session::SessionContext;

/// Result of downloading one image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Downloaded(PathBuf),
    /// A non-empty file with that name already existed.
    Skipped(PathBuf),
    /// Every attempt failed; carries the last error.
    Failed(String),
    Cancelled,
}

/// Downloads images through the session context with bounded retries.
#[derive(Debug, Clone)]
pub struct ImageDownloader {
    session: SessionContext,
    policy: RetryPolicy,
    show_downloads: bool,
    show_skipped: bool,
}

impl ImageDownloader {
    pub fn new(session: SessionContext, policy: RetryPolicy) -> Self {
        Self {
            session,
            policy,
            show_downloads: true,
            show_skipped: true,
        }
    }

    pub fn from_config(session: SessionContext, config: &Config) -> Self {
        Self {
            session,
            policy: RetryPolicy::downloads(&config.network),
            show_downloads: config.options.show_downloads,
            show_skipped: config.options.show_skipped_downloads,
        }
    }

    /// Download `url` into `target_dir`, skipping files that already exist.
    pub async fn download(&self, url: &str, target_dir: &Path, cancel: &CancelFlag) -> ImageOutcome {
        let filename = match image_filename(url) {
            Ok(name) => name,
            Err(e) => return ImageOutcome::Failed(e.to_string()),
        };
        let output_path = target_dir.join(&filename);

        if is_non_empty_file(&output_path).await {
            if self.show_skipped {
                tracing::info!("Skipped (already exists): {}", output_path.display());
            }
            return ImageOutcome::Skipped(output_path);
        }

        if let Err(e) = tokio::fs::create_dir_all(target_dir).await {
            return ImageOutcome::Failed(format!(
                "Failed to create {}: {}",
                target_dir.display(),
                e
            ));
        }

        let max_attempts = self.policy.max_attempts();
        let mut last_error = String::new();

        for attempt in 1..=max_attempts {
            if cancel.is_cancelled() {
                return ImageOutcome::Cancelled;
            }

            match self.fetch_to(url, &output_path).await {
                Ok(bytes) => {
                    if self.show_downloads {
                        tracing::info!("Downloaded: {} ({} bytes)", output_path.display(), bytes);
                    }
                    return ImageOutcome::Downloaded(output_path);
                }
                Err(e) => {
                    tracing::warn!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt,
                        max_attempts,
                        url,
                        e
                    );
                    last_error = e.to_string();
                    if attempt < max_attempts {
                        self.policy.pause().await;
                    }
                }
            }
        }

        tracing::error!("Failed to download {} after {} attempts", url, max_attempts);
        ImageOutcome::Failed(last_error)
    }

    /// One GET streamed into a partial file, renamed into place when complete.
    async fn fetch_to(&self, url: &str, output_path: &Path) -> Result<u64> {
        let response = self.session.get(url).await?;
        let part_path = partial_path(output_path);

        let result = stream_to_file(response, &part_path).await;
        match result {
            Ok(bytes) => {
                tokio::fs::rename(&part_path, output_path).await?;
                Ok(bytes)
            }
            Err(e) => {
                let _ = tokio::fs::remove_file(&part_path).await;
                Err(e)
            }
        }
    }
}

async fn stream_to_file(response: reqwest::Response, path: &Path) -> Result<u64> {
    let mut file = File::create(path).await?;
    let mut stream = response.bytes_stream();
    let mut written: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| Error::Download(format!("Stream error: {}", e)))?;
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    file.flush().await?;
    Ok(written)
}

/// File name of an image: the last path segment of its URL.
pub fn image_filename(url: &str) -> Result<String> {
    let parsed = url::Url::parse(url)?;
    let segment = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .unwrap_or_default();
    sanitize_filename(segment)
}

// Hidden sibling, unique per attempt.
fn partial_path(output_path: &Path) -> PathBuf {
    let name = output_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    output_path.with_file_name(format!(".{}.{}.part", name, uuid::Uuid::new_v4().simple()))
}

async fn is_non_empty_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file() && m.len() > 0)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const IMAGE_PATH: &str = "/img-original/img/2024/05/01/12/30/45/118000001_p0.jpg";

    fn downloader(attempts: u32) -> ImageDownloader {
        let session = SessionContext::new(&[], "test-agent", Duration::from_secs(5)).unwrap();
        ImageDownloader::new(session, RetryPolicy::immediate(attempts))
    }

    #[test]
    fn test_image_filename() {
        assert_eq!(
            image_filename("https://i.pximg.net/img-original/img/2024/05/01/12/30/45/1_p3.png")
                .unwrap(),
            "1_p3.png"
        );
        assert!(image_filename("https://i.pximg.net/").is_err());
        assert!(image_filename("not a url").is_err());
    }

    #[tokio::test]
    async fn test_download_writes_file() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(IMAGE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"JPEGDATA".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let url = format!("{}{}", server.uri(), IMAGE_PATH);
        let outcome = downloader(5).download(&url, dir.path(), &CancelFlag::new()).await;

        let expected = dir.path().join("118000001_p0.jpg");
        assert_eq!(outcome, ImageOutcome::Downloaded(expected.clone()));
        assert_eq!(std::fs::read(&expected).unwrap(), b"JPEGDATA");

        // No partial files left behind.
        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[tokio::test]
    async fn test_second_run_skips_existing() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(IMAGE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"JPEGDATA".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let url = format!("{}{}", server.uri(), IMAGE_PATH);
        let images = downloader(5);
        let cancel = CancelFlag::new();

        assert!(matches!(
            images.download(&url, dir.path(), &cancel).await,
            ImageOutcome::Downloaded(_)
        ));
        assert!(matches!(
            images.download(&url, dir.path(), &cancel).await,
            ImageOutcome::Skipped(_)
        ));
    }

    #[tokio::test]
    async fn test_empty_file_is_downloaded_again() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(IMAGE_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(b"X".to_vec()))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("118000001_p0.jpg"), b"").unwrap();
        let url = format!("{}{}", server.uri(), IMAGE_PATH);

        let outcome = downloader(1).download(&url, dir.path(), &CancelFlag::new()).await;
        assert!(matches!(outcome, ImageOutcome::Downloaded(_)));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(IMAGE_PATH))
            .respond_with(ResponseTemplate::new(500))
            .expect(5)
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let url = format!("{}{}", server.uri(), IMAGE_PATH);
        let outcome = downloader(5).download(&url, dir.path(), &CancelFlag::new()).await;

        match outcome {
            ImageOutcome::Failed(reason) => assert!(reason.contains("500")),
            other => panic!("expected failure, got {:?}", other),
        }
        assert!(!dir.path().join("118000001_p0.jpg").exists());
    }

    #[tokio::test]
    async fn test_cancelled_before_first_attempt() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let dir = tempfile::TempDir::new().unwrap();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let url = format!("{}{}", server.uri(), IMAGE_PATH);

        assert_eq!(
            downloader(5).download(&url, dir.path(), &cancel).await,
            ImageOutcome::Cancelled
        );
    }
}
