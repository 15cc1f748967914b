//! Direct streamed HTTP download.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::path::Path;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::acquire::AcquisitionStrategy;
use crate::error::{MediaError, MediaResult};

/// Refuse bodies larger than this.
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 2 * 1024 * 1024 * 1024;

/// Streams a URL's body to disk chunk by chunk.
#[derive(Debug, Clone)]
pub struct DirectHttpFetcher {
    http: Client,
    max_bytes: u64,
}

impl DirectHttpFetcher {
    pub fn new() -> MediaResult<Self> {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .pool_idle_timeout(Duration::from_secs(90))
            .user_agent(concat!("reelcap-media/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            max_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
        })
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

#[async_trait]
impl AcquisitionStrategy for DirectHttpFetcher {
    fn name(&self) -> &'static str {
        "direct"
    }

    async fn fetch(&self, url: &str, dest: &Path, _duration_hint: Option<f64>) -> MediaResult<()> {
        debug!("Fetching {} to {}", url, dest.display());

        let mut response = self.http.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::download_failed(format!(
                "HTTP {} from {}",
                status, url
            )));
        }

        // An HTML body is a landing or error page, never the media itself.
        if let Some(content_type) = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
        {
            if content_type.to_ascii_lowercase().starts_with("text/html") {
                return Err(MediaError::download_failed(format!(
                    "{} returned an HTML page",
                    url
                )));
            }
        }

        if let Some(len) = response.content_length() {
            if len > self.max_bytes {
                return Err(MediaError::download_failed(format!(
                    "body of {} bytes exceeds limit of {}",
                    len, self.max_bytes
                )));
            }
        }

        let mut file = tokio::fs::File::create(dest).await?;
        let mut written: u64 = 0;

        while let Some(chunk) = response.chunk().await? {
            written += chunk.len() as u64;
            if written > self.max_bytes {
                return Err(MediaError::download_failed(format!(
                    "body exceeds limit of {} bytes",
                    self.max_bytes
                )));
            }
            file.write_all(&chunk).await?;
        }

        file.flush().await?;
        file.sync_all().await?;

        info!("Fetched {} bytes from {}", written, url);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_streams_body_to_disk() {
        let server = MockServer::start().await;
        let body = vec![7u8; 300_000];
        Mock::given(method("GET"))
            .and(path("/video.mp4"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "video/mp4")
                    .set_body_bytes(body.clone()),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("source.mp4.tmp");
        let fetcher = DirectHttpFetcher::new().unwrap();

        fetcher
            .fetch(&format!("{}/video.mp4", server.uri()), &dest, None)
            .await
            .unwrap();

        assert_eq!(tokio::fs::read(&dest).await.unwrap(), body);
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("source.mp4.tmp");
        let err = DirectHttpFetcher::new()
            .unwrap()
            .fetch(&format!("{}/missing.mp4", server.uri()), &dest, None)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::DownloadFailed { .. }));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_fetch_rejects_html_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html; charset=utf-8")
                    .set_body_string("<html>sign in</html>"),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("source.mp4.tmp");
        let err = DirectHttpFetcher::new()
            .unwrap()
            .fetch(&format!("{}/watch", server.uri()), &dest, None)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("HTML"));
    }

    #[tokio::test]
    async fn test_fetch_enforces_size_cap() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "video/mp4")
                    .set_body_bytes(vec![0u8; 4096]),
            )
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let dest = dir.path().join("source.mp4.tmp");
        let err = DirectHttpFetcher::new()
            .unwrap()
            .with_max_bytes(1024)
            .fetch(&format!("{}/big.mp4", server.uri()), &dest, None)
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::DownloadFailed { .. }));
    }
}
