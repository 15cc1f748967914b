//! Source video acquisition.
//!
//! A URL is resolved into a local, validated file by one or two
//! [`AcquisitionStrategy`] attempts:
//!
//! - streaming hosts go straight to the extractor, with no fallback;
//! - every other URL tries the direct fetcher first and falls back to the
//!   extractor exactly once when the fetch fails, is undersized, or does not
//!   probe as video.
//!
//! Each attempt writes into a `.tmp` sibling of the destination. The file is
//! promoted to the final name only after it passes validation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

use crate::command::ProcessRunner;
use crate::download::YtDlpExtractor;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{file_size, move_file, remove_if_exists, temp_sibling};
use crate::http_fetch::DirectHttpFetcher;
use crate::probe::FfprobeValidator;

/// Downloads at or below this size are treated as error pages or empty bodies.
pub const MIN_VIDEO_FILE_SIZE: u64 = 100 * 1024;

/// Hosts that serve pages rather than media bytes and need the extractor.
const STREAMING_HOSTS: &[&str] = &[
    "youtube.com",
    "youtu.be",
    "vimeo.com",
    "tiktok.com",
    "instagram.com",
    "twitter.com",
    "x.com",
    "twitch.tv",
    "facebook.com",
    "fb.watch",
    "dailymotion.com",
];

/// Whether `url` points at a known streaming host (the domain or any subdomain).
pub fn is_streaming_host(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    let host = host.trim_end_matches('.').to_ascii_lowercase();

    STREAMING_HOSTS.iter().any(|domain| {
        host == *domain
            || host
                .strip_suffix(domain)
                .is_some_and(|prefix| prefix.ends_with('.'))
    })
}

/// One way of turning a URL into bytes on disk.
#[async_trait]
pub trait AcquisitionStrategy: Send + Sync {
    /// Short name used in logs and in [`AcquiredVideo::strategy`].
    fn name(&self) -> &'static str;

    /// Write the video behind `url` to exactly `dest`.
    async fn fetch(&self, url: &str, dest: &Path, duration_hint: Option<f64>) -> MediaResult<()>;
}

/// Decides whether a downloaded file is a usable video.
#[async_trait]
pub trait VideoValidator: Send + Sync {
    async fn validate(&self, path: &Path) -> MediaResult<()>;
}

/// A validated local copy of the source.
#[derive(Debug, Clone)]
pub struct AcquiredVideo {
    pub path: PathBuf,
    pub size: u64,
    /// Name of the strategy that produced the file
    pub strategy: &'static str,
}

/// Resolves source URLs into local, validated video files.
#[derive(Clone)]
pub struct VideoAcquirer {
    direct: Arc<dyn AcquisitionStrategy>,
    extractor: Arc<dyn AcquisitionStrategy>,
    validator: Arc<dyn VideoValidator>,
    min_file_size: u64,
}

impl VideoAcquirer {
    pub fn new(
        direct: Arc<dyn AcquisitionStrategy>,
        extractor: Arc<dyn AcquisitionStrategy>,
        validator: Arc<dyn VideoValidator>,
    ) -> Self {
        Self {
            direct,
            extractor,
            validator,
            min_file_size: MIN_VIDEO_FILE_SIZE,
        }
    }

    /// Direct HTTP fetch, yt-dlp extractor and ffprobe validation, all run
    /// through `runner`.
    pub fn with_defaults(runner: ProcessRunner) -> MediaResult<Self> {
        Ok(Self::new(
            Arc::new(DirectHttpFetcher::new()?),
            Arc::new(YtDlpExtractor::new(runner.clone())),
            Arc::new(FfprobeValidator::new(runner)),
        ))
    }

    /// Override the size threshold. Files must be strictly larger than this.
    pub fn with_min_file_size(mut self, bytes: u64) -> Self {
        self.min_file_size = bytes;
        self
    }

    /// Acquire `url` into `dest`.
    pub async fn acquire(
        &self,
        url: &str,
        dest: &Path,
        duration_hint: Option<f64>,
    ) -> MediaResult<AcquiredVideo> {
        if is_streaming_host(url) {
            info!(url = %url, "Streaming host detected, using {}", self.extractor.name());
            return self
                .attempt(self.extractor.as_ref(), url, dest, duration_hint)
                .await
                .map_err(|e| {
                    MediaError::download_failed(format!("{} failed: {}", self.extractor.name(), e))
                });
        }

        let direct_err = match self
            .attempt(self.direct.as_ref(), url, dest, duration_hint)
            .await
        {
            Ok(video) => return Ok(video),
            Err(e) => e,
        };

        warn!(
            url = %url,
            "{} failed ({}), falling back to {}",
            self.direct.name(),
            direct_err,
            self.extractor.name()
        );

        self.attempt(self.extractor.as_ref(), url, dest, duration_hint)
            .await
            .map_err(|e| {
                MediaError::download_failed(format!(
                    "{} failed: {}; {} failed: {}",
                    self.direct.name(),
                    direct_err,
                    self.extractor.name(),
                    e
                ))
            })
    }

    /// One strategy run: fetch into the temp sibling, check, promote.
    async fn attempt(
        &self,
        strategy: &dyn AcquisitionStrategy,
        url: &str,
        dest: &Path,
        duration_hint: Option<f64>,
    ) -> MediaResult<AcquiredVideo> {
        let tmp = temp_sibling(dest);
        remove_if_exists(&tmp).await?;

        let result = self.fetch_and_check(strategy, url, &tmp, duration_hint).await;

        match result {
            Ok(size) => {
                move_file(&tmp, dest).await?;
                info!(
                    "Acquired {} ({} bytes) via {}",
                    dest.display(),
                    size,
                    strategy.name()
                );
                Ok(AcquiredVideo {
                    path: dest.to_path_buf(),
                    size,
                    strategy: strategy.name(),
                })
            }
            Err(e) => {
                if let Err(cleanup) = remove_if_exists(&tmp).await {
                    warn!("Failed to remove {}: {}", tmp.display(), cleanup);
                }
                Err(e)
            }
        }
    }

    async fn fetch_and_check(
        &self,
        strategy: &dyn AcquisitionStrategy,
        url: &str,
        tmp: &Path,
        duration_hint: Option<f64>,
    ) -> MediaResult<u64> {
        strategy.fetch(url, tmp, duration_hint).await?;

        let size = file_size(tmp)
            .await
            .ok_or_else(|| MediaError::FileNotFound(tmp.to_path_buf()))?;

        if size <= self.min_file_size {
            return Err(MediaError::InvalidVideo(format!(
                "downloaded file is {} bytes, expected more than {}",
                size, self.min_file_size
            )));
        }

        self.validator.validate(tmp).await?;
        Ok(size)
    }
}
