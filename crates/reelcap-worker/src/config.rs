//! Worker configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Root under which per-job workspaces are created
    pub work_dir: PathBuf,
    /// Where progress checkpoint files go; `None` disables them
    pub progress_dir: Option<PathBuf>,
    /// Source acquisition timeout
    pub acquire_timeout: Duration,
    /// Audio extraction timeout
    pub extract_timeout: Duration,
    /// Transcription timeout
    pub transcribe_timeout: Duration,
    /// Final render timeout
    pub compose_timeout: Duration,
    /// Upload timeout, covering retries
    pub upload_timeout: Duration,
    /// Downloads must be strictly larger than this
    pub min_download_bytes: u64,
    /// Upload retries after the first attempt
    pub upload_retries: u32,
    /// Prometheus listener address
    pub metrics_addr: Option<SocketAddr>,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("/tmp/reelcap"),
            progress_dir: None,
            acquire_timeout: Duration::from_secs(900),
            extract_timeout: Duration::from_secs(300),
            transcribe_timeout: Duration::from_secs(900),
            compose_timeout: Duration::from_secs(1200),
            upload_timeout: Duration::from_secs(300),
            min_download_bytes: 100 * 1024,
            upload_retries: 1,
            metrics_addr: None,
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            work_dir: std::env::var("WORKER_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            progress_dir: std::env::var("WORKER_PROGRESS_DIR")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(PathBuf::from),
            acquire_timeout: secs_from_env("WORKER_ACQUIRE_TIMEOUT", defaults.acquire_timeout),
            extract_timeout: secs_from_env("WORKER_EXTRACT_TIMEOUT", defaults.extract_timeout),
            transcribe_timeout: secs_from_env(
                "WORKER_TRANSCRIBE_TIMEOUT",
                defaults.transcribe_timeout,
            ),
            compose_timeout: secs_from_env("WORKER_COMPOSE_TIMEOUT", defaults.compose_timeout),
            upload_timeout: secs_from_env("WORKER_UPLOAD_TIMEOUT", defaults.upload_timeout),
            min_download_bytes: std::env::var("WORKER_MIN_DOWNLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.min_download_bytes),
            upload_retries: std::env::var("WORKER_UPLOAD_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.upload_retries),
            metrics_addr: std::env::var("METRICS_ADDR")
                .ok()
                .and_then(|s| s.parse().ok()),
        }
    }
}

fn secs_from_env(name: &str, default: Duration) -> Duration {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .unwrap_or(default)
}
