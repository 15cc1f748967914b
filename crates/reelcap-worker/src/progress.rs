//! Out-of-band progress checkpoints.
//!
//! The pipeline reports coarse percentages for an external poller. A failed
//! report is logged and otherwise ignored; it never fails the job.

use async_trait::async_trait;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use reelcap_media::fs_utils::write_atomic;
use reelcap_media::MediaResult;
use reelcap_models::JobId;

/// Checkpoint percentages, in pipeline order.
pub mod checkpoints {
    pub const WORKSPACE_READY: u8 = 5;
    pub const ACQUIRED: u8 = 25;
    pub const AUDIO_EXTRACTED: u8 = 40;
    pub const TRANSCRIBED: u8 = 70;
    pub const COMPOSED: u8 = 90;
    pub const UPLOADED: u8 = 100;
}

#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn report(&self, job_id: &JobId, percent: u8);
}

/// Discards every report.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressSink for NoopProgress {
    async fn report(&self, _job_id: &JobId, _percent: u8) {}
}

#[derive(Debug, Serialize)]
struct ProgressFile {
    percent: u8,
}

/// Overwrites `<dir>/<jobId>.progress.json` at each checkpoint.
#[derive(Debug, Clone)]
pub struct FileProgressSink {
    dir: PathBuf,
}

impl FileProgressSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, job_id: &JobId) -> PathBuf {
        self.dir.join(format!("{}.progress.json", job_id))
    }

    async fn write(&self, path: &Path, percent: u8) -> MediaResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let body = serde_json::to_vec(&ProgressFile {
            percent: percent.min(100),
        })?;
        write_atomic(path, body).await
    }
}

#[async_trait]
impl ProgressSink for FileProgressSink {
    async fn report(&self, job_id: &JobId, percent: u8) {
        let path = self.path_for(job_id);
        match self.write(&path, percent).await {
            Ok(()) => debug!(job_id = %job_id, percent = percent, "Progress checkpoint"),
            Err(e) => warn!(job_id = %job_id, "Failed to write progress {}: {}", path.display(), e),
        }
    }
}
