//! Per-job scratch directories.
//!
//! A [`Workspace`] owns a uniquely named directory under the configured root
//! and removes it when dropped, so every exit path tears it down. Call
//! [`Workspace::close`] to remove it eagerly, off the async executor.

use std::path::{Path, PathBuf};
use tempfile::TempDir;
use tracing::{debug, warn};

use reelcap_models::JobId;

use crate::error::{WorkerError, WorkerResult};

/// Allocates job workspaces under one root directory.
#[derive(Debug, Clone)]
pub struct WorkspaceManager {
    root: PathBuf,
}

impl WorkspaceManager {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create a fresh workspace for `job_id`.
    ///
    /// The directory name starts with the job id and carries a random suffix,
    /// so two runs of the same job never share a directory.
    pub async fn create(&self, job_id: &JobId) -> WorkerResult<Workspace> {
        tokio::fs::create_dir_all(&self.root).await.map_err(|e| {
            WorkerError::internal(format!(
                "cannot create work root {}: {}",
                self.root.display(),
                e
            ))
        })?;

        let dir = tempfile::Builder::new()
            .prefix(&format!("{}-", job_id))
            .tempdir_in(&self.root)
            .map_err(|e| WorkerError::internal(format!("cannot allocate workspace: {}", e)))?;

        debug!(job_id = %job_id, "Workspace created at {}", dir.path().display());
        Ok(Workspace { dir })
    }
}

/// A job's exclusive scratch directory.
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn source_path(&self) -> PathBuf {
        self.path().join("source.mp4")
    }

    pub fn audio_path(&self) -> PathBuf {
        self.path().join("audio.wav")
    }

    pub fn subtitles_path(&self) -> PathBuf {
        self.path().join("captions.ass")
    }

    pub fn output_path(&self) -> PathBuf {
        self.path().join("final.mp4")
    }

    /// Remove the directory and everything in it on the blocking pool.
    pub async fn close(self) {
        let path = self.path().to_path_buf();
        let dir = self.dir;
        match tokio::task::spawn_blocking(move || dir.close()).await {
            Ok(Ok(())) => debug!("Workspace removed: {}", path.display()),
            Ok(Err(e)) => warn!("Failed to remove workspace {}: {}", path.display(), e),
            Err(e) => warn!("Workspace removal task failed for {}: {}", path.display(), e),
        }
    }
}
