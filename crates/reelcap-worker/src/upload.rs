//! Final artifact upload with one bounded retry.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use reelcap_models::JobId;
use reelcap_storage::{clip_key, content_type_for, ObjectStore, StorageError};

use crate::error::{WorkerError, WorkerResult};
use crate::retry::{retry_async_if, RetryConfig, RetryResult};

/// Pushes finished clips to object storage.
#[derive(Clone)]
pub struct Uploader {
    store: Arc<dyn ObjectStore>,
    retry: RetryConfig,
}

impl Uploader {
    /// `retries` counts attempts after the first.
    pub fn new(store: Arc<dyn ObjectStore>, retries: u32) -> Self {
        Self {
            store,
            retry: RetryConfig::new("upload").with_max_retries(retries),
        }
    }

    pub fn with_base_delay(mut self, delay: Duration) -> Self {
        self.retry = self.retry.with_base_delay(delay);
        self
    }

    /// Upload `path` as `clips/<jobId>.<ext>` and return its public URL.
    ///
    /// Only transient storage failures are retried.
    pub async fn upload(&self, job_id: &JobId, path: &Path) -> WorkerResult<String> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("mp4");
        let key = clip_key(job_id, ext).map_err(|e| WorkerError::upload(e.to_string()))?;
        let content_type = content_type_for(ext);

        let result = retry_async_if(&self.retry, StorageError::is_retryable, || {
            self.store.put_object(&key, path, content_type)
        })
        .await;

        match result {
            RetryResult::Success(()) => {
                let url = self.store.public_url(&key);
                info!(job_id = %job_id, key = %key, "Uploaded clip");
                Ok(url)
            }
            RetryResult::Failed { error, attempts } => Err(WorkerError::upload(format!(
                "{} (after {} attempt(s))",
                error, attempts
            ))),
        }
    }
}
