//! The put-object contract the pipeline uploads through.

use async_trait::async_trait;
use std::path::Path;

use crate::error::StorageResult;

/// Write-only object storage with public URL derivation.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store the file at `path` under `key`.
    async fn put_object(&self, key: &str, path: &Path, content_type: &str) -> StorageResult<()>;

    /// Public URL an uploaded `key` is served from.
    fn public_url(&self, key: &str) -> String;
}
