//! Object keys, content types and public URLs.

use reelcap_models::JobId;

use crate::error::{StorageError, StorageResult};

/// Prefix under which every finished clip is stored.
pub const CLIP_PREFIX: &str = "clips";

/// `clips/<jobId>.<ext>`.
pub fn clip_key(job_id: &JobId, ext: &str) -> StorageResult<String> {
    if !job_id.is_path_safe() {
        return Err(StorageError::InvalidKey(job_id.to_string()));
    }
    let ext = ext.trim_start_matches('.');
    if ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(StorageError::InvalidKey(format!("bad extension {:?}", ext)));
    }
    Ok(format!("{}/{}.{}", CLIP_PREFIX, job_id, ext.to_ascii_lowercase()))
}

/// MIME type declared on upload, by file extension.
pub fn content_type_for(ext: &str) -> &'static str {
    match ext.trim_start_matches('.').to_ascii_lowercase().as_str() {
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        _ => "application/octet-stream",
    }
}

/// Join a public base URL and a key with exactly one slash.
pub fn public_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}
