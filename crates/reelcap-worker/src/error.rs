//! Worker error types.
//!
//! One variant per terminal error kind. Stage adapters decide which variant a
//! lower-level failure becomes, so the same `MediaError` can surface as a
//! download, extraction or compose failure depending on where it happened.

use std::time::Duration;
use thiserror::Error;

use reelcap_models::{ErrorKind, ValidationError};

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Invalid job input: {0}")]
    Input(String),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Audio extraction failed: {0}")]
    Extraction(String),

    #[error("Transcription failed: {0}")]
    Transcription(String),

    #[error("No speech detected: {0}")]
    NoSpeech(String),

    #[error("Composition failed: {0}")]
    Compose(String),

    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WorkerError {
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    pub fn download(msg: impl Into<String>) -> Self {
        Self::Download(msg.into())
    }

    pub fn extraction(msg: impl Into<String>) -> Self {
        Self::Extraction(msg.into())
    }

    pub fn transcription(msg: impl Into<String>) -> Self {
        Self::Transcription(msg.into())
    }

    pub fn no_speech(msg: impl Into<String>) -> Self {
        Self::NoSpeech(msg.into())
    }

    pub fn compose(msg: impl Into<String>) -> Self {
        Self::Compose(msg.into())
    }

    pub fn upload(msg: impl Into<String>) -> Self {
        Self::Upload(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Same kind as `self`, with a timeout message.
    pub fn timed_out(kind: ErrorKind, after: Duration) -> Self {
        let msg = format!("timed out after {} seconds", after.as_secs());
        match kind {
            ErrorKind::Input => Self::Input(msg),
            ErrorKind::Download => Self::Download(msg),
            ErrorKind::Extraction => Self::Extraction(msg),
            ErrorKind::Transcription => Self::Transcription(msg),
            ErrorKind::NoSpeech => Self::NoSpeech(msg),
            ErrorKind::Compose => Self::Compose(msg),
            ErrorKind::Upload => Self::Upload(msg),
            ErrorKind::Internal => Self::Internal(msg),
        }
    }

    /// Terminal error kind reported in the job result.
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkerError::Input(_) => ErrorKind::Input,
            WorkerError::Download(_) => ErrorKind::Download,
            WorkerError::Extraction(_) => ErrorKind::Extraction,
            WorkerError::Transcription(_) => ErrorKind::Transcription,
            WorkerError::NoSpeech(_) => ErrorKind::NoSpeech,
            WorkerError::Compose(_) => ErrorKind::Compose,
            WorkerError::Upload(_) => ErrorKind::Upload,
            WorkerError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// The detail text without the kind prefix.
    pub fn message(&self) -> &str {
        match self {
            WorkerError::Input(m)
            | WorkerError::Download(m)
            | WorkerError::Extraction(m)
            | WorkerError::Transcription(m)
            | WorkerError::NoSpeech(m)
            | WorkerError::Compose(m)
            | WorkerError::Upload(m)
            | WorkerError::Internal(m) => m,
        }
    }
}

impl From<ValidationError> for WorkerError {
    fn from(e: ValidationError) -> Self {
        Self::Input(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_mapping() {
        assert_eq!(WorkerError::input("x").kind(), ErrorKind::Input);
        assert_eq!(WorkerError::download("x").kind(), ErrorKind::Download);
        assert_eq!(WorkerError::no_speech("x").kind(), ErrorKind::NoSpeech);
        assert_eq!(WorkerError::internal("x").kind(), ErrorKind::Internal);
        assert_eq!(
            WorkerError::from(ValidationError::MissingSourceUrl).kind(),
            ErrorKind::Input
        );
    }

    #[test]
    fn test_timeout_keeps_stage_kind() {
        let err = WorkerError::timed_out(ErrorKind::Compose, Duration::from_secs(1200));
        assert_eq!(err.kind(), ErrorKind::Compose);
        assert_eq!(err.message(), "timed out after 1200 seconds");
    }
}
