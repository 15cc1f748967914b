//! ASR error types.

use thiserror::Error;

/// Result type for speech recognition.
pub type AsrResult<T> = Result<T, AsrError>;

#[derive(Debug, Error)]
pub enum AsrError {
    #[error("ASR configuration error: {0}")]
    Config(String),

    #[error("Speech engine failed: {0}")]
    EngineFailed(String),

    #[error("Speech engine returned an unreadable response: {0}")]
    InvalidResponse(String),

    #[error("No speech detected in audio")]
    NoSpeech,

    #[error("Audio file not found: {0}")]
    AudioNotFound(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AsrError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn engine_failed(msg: impl Into<String>) -> Self {
        Self::EngineFailed(msg.into())
    }

    pub fn invalid_response(msg: impl Into<String>) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// The engine worked but heard nothing, as opposed to the engine failing.
    pub fn is_no_speech(&self) -> bool {
        matches!(self, AsrError::NoSpeech)
    }
}
