//! The speech engine contract.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::AsrResult;

/// One word as reported by the engine. Text may carry leading whitespace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
}

/// A recognised segment. `words` is absent when the engine produced no
/// word-level timing for it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineSegment {
    #[serde(default)]
    pub start: f64,
    #[serde(default)]
    pub end: f64,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub words: Option<Vec<EngineWord>>,
}

/// Raw engine result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineOutput {
    #[serde(default)]
    pub segments: Vec<EngineSegment>,
    #[serde(default)]
    pub language: Option<String>,
}

/// A speech recogniser that returns word-level timestamps.
///
/// Implementations must be safe to call concurrently; [`crate::SharedEngine`]
/// bounds how many calls are in flight.
#[async_trait]
pub trait SpeechEngine: Send + Sync {
    /// Recognise mono 16 kHz audio at `audio`.
    async fn transcribe(&self, audio: &Path) -> AsrResult<EngineOutput>;

    fn name(&self) -> &str;
}
