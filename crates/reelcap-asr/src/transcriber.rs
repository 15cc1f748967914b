//! Engine output to an ordered word list.

use std::path::Path;
use tracing::{debug, info};

use reelcap_models::{Transcript, Word};

use crate::engine::EngineOutput;
use crate::error::{AsrError, AsrResult};
use crate::shared::SharedEngine;

/// Turns audio into a [`Transcript`] through the shared engine.
#[derive(Debug, Clone)]
pub struct Transcriber {
    engine: SharedEngine,
}

impl Transcriber {
    pub fn new(engine: SharedEngine) -> Self {
        Self { engine }
    }

    /// Transcribe `audio`.
    ///
    /// Fails with [`AsrError::NoSpeech`] when no usable word remains.
    pub async fn transcribe(&self, audio: &Path) -> AsrResult<Transcript> {
        if !audio.exists() {
            return Err(AsrError::AudioNotFound(audio.display().to_string()));
        }

        let output = self.engine.transcribe(audio).await?;
        let transcript = words_from_output(output);

        if transcript.is_empty() {
            return Err(AsrError::NoSpeech);
        }

        info!(
            words = transcript.len(),
            language = transcript.language.as_deref().unwrap_or("unknown"),
            "Transcribed audio"
        );
        Ok(transcript)
    }
}

/// Flatten every segment's words, in order.
///
/// Segments without word timing are skipped. Word text is trimmed, empty
/// words are dropped, negative starts clamp to zero and an end before its
/// start is raised to the start.
pub fn words_from_output(output: EngineOutput) -> Transcript {
    let mut words = Vec::new();
    let mut skipped = 0usize;

    for segment in output.segments {
        let Some(segment_words) = segment.words else {
            skipped += 1;
            continue;
        };

        for raw in segment_words {
            let text = raw.word.trim();
            if text.is_empty() || !raw.start.is_finite() || !raw.end.is_finite() {
                continue;
            }
            let start = raw.start.max(0.0);
            let end = raw.end.max(start);
            words.push(Word::new(text, start, end));
        }
    }

    if skipped > 0 {
        debug!("Skipped {} segments without word timing", skipped);
    }

    Transcript {
        words,
        language: output.language,
    }
}
