//! Subtitle documents built from transcripts.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One timed caption cue. Each cue corresponds to exactly one word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CaptionEvent {
    pub start_seconds: f64,
    pub end_seconds: f64,
    pub rendered_text: String,
}

/// Ordered caption events. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SubtitleDocument {
    events: Vec<CaptionEvent>,
}

impl SubtitleDocument {
    pub fn new(events: Vec<CaptionEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[CaptionEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// End time of the last event, if any.
    pub fn end_seconds(&self) -> Option<f64> {
        self.events.last().map(|e| e.end_seconds)
    }
}
