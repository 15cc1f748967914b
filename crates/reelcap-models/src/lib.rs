//! Shared data models for the ReelCap clip pipeline.
//!
//! This crate provides Serde-serializable types for:
//! - Job requests and terminal job results
//! - Caption style presets and their resolved defaults
//! - Word-level transcripts and subtitle documents
//! - Encoding and output frame configuration

pub mod encoding;
pub mod job;
pub mod style;
pub mod subtitle;
pub mod transcript;

// Re-export common types
pub use encoding::{EncodingConfig, FrameSize, FramingMode};
pub use job::{ErrorKind, JobId, JobRequest, JobResult, ValidationError};
pub use style::{
    FontStyle, FontWeight, HorizontalAlignment, ResolvedStyle, RgbColor, StylePreset,
};
pub use subtitle::{CaptionEvent, SubtitleDocument};
pub use transcript::{Transcript, Word};
