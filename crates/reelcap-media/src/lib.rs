//! External media tooling for the clip pipeline.
//!
//! This crate provides:
//! - A single process runner for every external tool (timeouts, cancellation,
//!   verbatim diagnostics)
//! - Type-safe FFmpeg command building
//! - Source acquisition with a direct-fetch / extractor fallback
//! - Audio extraction for speech recognition
//! - Word-by-word caption documents (ASS) from a style preset
//! - Final composition: 9:16 reframe and caption burn-in

pub mod acquire;
pub mod audio;
pub mod command;
pub mod compose;
pub mod download;
pub mod error;
pub mod filters;
pub mod fs_utils;
pub mod http_fetch;
pub mod probe;
pub mod subtitles;

pub use acquire::{
    is_streaming_host, AcquiredVideo, AcquisitionStrategy, VideoAcquirer, VideoValidator,
    MIN_VIDEO_FILE_SIZE,
};
pub use audio::AudioExtractor;
pub use command::{
    check_ffmpeg, check_ffprobe, check_ytdlp, FfmpegCommand, ProcessOutput, ProcessRunner,
};
pub use compose::{ComposeRequest, VideoComposer};
pub use download::YtDlpExtractor;
pub use error::{MediaError, MediaResult};
pub use http_fetch::DirectHttpFetcher;
pub use probe::{probe_video, FfprobeValidator, VideoInfo};
pub use subtitles::{AssStyle, ComposedSubtitles, DefaultStyleMapper, StyleMapper, SubtitleComposer};
