//! Speech recognition for word-timed captions.
//!
//! The recogniser itself is a black box behind [`SpeechEngine`]. This crate
//! owns the contract around it:
//! - [`SharedEngine`]: one process-wide engine, initialised once and accessed
//!   through a fixed-size permit pool
//! - [`RemoteWhisperEngine`]: a hosted Whisper endpoint
//! - [`Transcriber`]: flattens segments into an ordered, sanitised word list
//!   and rejects speech-free audio

pub mod config;
pub mod engine;
pub mod error;
pub mod remote;
pub mod shared;
pub mod transcriber;

pub use config::AsrConfig;
pub use engine::{EngineOutput, EngineSegment, EngineWord, SpeechEngine};
pub use error::{AsrError, AsrResult};
pub use remote::RemoteWhisperEngine;
pub use shared::SharedEngine;
pub use transcriber::Transcriber;
