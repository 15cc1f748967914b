//! Clip job pipeline.
//!
//! This crate provides:
//! - The [`Orchestrator`] that runs one job end to end and always returns a
//!   terminal [`reelcap_models::JobResult`]
//! - Per-job workspaces with guaranteed teardown
//! - The [`PipelineStages`] seam and its real media/ASR/storage wiring
//! - Bounded-retry uploads, progress checkpoints, metrics and job logging

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod orchestrator;
pub mod progress;
pub mod retry;
pub mod stages;
pub mod upload;
pub mod workspace;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use orchestrator::{Orchestrator, StageTimeouts};
pub use progress::{FileProgressSink, NoopProgress, ProgressSink};
pub use stages::{MediaStages, PipelineStages, Stage};
pub use upload::Uploader;
pub use workspace::{Workspace, WorkspaceManager};
