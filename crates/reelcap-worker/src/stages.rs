//! Pipeline stages and their real implementations.
//!
//! [`PipelineStages`] is the seam the orchestrator drives. [`MediaStages`]
//! wires it to the media, speech and storage crates and decides which
//! terminal error kind each lower-level failure becomes.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use reelcap_asr::{AsrError, Transcriber};
use reelcap_media::{
    AudioExtractor, ComposeRequest, MediaError, ProcessRunner, VideoAcquirer, VideoComposer,
};
use reelcap_models::{ErrorKind, JobId, Transcript};

use crate::error::{WorkerError, WorkerResult};
use crate::upload::Uploader;

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Acquire,
    ExtractAudio,
    Transcribe,
    ComposeSubtitles,
    ComposeVideo,
    Upload,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Acquire => "acquire",
            Stage::ExtractAudio => "extract_audio",
            Stage::Transcribe => "transcribe",
            Stage::ComposeSubtitles => "compose_subtitles",
            Stage::ComposeVideo => "compose_video",
            Stage::Upload => "upload",
        }
    }

    /// Error kind reported when this stage fails or times out.
    pub fn error_kind(&self) -> ErrorKind {
        match self {
            Stage::Acquire => ErrorKind::Download,
            Stage::ExtractAudio => ErrorKind::Extraction,
            Stage::Transcribe => ErrorKind::Transcription,
            Stage::ComposeSubtitles | Stage::ComposeVideo => ErrorKind::Compose,
            Stage::Upload => ErrorKind::Upload,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The external work a job needs. Each call maps its failure to the
/// [`WorkerError`] variant for that stage.
#[async_trait]
pub trait PipelineStages: Send + Sync {
    /// Resolve `url` into a validated video at `dest`.
    async fn acquire(&self, url: &str, dest: &Path, duration_hint: Option<f64>)
        -> WorkerResult<PathBuf>;

    async fn extract_audio(
        &self,
        video: &Path,
        output: &Path,
        max_duration: Option<f64>,
    ) -> WorkerResult<()>;

    /// Never returns an empty transcript; that is [`WorkerError::NoSpeech`].
    async fn transcribe(&self, audio: &Path) -> WorkerResult<Transcript>;

    async fn compose_video(&self, request: &ComposeRequest) -> WorkerResult<PathBuf>;

    /// Upload the final clip and return its public URL.
    async fn upload(&self, job_id: &JobId, path: &Path) -> WorkerResult<String>;
}

/// Stages backed by ffmpeg, yt-dlp, the speech engine and object storage.
#[derive(Clone)]
pub struct MediaStages {
    acquirer: VideoAcquirer,
    extractor: AudioExtractor,
    transcriber: Transcriber,
    composer: VideoComposer,
    uploader: Uploader,
}

impl MediaStages {
    pub fn new(
        acquirer: VideoAcquirer,
        extractor: AudioExtractor,
        transcriber: Transcriber,
        composer: VideoComposer,
        uploader: Uploader,
    ) -> Self {
        Self {
            acquirer,
            extractor,
            transcriber,
            composer,
            uploader,
        }
    }

    /// Default tooling, with every external process run through `runner`.
    pub fn with_defaults(
        runner: ProcessRunner,
        min_download_bytes: u64,
        transcriber: Transcriber,
        uploader: Uploader,
    ) -> WorkerResult<Self> {
        let acquirer = VideoAcquirer::with_defaults(runner.clone())
            .map_err(|e| WorkerError::internal(format!("acquirer setup: {}", e)))?
            .with_min_file_size(min_download_bytes);

        Ok(Self::new(
            acquirer,
            AudioExtractor::new(runner.clone()),
            transcriber,
            VideoComposer::new(runner),
            uploader,
        ))
    }
}

fn media_to_worker(e: MediaError, wrap: fn(String) -> WorkerError) -> WorkerError {
    match e {
        MediaError::EmptyTranscript => WorkerError::no_speech(e.to_string()),
        other => wrap(other.to_string()),
    }
}

fn asr_to_worker(e: AsrError) -> WorkerError {
    if e.is_no_speech() {
        WorkerError::no_speech(e.to_string())
    } else {
        WorkerError::transcription(e.to_string())
    }
}

#[async_trait]
impl PipelineStages for MediaStages {
    async fn acquire(
        &self,
        url: &str,
        dest: &Path,
        duration_hint: Option<f64>,
    ) -> WorkerResult<PathBuf> {
        self.acquirer
            .acquire(url, dest, duration_hint)
            .await
            .map(|video| video.path)
            .map_err(|e| media_to_worker(e, WorkerError::Download))
    }

    async fn extract_audio(
        &self,
        video: &Path,
        output: &Path,
        max_duration: Option<f64>,
    ) -> WorkerResult<()> {
        self.extractor
            .extract(video, output, max_duration)
            .await
            .map_err(|e| media_to_worker(e, WorkerError::Extraction))
    }

    async fn transcribe(&self, audio: &Path) -> WorkerResult<Transcript> {
        self.transcriber.transcribe(audio).await.map_err(asr_to_worker)
    }

    async fn compose_video(&self, request: &ComposeRequest) -> WorkerResult<PathBuf> {
        self.composer
            .compose(request)
            .await
            .map_err(|e| media_to_worker(e, WorkerError::Compose))
    }

    async fn upload(&self, job_id: &JobId, path: &Path) -> WorkerResult<String> {
        self.uploader.upload(job_id, path).await
    }
}
