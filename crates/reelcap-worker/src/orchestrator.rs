//! Runs one clip job end to end.
//!
//! Stages run strictly in order inside a job-exclusive workspace. The first
//! failure stops the job and becomes the terminal error; the workspace is
//! removed on every exit path, including cancellation of the job future.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

use reelcap_media::{ComposeRequest, MediaError, SubtitleComposer};
use reelcap_models::{JobRequest, JobResult, ResolvedStyle};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::progress::{checkpoints, NoopProgress, ProgressSink};
use crate::stages::{PipelineStages, Stage};
use crate::workspace::{Workspace, WorkspaceManager};

/// Upper bound on each external stage.
#[derive(Debug, Clone, Copy)]
pub struct StageTimeouts {
    pub acquire: Duration,
    pub extract: Duration,
    pub transcribe: Duration,
    pub compose: Duration,
    pub upload: Duration,
}

impl StageTimeouts {
    pub fn from_config(config: &WorkerConfig) -> Self {
        Self {
            acquire: config.acquire_timeout,
            extract: config.extract_timeout,
            transcribe: config.transcribe_timeout,
            compose: config.compose_timeout,
            upload: config.upload_timeout,
        }
    }

    fn for_stage(&self, stage: Stage) -> Option<Duration> {
        match stage {
            Stage::Acquire => Some(self.acquire),
            Stage::ExtractAudio => Some(self.extract),
            Stage::Transcribe => Some(self.transcribe),
            Stage::ComposeVideo => Some(self.compose),
            Stage::Upload => Some(self.upload),
            Stage::ComposeSubtitles => None,
        }
    }
}

impl Default for StageTimeouts {
    fn default() -> Self {
        Self::from_config(&WorkerConfig::default())
    }
}

pub struct Orchestrator {
    stages: Arc<dyn PipelineStages>,
    subtitles: SubtitleComposer,
    workspaces: WorkspaceManager,
    progress: Arc<dyn ProgressSink>,
    timeouts: StageTimeouts,
}

impl Orchestrator {
    pub fn new(stages: Arc<dyn PipelineStages>, workspaces: WorkspaceManager) -> Self {
        Self {
            stages,
            subtitles: SubtitleComposer::default(),
            workspaces,
            progress: Arc::new(NoopProgress),
            timeouts: StageTimeouts::default(),
        }
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_timeouts(mut self, timeouts: StageTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_subtitle_composer(mut self, subtitles: SubtitleComposer) -> Self {
        self.subtitles = subtitles;
        self
    }

    /// Run `request` to a terminal result. Never panics on stage failure.
    pub async fn run(&self, request: &JobRequest) -> JobResult {
        let logger = JobLogger::new(&request.id, "clip_job");
        let span = logger.create_span();

        async {
            logger.log_start(&request.source_url);
            let started = Instant::now();

            match self.execute(request, &logger).await {
                Ok(url) => {
                    metrics::record_job_completed();
                    logger.log_completion(&format!(
                        "{} in {:.1}s",
                        url,
                        started.elapsed().as_secs_f64()
                    ));
                    JobResult::ok(url)
                }
                Err(e) => {
                    metrics::record_job_failed(e.kind());
                    logger.log_error(&format!("{}: {}", e.kind(), e.message()));
                    JobResult::error(e.kind(), e.message())
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn execute(&self, request: &JobRequest, logger: &JobLogger) -> WorkerResult<String> {
        let style = request.validate()?;
        let workspace = self.workspaces.create(&request.id).await?;

        let result = self.run_stages(request, &style, &workspace, logger).await;
        workspace.close().await;
        result
    }

    async fn run_stages(
        &self,
        request: &JobRequest,
        style: &ResolvedStyle,
        workspace: &Workspace,
        logger: &JobLogger,
    ) -> WorkerResult<String> {
        let job_id = &request.id;
        let max_duration = request.max_duration_seconds;
        self.progress.report(job_id, checkpoints::WORKSPACE_READY).await;

        let source_dest = workspace.source_path();
        let source = self
            .timed(
                Stage::Acquire,
                logger,
                self.stages
                    .acquire(&request.source_url, &source_dest, max_duration),
            )
            .await?;
        self.progress.report(job_id, checkpoints::ACQUIRED).await;

        let audio = workspace.audio_path();
        self.timed(
            Stage::ExtractAudio,
            logger,
            self.stages.extract_audio(&source, &audio, max_duration),
        )
        .await?;
        self.progress.report(job_id, checkpoints::AUDIO_EXTRACTED).await;

        let transcript = self
            .timed(Stage::Transcribe, logger, self.stages.transcribe(&audio))
            .await?;
        if transcript.is_empty() {
            return Err(WorkerError::no_speech("transcription produced no words"));
        }
        logger.log_progress(&format!(
            "{} words, language {}",
            transcript.len(),
            transcript.language.as_deref().unwrap_or("unknown")
        ));
        self.progress.report(job_id, checkpoints::TRANSCRIBED).await;

        let subtitles = workspace.subtitles_path();
        self.timed(Stage::ComposeSubtitles, logger, async {
            let composed = self
                .subtitles
                .compose(&transcript.words, style)
                .map_err(|e| match e {
                    MediaError::EmptyTranscript => WorkerError::no_speech(e.to_string()),
                    other => WorkerError::compose(other.to_string()),
                })?;
            composed
                .write_to(&subtitles)
                .await
                .map_err(|e| WorkerError::compose(e.to_string()))?;

            logger.log_progress(&format!(
                "{} caption events through {:.2}s",
                composed.document.len(),
                composed.document.end_seconds().unwrap_or(0.0)
            ));
            Ok(())
        })
        .await?;

        let compose_request = ComposeRequest {
            input: source,
            subtitles,
            output: workspace.output_path(),
            framing: request.framing,
            max_duration,
        };
        let output = self
            .timed(
                Stage::ComposeVideo,
                logger,
                self.stages.compose_video(&compose_request),
            )
            .await?;
        self.progress.report(job_id, checkpoints::COMPOSED).await;

        let url = self
            .timed(Stage::Upload, logger, self.stages.upload(job_id, &output))
            .await?;
        self.progress.report(job_id, checkpoints::UPLOADED).await;

        Ok(url)
    }

    /// Run one stage under its timeout, recording its duration.
    async fn timed<T, F>(&self, stage: Stage, logger: &JobLogger, fut: F) -> WorkerResult<T>
    where
        F: Future<Output = WorkerResult<T>>,
    {
        let started = Instant::now();

        let result = match self.timeouts.for_stage(stage) {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(WorkerError::timed_out(stage.error_kind(), limit)),
            },
            None => fut.await,
        };

        let elapsed = started.elapsed();
        metrics::record_stage_duration(stage.as_str(), elapsed.as_secs_f64());
        match &result {
            Ok(_) => logger.log_stage(stage.as_str(), elapsed),
            Err(e) => logger.log_warning(&format!("stage {} failed: {}", stage, e)),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeouts_from_config() {
        let config = WorkerConfig {
            compose_timeout: Duration::from_secs(42),
            ..WorkerConfig::default()
        };
        let timeouts = StageTimeouts::from_config(&config);
        assert_eq!(timeouts.for_stage(Stage::ComposeVideo), Some(Duration::from_secs(42)));
        assert_eq!(timeouts.for_stage(Stage::ComposeSubtitles), None);
    }
}
