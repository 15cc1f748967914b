//! Orchestrator integration tests.
//!
//! The pipeline runs against scripted stages so every exit path can be
//! driven without external tools.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;

use reelcap_media::ComposeRequest;
use reelcap_models::{ErrorKind, JobId, JobRequest, JobResult, Transcript, Word};
use reelcap_storage::{ObjectStore, StorageError, StorageResult};
use reelcap_worker::{
    FileProgressSink, Orchestrator, PipelineStages, Stage, StageTimeouts, Uploader, WorkerError,
    WorkerResult, WorkspaceManager,
};

/// Stages that write placeholder artifacts and fail where told to.
struct ScriptedStages {
    fail_at: Option<Stage>,
    words: Vec<Word>,
    acquire_delay: Option<Duration>,
    uploader: Option<Uploader>,
    calls: Mutex<Vec<Stage>>,
    workspace: Mutex<Option<PathBuf>>,
    captions: Mutex<Option<String>>,
}

impl ScriptedStages {
    fn new() -> Self {
        Self {
            fail_at: None,
            words: vec![Word::new("hello", 0.0, 0.4), Word::new("world", 0.5, 0.9)],
            acquire_delay: None,
            uploader: None,
            calls: Mutex::new(Vec::new()),
            workspace: Mutex::new(None),
            captions: Mutex::new(None),
        }
    }

    fn failing_at(stage: Stage) -> Self {
        Self {
            fail_at: Some(stage),
            ..Self::new()
        }
    }

    fn record(&self, stage: Stage) -> WorkerResult<()> {
        self.calls.lock().unwrap().push(stage);
        if self.fail_at == Some(stage) {
            let msg = format!("{} exploded", stage);
            return Err(match stage {
                Stage::Acquire => WorkerError::download(msg),
                Stage::ExtractAudio => WorkerError::extraction(msg),
                Stage::Transcribe => WorkerError::transcription(msg),
                Stage::ComposeSubtitles | Stage::ComposeVideo => WorkerError::compose(msg),
                Stage::Upload => WorkerError::upload(msg),
            });
        }
        Ok(())
    }

    fn calls(&self) -> Vec<Stage> {
        self.calls.lock().unwrap().clone()
    }

    fn workspace(&self) -> PathBuf {
        self.workspace
            .lock()
            .unwrap()
            .clone()
            .expect("acquire was never called")
    }
}

#[async_trait]
impl PipelineStages for ScriptedStages {
    async fn acquire(
        &self,
        _url: &str,
        dest: &Path,
        _duration_hint: Option<f64>,
    ) -> WorkerResult<PathBuf> {
        *self.workspace.lock().unwrap() = dest.parent().map(Path::to_path_buf);
        tokio::fs::write(dest, b"video").await.unwrap();
        if let Some(delay) = self.acquire_delay {
            tokio::time::sleep(delay).await;
        }
        self.record(Stage::Acquire)?;
        Ok(dest.to_path_buf())
    }

    async fn extract_audio(
        &self,
        _video: &Path,
        output: &Path,
        _max_duration: Option<f64>,
    ) -> WorkerResult<()> {
        self.record(Stage::ExtractAudio)?;
        tokio::fs::write(output, b"audio").await.unwrap();
        Ok(())
    }

    async fn transcribe(&self, _audio: &Path) -> WorkerResult<Transcript> {
        self.record(Stage::Transcribe)?;
        Ok(Transcript {
            words: self.words.clone(),
            language: Some("en".to_string()),
        })
    }

    async fn compose_video(&self, request: &ComposeRequest) -> WorkerResult<PathBuf> {
        let captions = tokio::fs::read_to_string(&request.subtitles).await.unwrap();
        *self.captions.lock().unwrap() = Some(captions);
        self.record(Stage::ComposeVideo)?;
        tokio::fs::write(&request.output, b"final").await.unwrap();
        Ok(request.output.clone())
    }

    async fn upload(&self, job_id: &JobId, path: &Path) -> WorkerResult<String> {
        self.record(Stage::Upload)?;
        match &self.uploader {
            Some(uploader) => uploader.upload(job_id, path).await,
            None => Ok(format!("https://cdn.test/clips/{}.mp4", job_id)),
        }
    }
}

fn request(id: &str) -> JobRequest {
    let mut request: JobRequest = serde_json::from_value(serde_json::json!({
        "sourceURL": "https://host/video.mp4",
        "stylePreset": {
            "fontSizePoints": 40,
            "verticalPositionPercent": 50,
            "horizontalAlignment": "center",
            "textColor": "#FFFFFF"
        }
    }))
    .unwrap();
    request.id = JobId::from_string(id);
    request
}

fn orchestrator(stages: Arc<ScriptedStages>, root: &TempDir) -> Orchestrator {
    Orchestrator::new(stages, WorkspaceManager::new(root.path().join("work")))
}

#[tokio::test]
async fn test_successful_job() {
    let root = TempDir::new().unwrap();
    let stages = Arc::new(ScriptedStages::new());

    let result = orchestrator(stages.clone(), &root)
        .run(&request("job-ok"))
        .await;

    assert_eq!(result, JobResult::ok("https://cdn.test/clips/job-ok.mp4"));
    assert_eq!(
        stages.calls(),
        vec![
            Stage::Acquire,
            Stage::ExtractAudio,
            Stage::Transcribe,
            Stage::ComposeVideo,
            Stage::Upload
        ]
    );
    assert!(!stages.workspace().exists());
}

#[tokio::test]
async fn test_hello_world_captions_reach_the_composer() {
    let root = TempDir::new().unwrap();
    let stages = Arc::new(ScriptedStages::new());

    let result = orchestrator(stages.clone(), &root)
        .run(&request("job-captions"))
        .await;
    assert!(result.is_ok());

    let captions = stages.captions.lock().unwrap().clone().unwrap();
    assert!(captions.contains("PlayResX: 1080"));
    assert!(captions.contains("PlayResY: 1920"));
    assert!(captions.contains("Dialogue: 0,0:00:00.00,0:00:00.40,Default,,0,0,0,,HELLO"));
    assert!(captions.contains("Dialogue: 0,0:00:00.50,0:00:00.90,Default,,0,0,0,,WORLD"));
    assert_eq!(captions.matches("Dialogue:").count(), 2);

    let style_line = captions
        .lines()
        .find(|line| line.starts_with("Style: Default,"))
        .unwrap();
    // Alignment, MarginL, MarginR, MarginV, Encoding
    assert!(style_line.ends_with(",2,80,80,960,1"), "{}", style_line);
}

#[tokio::test]
async fn test_workspace_removed_at_every_failing_stage() {
    let cases = [
        (Stage::Acquire, ErrorKind::Download),
        (Stage::ExtractAudio, ErrorKind::Extraction),
        (Stage::Transcribe, ErrorKind::Transcription),
        (Stage::ComposeVideo, ErrorKind::Compose),
        (Stage::Upload, ErrorKind::Upload),
    ];

    for (stage, kind) in cases {
        let root = TempDir::new().unwrap();
        let stages = Arc::new(ScriptedStages::failing_at(stage));

        let result = orchestrator(stages.clone(), &root)
            .run(&request("job-fail"))
            .await;

        assert_eq!(result.error_kind(), Some(kind), "failing at {}", stage);
        assert_eq!(stages.calls().last(), Some(&stage));
        assert!(
            !stages.workspace().exists(),
            "workspace left behind after {} failure",
            stage
        );
    }
}

#[tokio::test]
async fn test_no_speech_never_composes() {
    let root = TempDir::new().unwrap();
    let stages = Arc::new(ScriptedStages {
        words: Vec::new(),
        ..ScriptedStages::new()
    });

    let result = orchestrator(stages.clone(), &root)
        .run(&request("job-silent"))
        .await;

    assert_eq!(result.error_kind(), Some(ErrorKind::NoSpeech));
    assert!(!stages.calls().contains(&Stage::ComposeVideo));
    assert!(stages.captions.lock().unwrap().is_none());
    assert!(!stages.workspace().exists());
}

#[tokio::test]
async fn test_invalid_input_runs_no_stage() {
    let root = TempDir::new().unwrap();
    let stages = Arc::new(ScriptedStages::new());

    let mut bad = request("job-bad");
    bad.source_url = "ftp://host/video.mp4".to_string();
    let result = orchestrator(stages.clone(), &root).run(&bad).await;

    assert_eq!(result.error_kind(), Some(ErrorKind::Input));
    assert!(stages.calls().is_empty());
    assert!(!root.path().join("work").exists());
}

#[tokio::test]
async fn test_stage_timeout_reports_stage_kind() {
    let root = TempDir::new().unwrap();
    let stages = Arc::new(ScriptedStages {
        acquire_delay: Some(Duration::from_secs(30)),
        ..ScriptedStages::new()
    });
    let timeouts = StageTimeouts {
        acquire: Duration::from_millis(50),
        ..StageTimeouts::default()
    };

    let result = orchestrator(stages.clone(), &root)
        .with_timeouts(timeouts)
        .run(&request("job-slow"))
        .await;

    match result {
        JobResult::Error {
            error_kind,
            message,
        } => {
            assert_eq!(error_kind, ErrorKind::Download);
            assert!(message.contains("timed out"), "{}", message);
        }
        JobResult::Ok { .. } => panic!("expected timeout"),
    }
    assert!(!stages.workspace().exists());
}

#[tokio::test]
async fn test_cancelled_job_removes_workspace() {
    let root = TempDir::new().unwrap();
    let stages = Arc::new(ScriptedStages {
        acquire_delay: Some(Duration::from_secs(30)),
        ..ScriptedStages::new()
    });
    let orchestrator = orchestrator(stages.clone(), &root);
    let job = request("job-cancelled");

    let finished = tokio::select! {
        _ = orchestrator.run(&job) => true,
        _ = tokio::time::sleep(Duration::from_millis(100)) => false,
    };

    assert!(!finished, "job should still be acquiring");
    assert_eq!(stages.calls(), Vec::<Stage>::new());
    assert!(!stages.workspace().exists());
}

#[tokio::test]
async fn test_progress_checkpoints() {
    let root = TempDir::new().unwrap();
    let progress_dir = root.path().join("progress");
    let stages = Arc::new(ScriptedStages::new());

    let result = orchestrator(stages, &root)
        .with_progress(Arc::new(FileProgressSink::new(&progress_dir)))
        .run(&request("job-progress"))
        .await;
    assert!(result.is_ok());

    let text = tokio::fs::read_to_string(progress_dir.join("job-progress.progress.json"))
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["percent"], 100);
}

#[tokio::test]
async fn test_progress_stops_at_failing_stage() {
    let root = TempDir::new().unwrap();
    let progress_dir = root.path().join("progress");
    let stages = Arc::new(ScriptedStages::failing_at(Stage::ComposeVideo));

    orchestrator(stages, &root)
        .with_progress(Arc::new(FileProgressSink::new(&progress_dir)))
        .run(&request("job-partial"))
        .await;

    let text = tokio::fs::read_to_string(progress_dir.join("job-partial.progress.json"))
        .await
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["percent"], 70);
}

/// Fails the first `failures` puts with a transient error.
struct FlakyStore {
    failures: Mutex<u32>,
    puts: Mutex<u32>,
}

#[async_trait]
impl ObjectStore for FlakyStore {
    async fn put_object(&self, _key: &str, path: &Path, _content_type: &str) -> StorageResult<()> {
        assert!(path.exists(), "upload source must exist during upload");
        *self.puts.lock().unwrap() += 1;
        let mut failures = self.failures.lock().unwrap();
        if *failures > 0 {
            *failures -= 1;
            return Err(StorageError::upload_failed("503 Slow Down"));
        }
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://media.test/{}", key)
    }
}

#[tokio::test]
async fn test_upload_retries_once_then_fails() {
    for (failures, expect_ok) in [(1, true), (2, false)] {
        let root = TempDir::new().unwrap();
        let store = Arc::new(FlakyStore {
            failures: Mutex::new(failures),
            puts: Mutex::new(0),
        });
        let uploader = Uploader::new(store.clone(), 1).with_base_delay(Duration::from_millis(1));
        let stages = Arc::new(ScriptedStages {
            uploader: Some(uploader),
            ..ScriptedStages::new()
        });

        let result = orchestrator(stages.clone(), &root)
            .run(&request("job-upload"))
            .await;

        if expect_ok {
            assert_eq!(
                result.video_url(),
                Some("https://media.test/clips/job-upload.mp4")
            );
        } else {
            assert_eq!(result.error_kind(), Some(ErrorKind::Upload));
        }
        assert_eq!(*store.puts.lock().unwrap(), 2);
        assert!(!stages.workspace().exists());
    }
}
