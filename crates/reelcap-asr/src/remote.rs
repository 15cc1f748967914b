//! Hosted Whisper endpoint.
//!
//! The endpoint takes base64 audio in a synchronous job envelope and answers
//! with the job status plus faster-whisper style segments.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

use crate::config::AsrConfig;
use crate::engine::{EngineOutput, SpeechEngine};
use crate::error::{AsrError, AsrResult};

#[derive(Debug, Serialize)]
struct RunRequest<'a> {
    input: RunInput<'a>,
}

#[derive(Debug, Serialize)]
struct RunInput<'a> {
    audio_base64: String,
    model: &'a str,
    word_timestamps: bool,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    output: Option<EngineOutput>,
    #[serde(default)]
    error: Option<serde_json::Value>,
}

/// [`SpeechEngine`] backed by an HTTP inference endpoint.
#[derive(Debug, Clone)]
pub struct RemoteWhisperEngine {
    http: Client,
    config: AsrConfig,
}

impl RemoteWhisperEngine {
    pub fn new(config: AsrConfig) -> AsrResult<Self> {
        if config.endpoint_url.trim().is_empty() {
            return Err(AsrError::config("ASR endpoint URL is empty"));
        }

        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("reelcap-asr/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl SpeechEngine for RemoteWhisperEngine {
    async fn transcribe(&self, audio: &Path) -> AsrResult<EngineOutput> {
        let bytes = tokio::fs::read(audio)
            .await
            .map_err(|_| AsrError::AudioNotFound(audio.display().to_string()))?;

        debug!(
            "Sending {} bytes of audio to {}",
            bytes.len(),
            self.config.endpoint_url
        );

        let body = RunRequest {
            input: RunInput {
                audio_base64: STANDARD.encode(&bytes),
                model: &self.config.model,
                word_timestamps: true,
            },
        };

        let mut request = self.http.post(&self.config.endpoint_url).json(&body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AsrError::engine_failed(format!("HTTP {}: {}", status, text)));
        }

        let text = response.text().await?;
        let parsed: RunResponse = serde_json::from_str(&text)
            .map_err(|e| AsrError::invalid_response(e.to_string()))?;

        match parsed.status.as_deref() {
            None | Some("COMPLETED") => {}
            Some(other) => {
                let detail = parsed
                    .error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no detail".to_string());
                return Err(AsrError::engine_failed(format!(
                    "job status {}: {}",
                    other, detail
                )));
            }
        }

        let output = parsed
            .output
            .ok_or_else(|| AsrError::invalid_response("response has no output"))?;

        info!(
            segments = output.segments.len(),
            language = output.language.as_deref().unwrap_or("unknown"),
            "Remote transcription complete"
        );

        Ok(output)
    }

    fn name(&self) -> &str {
        "remote-whisper"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(server: &MockServer) -> AsrConfig {
        AsrConfig {
            endpoint_url: format!("{}/runsync", server.uri()),
            api_key: Some("secret".to_string()),
            timeout: Duration::from_secs(5),
            ..AsrConfig::default()
        }
    }

    async fn audio_file(dir: &TempDir) -> std::path::PathBuf {
        let path = dir.path().join("audio.wav");
        tokio::fs::write(&path, b"RIFF....WAVE").await.unwrap();
        path
    }

    #[tokio::test]
    async fn test_transcribe_parses_segments() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/runsync"))
            .and(header("authorization", "Bearer secret"))
            .and(body_partial_json(serde_json::json!({
                "input": {"model": "medium", "word_timestamps": true}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "COMPLETED",
                "output": {
                    "language": "en",
                    "segments": [{
                        "start": 0.0, "end": 0.9, "text": " hello world",
                        "words": [
                            {"word": " hello", "start": 0.0, "end": 0.4},
                            {"word": " world", "start": 0.5, "end": 0.9}
                        ]
                    }]
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let audio = audio_file(&dir).await;
        let engine = RemoteWhisperEngine::new(config(&server)).unwrap();

        let output = engine.transcribe(&audio).await.unwrap();
        assert_eq!(output.language.as_deref(), Some("en"));
        let words = output.segments[0].words.as_ref().unwrap();
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].word, " world");
    }

    #[tokio::test]
    async fn test_failed_job_status_is_engine_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "FAILED",
                "error": "CUDA out of memory"
            })))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let audio = audio_file(&dir).await;
        let err = RemoteWhisperEngine::new(config(&server))
            .unwrap()
            .transcribe(&audio)
            .await
            .unwrap_err();

        assert!(matches!(err, AsrError::EngineFailed(ref m) if m.contains("CUDA")));
    }

    #[tokio::test]
    async fn test_http_error_is_engine_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let audio = audio_file(&dir).await;
        let err = RemoteWhisperEngine::new(config(&server))
            .unwrap()
            .transcribe(&audio)
            .await
            .unwrap_err();

        assert!(matches!(err, AsrError::EngineFailed(_)));
    }

    #[tokio::test]
    async fn test_garbage_response_is_invalid() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let dir = TempDir::new().unwrap();
        let audio = audio_file(&dir).await;
        let err = RemoteWhisperEngine::new(config(&server))
            .unwrap()
            .transcribe(&audio)
            .await
            .unwrap_err();

        assert!(matches!(err, AsrError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_missing_audio() {
        let server = MockServer::start().await;
        let err = RemoteWhisperEngine::new(config(&server))
            .unwrap()
            .transcribe(Path::new("/definitely/not/here.wav"))
            .await
            .unwrap_err();
        assert!(matches!(err, AsrError::AudioNotFound(_)));
    }
}
