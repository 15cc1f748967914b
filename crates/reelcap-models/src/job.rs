//! Job request and result definitions.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::encoding::FramingMode;
use crate::style::{ResolvedStyle, StylePreset};

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the ID is safe to embed in a file name or storage key.
    pub fn is_path_safe(&self) -> bool {
        !self.0.is_empty()
            && self.0.len() <= 128
            && self
                .0
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A clip-generation job as accepted from the orchestration layer.
///
/// Immutable once accepted; stages only ever borrow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobRequest {
    /// Job ID (generated when absent)
    #[serde(default)]
    pub id: JobId,

    /// Remote source video URL
    #[serde(rename = "sourceURL", alias = "sourceUrl")]
    pub source_url: String,

    /// Caption appearance
    #[serde(default)]
    pub style_preset: StylePreset,

    /// Optional cap on the output duration
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_duration_seconds: Option<f64>,

    /// Output framing
    #[serde(default)]
    pub framing: FramingMode,
}

impl JobRequest {
    /// Create a request with default style and framing.
    pub fn new(source_url: impl Into<String>) -> Self {
        Self {
            id: JobId::new(),
            source_url: source_url.into(),
            style_preset: StylePreset::default(),
            max_duration_seconds: None,
            framing: FramingMode::default(),
        }
    }

    /// Validate the request and resolve its style preset.
    pub fn validate(&self) -> Result<ResolvedStyle, ValidationError> {
        if !self.id.is_path_safe() {
            return Err(ValidationError::InvalidJobId(self.id.to_string()));
        }

        let source = self.source_url.trim();
        if source.is_empty() {
            return Err(ValidationError::MissingSourceUrl);
        }

        let parsed = url::Url::parse(source)
            .map_err(|e| ValidationError::InvalidUrl(format!("{}: {}", source, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ValidationError::UnsupportedScheme(parsed.scheme().to_string()));
        }
        if parsed.host_str().is_none() {
            return Err(ValidationError::InvalidUrl(format!("{}: missing host", source)));
        }

        if let Some(max) = self.max_duration_seconds {
            if !max.is_finite() || max <= 0.0 {
                return Err(ValidationError::InvalidMaxDuration(max));
            }
        }

        self.style_preset.resolve()
    }
}

/// Reasons a job request is rejected before any stage runs.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Source URL is missing")]
    MissingSourceUrl,

    #[error("Invalid source URL: {0}")]
    InvalidUrl(String),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Job ID must be 1-128 characters of [A-Za-z0-9_-]: {0}")]
    InvalidJobId(String),

    #[error("Invalid colour (expected #RRGGBB): {0}")]
    InvalidColor(String),

    #[error("Font size must be positive, got {0}")]
    InvalidFontSize(f64),

    #[error("Outline thickness must be non-negative, got {0}")]
    InvalidOutline(f64),

    #[error("Vertical position must be within 0-100 percent, got {0}")]
    PositionOutOfRange(f64),

    #[error("Maximum duration must be positive, got {0}")]
    InvalidMaxDuration(f64),
}

/// Terminal failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum ErrorKind {
    #[serde(rename = "InputError")]
    Input,
    #[serde(rename = "DownloadError")]
    Download,
    #[serde(rename = "ExtractionError")]
    Extraction,
    #[serde(rename = "TranscriptionError")]
    Transcription,
    #[serde(rename = "NoSpeechError")]
    NoSpeech,
    #[serde(rename = "ComposeError")]
    Compose,
    #[serde(rename = "UploadError")]
    Upload,
    #[serde(rename = "InternalError")]
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Input => "InputError",
            ErrorKind::Download => "DownloadError",
            ErrorKind::Extraction => "ExtractionError",
            ErrorKind::Transcription => "TranscriptionError",
            ErrorKind::NoSpeech => "NoSpeechError",
            ErrorKind::Compose => "ComposeError",
            ErrorKind::Upload => "UploadError",
            ErrorKind::Internal => "InternalError",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal result of a job. Exactly one of the two shapes, never partial.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum JobResult {
    Ok {
        #[serde(rename = "videoURL")]
        video_url: String,
    },
    Error {
        #[serde(rename = "errorKind")]
        error_kind: ErrorKind,
        message: String,
    },
}

impl JobResult {
    pub fn ok(video_url: impl Into<String>) -> Self {
        JobResult::Ok {
            video_url: video_url.into(),
        }
    }

    pub fn error(error_kind: ErrorKind, message: impl Into<String>) -> Self {
        JobResult::Error {
            error_kind,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, JobResult::Ok { .. })
    }

    pub fn video_url(&self) -> Option<&str> {
        match self {
            JobResult::Ok { video_url } => Some(video_url),
            JobResult::Error { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            JobResult::Ok { .. } => None,
            JobResult::Error { error_kind, .. } => Some(*error_kind),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::HorizontalAlignment;

    #[test]
    fn test_job_request_wire_format() {
        let json = r##"{
            "id": "job-1",
            "sourceURL": "https://host/video.mp4",
            "stylePreset": {
                "fontSizePoints": 40,
                "verticalPositionPercent": 50,
                "horizontalAlignment": "center",
                "textColor": "#FFFFFF"
            },
            "maxDurationSeconds": 60
        }"##;

        let request: JobRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.id.as_str(), "job-1");
        assert_eq!(request.source_url, "https://host/video.mp4");
        assert_eq!(request.max_duration_seconds, Some(60.0));
        assert_eq!(request.framing, FramingMode::Vertical);

        let style = request.validate().unwrap();
        assert_eq!(style.font_size, 40.0);
        assert_eq!(style.alignment, HorizontalAlignment::Center);
    }

    #[test]
    fn test_missing_id_is_generated() {
        let request: JobRequest =
            serde_json::from_str(r#"{"sourceURL": "https://host/a.mp4"}"#).unwrap();
        assert!(request.id.is_path_safe());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_validation_rejects_bad_input() {
        assert_eq!(
            JobRequest::new("  ").validate(),
            Err(ValidationError::MissingSourceUrl)
        );
        assert!(matches!(
            JobRequest::new("not a url").validate(),
            Err(ValidationError::InvalidUrl(_))
        ));
        assert!(matches!(
            JobRequest::new("ftp://host/video.mp4").validate(),
            Err(ValidationError::UnsupportedScheme(_))
        ));

        let mut request = JobRequest::new("https://host/video.mp4");
        request.max_duration_seconds = Some(0.0);
        assert!(matches!(
            request.validate(),
            Err(ValidationError::InvalidMaxDuration(_))
        ));

        let mut request = JobRequest::new("https://host/video.mp4");
        request.id = JobId::from_string("../escape");
        assert!(matches!(
            request.validate(),
            Err(ValidationError::InvalidJobId(_))
        ));
    }

    #[test]
    fn test_job_result_shapes() {
        let ok = serde_json::to_value(JobResult::ok("https://cdn/clips/a.mp4")).unwrap();
        assert_eq!(
            ok,
            serde_json::json!({"status": "ok", "videoURL": "https://cdn/clips/a.mp4"})
        );

        let err =
            serde_json::to_value(JobResult::error(ErrorKind::NoSpeech, "no words")).unwrap();
        assert_eq!(
            err,
            serde_json::json!({"status": "error", "errorKind": "NoSpeechError", "message": "no words"})
        );
    }
}
