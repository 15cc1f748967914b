//! ASR configuration.

use std::time::Duration;

use crate::error::{AsrError, AsrResult};

/// Remote recogniser settings.
#[derive(Debug, Clone)]
pub struct AsrConfig {
    /// Synchronous inference endpoint
    pub endpoint_url: String,
    /// Bearer token, if the endpoint requires one
    pub api_key: Option<String>,
    /// Model name forwarded to the engine
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
    /// Concurrent requests allowed against the engine
    pub max_concurrency: usize,
}

impl Default for AsrConfig {
    fn default() -> Self {
        Self {
            endpoint_url: String::new(),
            api_key: None,
            model: "medium".to_string(),
            timeout: Duration::from_secs(600),
            max_concurrency: 1,
        }
    }
}

impl AsrConfig {
    /// Create config from environment variables.
    pub fn from_env() -> AsrResult<Self> {
        let defaults = Self::default();

        let endpoint_url = std::env::var("ASR_ENDPOINT_URL")
            .ok()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| AsrError::config("ASR_ENDPOINT_URL not set"))?;

        Ok(Self {
            endpoint_url,
            api_key: std::env::var("ASR_API_KEY")
                .ok()
                .filter(|s| !s.trim().is_empty()),
            model: std::env::var("ASR_MODEL").unwrap_or(defaults.model),
            timeout: std::env::var("ASR_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_concurrency: std::env::var("ASR_MAX_CONCURRENCY")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.max_concurrency),
        })
    }
}
