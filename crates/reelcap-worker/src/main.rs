//! One-shot clip job handler.
//!
//! Reads a job request as JSON from the file named by the first argument, or
//! from stdin when none is given, runs it, and prints the terminal job result
//! as JSON on stdout. Exits 0 for an ok result and 1 otherwise.

use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use reelcap_asr::{AsrConfig, RemoteWhisperEngine, SharedEngine, SpeechEngine, Transcriber};
use reelcap_media::ProcessRunner;
use reelcap_models::{ErrorKind, JobRequest, JobResult};
use reelcap_storage::R2Client;
use reelcap_worker::{
    metrics, FileProgressSink, MediaStages, Orchestrator, StageTimeouts, Uploader, WorkerConfig,
    WorkerError, WorkerResult, WorkspaceManager,
};

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for TLS/HTTPS)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    dotenvy::dotenv().ok();
    init_tracing();

    let result = run().await;

    match serde_json::to_string(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("failed to serialize job result: {}", e);
            std::process::exit(2);
        }
    }

    if !result.is_ok() {
        std::process::exit(1);
    }
}

fn init_tracing() {
    // Logs go to stderr; stdout carries only the job result.
    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.to_lowercase() == "json")
        .unwrap_or(false);

    let env_filter = EnvFilter::from_default_env().add_directive("reelcap=info".parse().unwrap());

    if use_json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .with(env_filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(true)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_file(false)
                    .with_line_number(false),
            )
            .with(env_filter)
            .init();
    }
}

async fn run() -> JobResult {
    let request = match read_request().await {
        Ok(request) => request,
        Err(e) => return JobResult::error(e.kind(), e.message()),
    };

    let config = WorkerConfig::from_env();
    info!("Worker config: {:?}", config);

    if let Some(addr) = config.metrics_addr {
        if let Err(e) = metrics::init_exporter(addr) {
            warn!("Metrics disabled: {}", e);
        }
    }

    let orchestrator = match build_orchestrator(&config) {
        Ok(orchestrator) => orchestrator,
        Err(e) => return JobResult::error(e.kind(), e.message()),
    };

    // Dropping the job future kills any running tool and removes the workspace.
    tokio::select! {
        result = orchestrator.run(&request) => result,
        _ = tokio::signal::ctrl_c() => {
            warn!(job_id = %request.id, "Received shutdown signal, cancelling job");
            JobResult::error(ErrorKind::Internal, "job cancelled")
        }
    }
}

async fn read_request() -> WorkerResult<JobRequest> {
    let raw = match std::env::args().nth(1) {
        Some(path) => tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| WorkerError::input(format!("cannot read job request {}: {}", path, e)))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .map_err(|e| {
                    WorkerError::input(format!("cannot read job request from stdin: {}", e))
                })?;
            buf
        }
    };

    serde_json::from_str(&raw)
        .map_err(|e| WorkerError::input(format!("malformed job request: {}", e)))
}

fn build_orchestrator(config: &WorkerConfig) -> WorkerResult<Orchestrator> {
    let asr_config = AsrConfig::from_env().map_err(|e| WorkerError::internal(e.to_string()))?;
    let engine = SharedEngine::lazy(asr_config.max_concurrency, move || {
        Ok(Arc::new(RemoteWhisperEngine::new(asr_config.clone())?) as Arc<dyn SpeechEngine>)
    });

    let store = R2Client::from_env().map_err(|e| WorkerError::internal(e.to_string()))?;
    let uploader = Uploader::new(Arc::new(store), config.upload_retries);

    let stages = MediaStages::with_defaults(
        ProcessRunner::new(),
        config.min_download_bytes,
        Transcriber::new(engine),
        uploader,
    )?;

    let orchestrator = Orchestrator::new(
        Arc::new(stages),
        WorkspaceManager::new(&config.work_dir),
    )
    .with_timeouts(StageTimeouts::from_config(config));

    Ok(match &config.progress_dir {
        Some(dir) => orchestrator.with_progress(Arc::new(FileProgressSink::new(dir))),
        None => orchestrator,
    })
}
