use std::path::Path;

use reelcap_media::{check_ffmpeg, check_ffprobe, check_ytdlp, ProcessRunner};
use reelcap_worker::WorkerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = WorkerConfig::from_env();

    println!(
        "worker-selfcheck: starting with work_dir={}",
        config.work_dir.display()
    );
    ensure_workdir(&config.work_dir).await?;
    if let Some(dir) = &config.progress_dir {
        ensure_workdir(dir).await?;
    }
    ensure_tools().await?;
    ensure_env_present(&[
        "ASR_ENDPOINT_URL",
        "R2_ENDPOINT_URL",
        "R2_ACCESS_KEY_ID",
        "R2_SECRET_ACCESS_KEY",
        "R2_BUCKET_NAME",
        "R2_PUBLIC_BASE_URL",
    ])?;

    println!("worker-selfcheck: ok");
    Ok(())
}

async fn ensure_workdir<P: AsRef<Path>>(path: P) -> anyhow::Result<()> {
    let path = path.as_ref();
    tokio::fs::create_dir_all(path).await?;

    let probe = path.join(".selfcheck");
    tokio::fs::write(&probe, b"ok")
        .await
        .map_err(|e| anyhow::anyhow!("{} is not writable: {}", path.display(), e))?;
    tokio::fs::remove_file(&probe).await?;
    Ok(())
}

async fn ensure_tools() -> anyhow::Result<()> {
    let runner = ProcessRunner::new();

    let tools = [
        ("ffmpeg", check_ffmpeg(), "-version"),
        ("ffprobe", check_ffprobe(), "-version"),
        ("yt-dlp", check_ytdlp(), "--version"),
    ];

    for (name, found, version_flag) in tools {
        let path = found.map_err(|e| anyhow::anyhow!("{} not available: {}", name, e))?;
        runner
            .run(name, [version_flag])
            .await
            .map_err(|e| anyhow::anyhow!("{} {} failed: {}", name, version_flag, e))?;
        println!("worker-selfcheck: {} at {}", name, path.display());
    }
    Ok(())
}

fn ensure_env_present(vars: &[&str]) -> anyhow::Result<()> {
    for var in vars {
        if std::env::var(var).is_err() {
            return Err(anyhow::anyhow!("missing required env var {}", var));
        }
    }
    Ok(())
}
