//! Video download using yt-dlp.
//!
//! Used for streaming hosts, and as the single fallback when a direct fetch
//! does not yield a usable file.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::acquire::AcquisitionStrategy;
use crate::command::ProcessRunner;
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::{move_file, remove_if_exists};

/// Format selector: best mp4 video + m4a audio, else best single mp4, else best.
const FORMAT_SELECTOR: &str = "bestvideo[ext=mp4]+bestaudio[ext=m4a]/best[ext=mp4]/best";

/// yt-dlp backed [`AcquisitionStrategy`].
#[derive(Debug, Clone, Default)]
pub struct YtDlpExtractor {
    runner: ProcessRunner,
}

impl YtDlpExtractor {
    pub fn new(runner: ProcessRunner) -> Self {
        Self { runner }
    }

    /// Build the yt-dlp argument list.
    ///
    /// `output_template` is passed to `-o` as-is.
    pub fn build_args(
        &self,
        url: &str,
        output_template: &str,
        duration_hint: Option<f64>,
    ) -> Vec<String> {
        let mut args = vec![
            "--no-playlist".to_string(),
            "--no-progress".to_string(),
            "-f".to_string(),
            FORMAT_SELECTOR.to_string(),
            "--merge-output-format".to_string(),
            "mp4".to_string(),
        ];

        if let Some(seconds) = duration_hint {
            args.push("--download-sections".to_string());
            args.push(format!("*0-{}", seconds.ceil() as u64));
        }

        args.push("-o".to_string());
        args.push(output_template.to_string());
        args.push(url.to_string());
        args
    }
}

#[async_trait]
impl AcquisitionStrategy for YtDlpExtractor {
    fn name(&self) -> &'static str {
        "yt-dlp"
    }

    async fn fetch(&self, url: &str, dest: &Path, duration_hint: Option<f64>) -> MediaResult<()> {
        let dir = dest
            .parent()
            .ok_or_else(|| MediaError::internal("destination has no parent directory"))?;
        let prefix = extract_prefix(dest);
        let template = dir.join(format!("{}%(ext)s", prefix));

        let args = self.build_args(url, &template.to_string_lossy(), duration_hint);

        info!("Downloading {} with yt-dlp", url);
        let result = self.runner.run("yt-dlp", &args).await;

        let produced = find_output(dir, &prefix).await?;

        if let Err(e) = result {
            if let Some(path) = &produced {
                let _ = remove_if_exists(path).await;
            }
            return Err(e);
        }

        let produced = produced
            .ok_or_else(|| MediaError::download_failed("yt-dlp reported success but wrote no file"))?;

        move_file(&produced, dest).await
    }
}

/// File-name prefix yt-dlp writes under: `source.mp4.tmp` -> `source.mp4.tmp.extract.`
fn extract_prefix(dest: &Path) -> String {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "source".to_string());
    format!("{}.extract.", name)
}

/// Locate the finished yt-dlp output, ignoring in-progress fragments.
async fn find_output(dir: &Path, prefix: &str) -> MediaResult<Option<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut found = None;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().to_string();
        if !name.starts_with(prefix) || name.ends_with(".part") || name.ends_with(".ytdl") {
            continue;
        }
        // Prefer the merged mp4 if intermediate streams are still around.
        if found.is_none() || name.ends_with(".mp4") {
            found = Some(entry.path());
        }
    }

    Ok(found)
}
