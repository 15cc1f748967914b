//! Audio extraction for speech recognition.

use std::path::Path;
use tracing::info;

use reelcap_models::encoding::TRANSCRIPTION_SAMPLE_RATE;

use crate::command::{FfmpegCommand, ProcessRunner};
use crate::error::{MediaError, MediaResult};
use crate::fs_utils::file_size;

/// Produces mono 16 kHz PCM audio from a video file.
#[derive(Debug, Clone, Default)]
pub struct AudioExtractor {
    runner: ProcessRunner,
}

impl AudioExtractor {
    pub fn new(runner: ProcessRunner) -> Self {
        Self { runner }
    }

    /// `-vn -ac 1 -ar 16000 -c:a pcm_s16le`, with an input-side `-t` when capped.
    pub fn build_command(
        &self,
        video: impl AsRef<Path>,
        output: impl AsRef<Path>,
        max_duration: Option<f64>,
    ) -> FfmpegCommand {
        FfmpegCommand::new(video, output)
            .max_duration(max_duration)
            .no_video()
            .audio_channels(1)
            .sample_rate(TRANSCRIPTION_SAMPLE_RATE)
            .audio_codec("pcm_s16le")
    }

    pub async fn extract(
        &self,
        video: impl AsRef<Path>,
        output: impl AsRef<Path>,
        max_duration: Option<f64>,
    ) -> MediaResult<()> {
        let output = output.as_ref();
        let cmd = self.build_command(video.as_ref(), output, max_duration);

        self.runner.run_ffmpeg(&cmd).await?;

        match file_size(output).await {
            Some(size) if size > 0 => {
                info!("Extracted audio to {} ({} bytes)", output.display(), size);
                Ok(())
            }
            Some(_) => Err(MediaError::InvalidVideo(
                "audio extraction produced an empty file".to_string(),
            )),
            None => Err(MediaError::FileNotFound(output.to_path_buf())),
        }
    }
}
