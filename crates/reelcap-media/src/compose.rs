//! Final render: framing, caption burn-in and encoding.

use std::path::PathBuf;
use tracing::info;

use reelcap_models::{EncodingConfig, FrameSize, FramingMode};

use crate::command::{FfmpegCommand, ProcessRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{caption_burn_filter, vertical_reframe_filter, REFRAME_OUTPUT_LABEL};
use crate::fs_utils::file_size;

/// Inputs for one render.
#[derive(Debug, Clone)]
pub struct ComposeRequest {
    pub input: PathBuf,
    /// Serialized caption script on disk
    pub subtitles: PathBuf,
    pub output: PathBuf,
    pub framing: FramingMode,
    pub max_duration: Option<f64>,
}

/// Renders the captioned output video.
#[derive(Debug, Clone)]
pub struct VideoComposer {
    runner: ProcessRunner,
    encoding: EncodingConfig,
    frame: FrameSize,
}

impl VideoComposer {
    pub fn new(runner: ProcessRunner) -> Self {
        Self {
            runner,
            encoding: EncodingConfig::default(),
            frame: FrameSize::VERTICAL,
        }
    }

    pub fn with_encoding(mut self, encoding: EncodingConfig) -> Self {
        self.encoding = encoding;
        self
    }

    /// Build the ffmpeg invocation for `request`.
    pub fn build_command(&self, request: &ComposeRequest) -> FfmpegCommand {
        let cmd = FfmpegCommand::new(&request.input, &request.output)
            .max_duration(request.max_duration);

        let cmd = match request.framing {
            FramingMode::Vertical => cmd
                .filter_complex(vertical_reframe_filter(self.frame, &request.subtitles))
                .map(REFRAME_OUTPUT_LABEL)
                .map("0:a?"),
            FramingMode::Original => cmd
                .video_filter(caption_burn_filter(&request.subtitles))
                .map("0:v:0")
                .map("0:a?"),
        };

        let cmd = cmd
            .video_codec(&self.encoding.codec)
            .preset(&self.encoding.preset)
            .crf(self.encoding.crf)
            .pixel_format(&self.encoding.pixel_format)
            .output_args(["-profile:v", self.encoding.profile.as_str()])
            .output_args(["-level", self.encoding.level.as_str()])
            .output_args(["-movflags", "+faststart"]);

        // A trimmed stream may not cut cleanly on a packet boundary, so
        // re-encode the audio whenever a cap is applied.
        if request.max_duration.is_some() {
            cmd.audio_codec(&self.encoding.audio_codec)
                .audio_bitrate(&self.encoding.audio_bitrate)
        } else {
            cmd.audio_codec("copy")
        }
    }

    /// Render and verify the output exists.
    pub async fn compose(&self, request: &ComposeRequest) -> MediaResult<PathBuf> {
        if !request.subtitles.exists() {
            return Err(MediaError::FileNotFound(request.subtitles.clone()));
        }

        let cmd = self.build_command(request);
        self.runner.run_ffmpeg(&cmd).await?;

        let output = cmd.output_path();
        match file_size(output).await {
            Some(size) if size > 0 => {
                info!(
                    "Rendered {} ({} bytes, framing={})",
                    output.display(),
                    size,
                    request.framing
                );
                Ok(output.to_path_buf())
            }
            _ => Err(MediaError::internal(format!(
                "ffmpeg produced no output at {}",
                output.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(framing: FramingMode, max_duration: Option<f64>) -> ComposeRequest {
        ComposeRequest {
            input: PathBuf::from("/w/source.mp4"),
            subtitles: PathBuf::from("/w/captions.ass"),
            output: PathBuf::from("/w/final.mp4"),
            framing,
            max_duration,
        }
    }

    fn value_after(args: &[String], flag: &str) -> Vec<String> {
        args.windows(2)
            .filter(|w| w[0] == flag)
            .map(|w| w[1].clone())
            .collect()
    }

    #[test]
    fn test_vertical_command() {
        let composer = VideoComposer::new(ProcessRunner::new());
        let args = composer
            .build_command(&request(FramingMode::Vertical, None))
            .build_args();

        let graph = value_after(&args, "-filter_complex");
        assert_eq!(graph.len(), 1);
        assert!(graph[0].contains("boxblur"));
        assert_eq!(value_after(&args, "-map"), vec!["[v]", "0:a?"]);
        assert_eq!(value_after(&args, "-c:v"), vec!["libx264"]);
        assert_eq!(value_after(&args, "-crf"), vec!["18"]);
        assert_eq!(value_after(&args, "-pix_fmt"), vec!["yuv420p"]);
        assert_eq!(value_after(&args, "-profile:v"), vec!["high"]);
        assert_eq!(value_after(&args, "-level"), vec!["4.1"]);
        assert_eq!(value_after(&args, "-movflags"), vec!["+faststart"]);
        assert_eq!(value_after(&args, "-c:a"), vec!["copy"]);
        assert!(!args.contains(&"-t".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("/w/final.mp4"));
    }

    #[test]
    fn test_original_framing_only_burns_captions() {
        let composer = VideoComposer::new(ProcessRunner::new());
        let args = composer
            .build_command(&request(FramingMode::Original, None))
            .build_args();

        assert!(!args.contains(&"-filter_complex".to_string()));
        assert_eq!(value_after(&args, "-vf"), vec!["ass=/w/captions.ass"]);
        assert_eq!(value_after(&args, "-map"), vec!["0:v:0", "0:a?"]);
    }

    #[test]
    fn test_duration_cap_reencodes_audio() {
        let composer = VideoComposer::new(ProcessRunner::new());
        let args = composer
            .build_command(&request(FramingMode::Vertical, Some(30.0)))
            .build_args();

        assert_eq!(value_after(&args, "-t"), vec!["30.000"]);
        assert_eq!(value_after(&args, "-c:a"), vec!["aac"]);
        assert_eq!(value_after(&args, "-b:a"), vec!["128k"]);

        let t = args.iter().position(|a| a == "-t").unwrap();
        let i = args.iter().position(|a| a == "-i").unwrap();
        assert!(t < i);
    }

    #[tokio::test]
    async fn test_missing_subtitles_fails_before_ffmpeg() {
        let composer = VideoComposer::new(ProcessRunner::new());
        let err = composer
            .compose(&request(FramingMode::Vertical, None))
            .await
            .unwrap_err();
        assert!(matches!(err, MediaError::FileNotFound(_)));
    }
}
