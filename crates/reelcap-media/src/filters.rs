//! FFmpeg filter graphs for the final render.

use std::path::Path;

use reelcap_models::FrameSize;

/// Blur applied to the fill background of a vertical reframe.
pub const BACKGROUND_BLUR: &str = "boxblur=20:5";

/// Output label of [`vertical_reframe_filter`].
pub const REFRAME_OUTPUT_LABEL: &str = "[v]";

/// Escape a path for use as a filter option value inside a filtergraph.
///
/// Two levels apply: the option-value level (`\ ' :`) and the
/// filtergraph level (`\ ' [ ] , ;`).
pub fn escape_filter_path(path: &Path) -> String {
    let raw = path.to_string_lossy();

    let mut value = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '\'' | ':') {
            value.push('\\');
        }
        value.push(c);
    }

    let mut graph = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '\'' | '[' | ']' | ',' | ';') {
            graph.push('\\');
        }
        graph.push(c);
    }
    graph
}

/// `ass=<path>` burn-in filter.
pub fn caption_burn_filter(subtitles: &Path) -> String {
    format!("ass={}", escape_filter_path(subtitles))
}

/// 9:16 reframe with captions, labelled [`REFRAME_OUTPUT_LABEL`].
///
/// The source is split: one copy is scaled to cover the frame, cropped and
/// blurred as background; the other is scaled to fit and centered on top.
pub fn vertical_reframe_filter(frame: FrameSize, subtitles: &Path) -> String {
    let FrameSize { width, height } = frame;
    format!(
        "[0:v]split=2[bgsrc][fgsrc];\
         [bgsrc]scale={w}:{h}:force_original_aspect_ratio=increase,crop={w}:{h},{blur}[bg];\
         [fgsrc]scale={w}:{h}:force_original_aspect_ratio=decrease[fg];\
         [bg][fg]overlay=(W-w)/2:(H-h)/2,{captions},setsar=1{out}",
        w = width,
        h = height,
        blur = BACKGROUND_BLUR,
        captions = caption_burn_filter(subtitles),
        out = REFRAME_OUTPUT_LABEL,
    )
}
