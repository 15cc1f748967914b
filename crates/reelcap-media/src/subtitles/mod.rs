//! Word-by-word caption composition.
//!
//! [`SubtitleComposer`] turns an ordered word list and a resolved style into a
//! [`SubtitleDocument`] plus its serialized ASS script. The style-to-format
//! translation sits behind [`StyleMapper`] so alternative looks can be plugged
//! in without touching event generation.

pub mod ass;

use std::path::Path;
use std::sync::Arc;

use reelcap_models::{CaptionEvent, FrameSize, ResolvedStyle, SubtitleDocument, Word};

use crate::error::{MediaError, MediaResult};
use crate::fs_utils::write_atomic;

pub use ass::AssStyle;
use ass::{alignment_code, render_script, sanitize_text, vertical_margin, MIN_EVENT_DURATION};

/// Horizontal margins kept clear on both sides of the frame.
pub const DEFAULT_SIDE_MARGIN: u32 = 80;

/// Maps a resolved style onto caption-format style values.
pub trait StyleMapper: Send + Sync {
    fn map_style(&self, style: &ResolvedStyle, frame: FrameSize) -> AssStyle;
}

/// Outline-only look with symmetric side margins.
#[derive(Debug, Clone, Copy)]
pub struct DefaultStyleMapper {
    pub side_margin: u32,
}

impl Default for DefaultStyleMapper {
    fn default() -> Self {
        Self {
            side_margin: DEFAULT_SIDE_MARGIN,
        }
    }
}

impl StyleMapper for DefaultStyleMapper {
    fn map_style(&self, style: &ResolvedStyle, frame: FrameSize) -> AssStyle {
        AssStyle {
            // Commas would break the comma-separated style record.
            font_name: style.font_family.replace(',', " "),
            font_size: style.font_size,
            primary_color: style.text_color,
            outline_color: style.outline_color,
            bold: AssStyle::bold_flag(style.weight),
            italic: AssStyle::italic_flag(style.style),
            outline: style.outline_thickness,
            shadow: 0.0,
            alignment: alignment_code(style.alignment),
            margin_l: self.side_margin,
            margin_r: self.side_margin,
            margin_v: vertical_margin(style.vertical_position_percent, frame.height),
        }
    }
}

/// A built caption track.
#[derive(Debug, Clone)]
pub struct ComposedSubtitles {
    pub document: SubtitleDocument,
    pub style: AssStyle,
    /// Serialized ASS script
    pub script: String,
}

impl ComposedSubtitles {
    /// Write the script to `path` (temp file, then rename).
    pub async fn write_to(&self, path: impl AsRef<Path>) -> MediaResult<()> {
        write_atomic(path, self.script.as_bytes()).await
    }
}

/// Builds caption tracks for a fixed output frame.
#[derive(Clone)]
pub struct SubtitleComposer {
    mapper: Arc<dyn StyleMapper>,
    frame: FrameSize,
}

impl Default for SubtitleComposer {
    fn default() -> Self {
        Self::new(FrameSize::VERTICAL)
    }
}

impl SubtitleComposer {
    pub fn new(frame: FrameSize) -> Self {
        Self {
            mapper: Arc::new(DefaultStyleMapper::default()),
            frame,
        }
    }

    pub fn with_mapper(mut self, mapper: Arc<dyn StyleMapper>) -> Self {
        self.mapper = mapper;
        self
    }

    pub fn frame(&self) -> FrameSize {
        self.frame
    }

    /// Compose the caption track for `words`.
    ///
    /// Fails with [`MediaError::EmptyTranscript`] on an empty word list.
    pub fn compose(&self, words: &[Word], style: &ResolvedStyle) -> MediaResult<ComposedSubtitles> {
        let document = build_document(words)?;
        let ass_style = self.mapper.map_style(style, self.frame);
        let script = render_script(&document, &ass_style, self.frame);

        Ok(ComposedSubtitles {
            document,
            style: ass_style,
            script,
        })
    }
}

/// One event per word, in order, each lasting at least [`MIN_EVENT_DURATION`].
pub fn build_document(words: &[Word]) -> MediaResult<SubtitleDocument> {
    if words.is_empty() {
        return Err(MediaError::EmptyTranscript);
    }

    let events = words
        .iter()
        .map(|word| {
            let start = word.start_seconds.max(0.0);
            let end = word.end_seconds.max(start + MIN_EVENT_DURATION);
            CaptionEvent {
                start_seconds: start,
                end_seconds: end,
                rendered_text: sanitize_text(&word.text),
            }
        })
        .collect();

    Ok(SubtitleDocument::new(events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelcap_models::{HorizontalAlignment, StylePreset};

    #[test]
    fn test_one_event_per_word_in_order() {
        let words = vec![
            Word::new("one", 0.0, 0.2),
            Word::new("two", 0.2, 0.2),
            Word::new("three", 0.5, 0.4),
            Word::new("four", 1.0, 1.5),
        ];

        let doc = build_document(&words).unwrap();
        assert_eq!(doc.len(), words.len());

        for (event, word) in doc.events().iter().zip(&words) {
            assert_eq!(event.rendered_text, word.text.to_uppercase());
            assert!(event.end_seconds >= event.start_seconds + MIN_EVENT_DURATION - 1e-9);
        }
        // Zero-length and inverted ranges get the minimum duration.
        assert!((doc.events()[1].end_seconds - 0.25).abs() < 1e-9);
        assert!((doc.events()[2].end_seconds - 0.55).abs() < 1e-9);
    }

    #[test]
    fn test_empty_words_rejected() {
        let err = build_document(&[]).unwrap_err();
        assert!(matches!(err, MediaError::EmptyTranscript));
    }

    #[test]
    fn test_braces_stripped() {
        let doc = build_document(&[Word::new("{\\c&HFF&}hey}", 0.0, 1.0)]).unwrap();
        assert!(!doc.events()[0].rendered_text.contains('{'));
        assert!(!doc.events()[0].rendered_text.contains('}'));
    }

    #[test]
    fn test_default_mapper() {
        let style = ResolvedStyle::default();
        let mapped = DefaultStyleMapper::default().map_style(&style, FrameSize::VERTICAL);
        assert_eq!(mapped.alignment, 2);
        assert_eq!(mapped.margin_v, 288);
        assert_eq!(mapped.margin_l, DEFAULT_SIDE_MARGIN);
        assert!(mapped.bold);
        assert!(!mapped.italic);
    }

    #[test]
    fn test_custom_mapper_is_used() {
        struct TopLeft;
        impl StyleMapper for TopLeft {
            fn map_style(&self, style: &ResolvedStyle, frame: FrameSize) -> AssStyle {
                let mut s = DefaultStyleMapper::default().map_style(style, frame);
                s.alignment = 7;
                s
            }
        }

        let composer = SubtitleComposer::default().with_mapper(Arc::new(TopLeft));
        let composed = composer
            .compose(&[Word::new("x", 0.0, 1.0)], &ResolvedStyle::default())
            .unwrap();
        assert_eq!(composed.style.alignment, 7);
    }

    #[test]
    fn test_hello_world_scenario() {
        let preset: StylePreset = serde_json::from_value(serde_json::json!({
            "fontSizePoints": 40,
            "verticalPositionPercent": 50,
            "horizontalAlignment": "center",
            "textColor": "#FFFFFF"
        }))
        .unwrap();
        let style = preset.resolve().unwrap();
        assert_eq!(style.alignment, HorizontalAlignment::Center);

        let words = vec![Word::new("hello", 0.0, 0.4), Word::new("world", 0.5, 0.9)];
        let composed = SubtitleComposer::default().compose(&words, &style).unwrap();

        let events = composed.document.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].rendered_text, "HELLO");
        assert_eq!(events[1].rendered_text, "WORLD");
        assert_eq!(composed.document.end_seconds(), Some(0.9));
        assert_eq!(composed.style.alignment, 2);
        assert_eq!(composed.style.margin_v, 960);

        assert!(composed
            .script
            .contains("Dialogue: 0,0:00:00.00,0:00:00.40,Default,,0,0,0,,HELLO"));
        assert!(composed
            .script
            .contains("Dialogue: 0,0:00:00.50,0:00:00.90,Default,,0,0,0,,WORLD"));
        assert!(composed.script.contains("Style: Default,Poppins ExtraBold,40,"));
    }

    #[tokio::test]
    async fn test_write_to() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("captions.ass");
        let composed = SubtitleComposer::default()
            .compose(&[Word::new("hi", 0.0, 0.3)], &ResolvedStyle::default())
            .unwrap();

        composed.write_to(&path).await.unwrap();
        let written = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(written, composed.script);
    }
}
