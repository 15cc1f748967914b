//! Advanced SubStation Alpha (ASS) serialization.
//!
//! Everything here is a pure function of its inputs.

use std::fmt::Write as _;

use reelcap_models::{
    FontStyle, FontWeight, FrameSize, HorizontalAlignment, RgbColor, SubtitleDocument,
};

/// Shortest time a caption stays on screen.
pub const MIN_EVENT_DURATION: f64 = 0.05;

/// Name of the single style record every event references.
pub const STYLE_NAME: &str = "Default";

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// `H:MM:SS.cc`, rounded to the nearest centisecond. Negative input clamps to zero.
pub fn format_timestamp(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0).round() as u64;
    let cs = total_cs % 100;
    let total_secs = total_cs / 100;
    let s = total_secs % 60;
    let m = (total_secs / 60) % 60;
    let h = total_secs / 3600;
    format!("{}:{:02}:{:02}.{:02}", h, m, s, cs)
}

/// `&H00BBGGRR`: opaque alpha, channels in reverse order.
pub fn ass_color(color: RgbColor) -> String {
    format!("&H00{:02X}{:02X}{:02X}", color.b, color.g, color.r)
}

/// Numpad-style bottom-row alignment code.
pub fn alignment_code(alignment: HorizontalAlignment) -> u8 {
    match alignment {
        HorizontalAlignment::Left => 1,
        HorizontalAlignment::Center => 2,
        HorizontalAlignment::Right => 3,
    }
}

/// Bottom margin in pixels for a position given as percent from the top.
pub fn vertical_margin(position_percent: f64, frame_height: u32) -> u32 {
    let percent = position_percent.clamp(0.0, 100.0);
    ((100.0 - percent) / 100.0 * f64::from(frame_height)).round() as u32
}

/// Strip override braces and backslashes, flatten line breaks, then upper-case.
pub fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '{' | '}' | '\\'))
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect::<String>()
        .trim()
        .to_uppercase()
}

/// Style values in caption-format units.
#[derive(Debug, Clone, PartialEq)]
pub struct AssStyle {
    pub font_name: String,
    pub font_size: f64,
    pub primary_color: RgbColor,
    pub outline_color: RgbColor,
    pub bold: bool,
    pub italic: bool,
    pub outline: f64,
    pub shadow: f64,
    pub alignment: u8,
    pub margin_l: u32,
    pub margin_r: u32,
    pub margin_v: u32,
}

impl AssStyle {
    pub fn bold_flag(weight: FontWeight) -> bool {
        weight == FontWeight::Bold
    }

    pub fn italic_flag(style: FontStyle) -> bool {
        style == FontStyle::Italic
    }

    /// The `Style:` record.
    pub fn to_line(&self) -> String {
        let primary = ass_color(self.primary_color);
        format!(
            "Style: {},{},{},{},{},{},&H00000000,{},{},0,0,100,100,0,0,1,{},{},{},{},{},{},1",
            STYLE_NAME,
            self.font_name,
            format_number(self.font_size),
            primary,
            primary,
            ass_color(self.outline_color),
            ass_flag(self.bold),
            ass_flag(self.italic),
            format_number(self.outline),
            format_number(self.shadow),
            self.alignment,
            self.margin_l,
            self.margin_r,
            self.margin_v,
        )
    }
}

/// Render a complete script for `document`.
pub fn render_script(document: &SubtitleDocument, style: &AssStyle, frame: FrameSize) -> String {
    let mut out = String::new();

    out.push_str("[Script Info]\n");
    out.push_str("ScriptType: v4.00+\n");
    let _ = writeln!(out, "PlayResX: {}", frame.width);
    let _ = writeln!(out, "PlayResY: {}", frame.height);
    out.push_str("ScaledBorderAndShadow: yes\n");
    out.push('\n');

    out.push_str("[V4+ Styles]\n");
    out.push_str(STYLE_FORMAT);
    out.push('\n');
    out.push_str(&style.to_line());
    out.push('\n');
    out.push('\n');

    out.push_str("[Events]\n");
    out.push_str(EVENT_FORMAT);
    out.push('\n');
    for event in document.events() {
        let _ = writeln!(
            out,
            "Dialogue: 0,{},{},{},,0,0,0,,{}",
            format_timestamp(event.start_seconds),
            format_timestamp(event.end_seconds),
            STYLE_NAME,
            event.rendered_text
        );
    }

    out
}

fn ass_flag(on: bool) -> i8 {
    if on {
        -1
    } else {
        0
    }
}

/// Whole numbers without a fraction, others with up to two decimals.
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        let s = format!("{:.2}", value);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelcap_models::CaptionEvent;

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "0:00:00.00");
        assert_eq!(format_timestamp(0.4), "0:00:00.40");
        assert_eq!(format_timestamp(61.257), "0:01:01.26");
        assert_eq!(format_timestamp(3723.5), "1:02:03.50");
        assert_eq!(format_timestamp(59.999), "0:01:00.00");
        assert_eq!(format_timestamp(-1.0), "0:00:00.00");
    }

    #[test]
    fn test_ass_color_swaps_channels() {
        assert_eq!(ass_color(RgbColor::new(0xFF, 0, 0)), "&H000000FF");
        assert_eq!(ass_color(RgbColor::new(0, 0xFF, 0)), "&H0000FF00");
        assert_eq!(ass_color(RgbColor::new(0, 0, 0xFF)), "&H00FF0000");
        assert_eq!(ass_color(RgbColor::new(0x12, 0x34, 0x56)), "&H00563412");
    }

    #[test]
    fn test_alignment_codes() {
        assert_eq!(alignment_code(HorizontalAlignment::Left), 1);
        assert_eq!(alignment_code(HorizontalAlignment::Center), 2);
        assert_eq!(alignment_code(HorizontalAlignment::Right), 3);
    }

    #[test]
    fn test_vertical_margin() {
        assert_eq!(vertical_margin(100.0, 1920), 0);
        assert_eq!(vertical_margin(0.0, 1920), 1920);
        assert_eq!(vertical_margin(50.0, 1920), 960);
        assert_eq!(vertical_margin(85.0, 1920), 288);
    }

    #[test]
    fn test_sanitize_text() {
        assert_eq!(sanitize_text("hello"), "HELLO");
        assert_eq!(sanitize_text("{\\b1}bold"), "B1BOLD");
        assert_eq!(sanitize_text("a\nb"), "A B");
        // Upper-casing must not turn \n or \h into line-break or space markup.
        assert_eq!(sanitize_text("line\\nbreak"), "LINENBREAK");
        assert_eq!(sanitize_text("hard\\hspace"), "HARDHSPACE");
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(80.0), "80");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(0.0), "0");
    }

    #[test]
    fn test_render_script_layout() {
        let doc = SubtitleDocument::new(vec![CaptionEvent {
            start_seconds: 1.0,
            end_seconds: 1.5,
            rendered_text: "HI".to_string(),
        }]);
        let style = AssStyle {
            font_name: "Poppins ExtraBold".to_string(),
            font_size: 80.0,
            primary_color: RgbColor::new(0xFF, 0xFF, 0xFF),
            outline_color: RgbColor::new(0, 0, 0),
            bold: true,
            italic: false,
            outline: 6.0,
            shadow: 0.0,
            alignment: 2,
            margin_l: 80,
            margin_r: 80,
            margin_v: 288,
        };

        let script = render_script(&doc, &style, FrameSize::VERTICAL);
        let lines: Vec<&str> = script.lines().collect();

        assert_eq!(lines[0], "[Script Info]");
        assert!(lines.contains(&"PlayResX: 1080"));
        assert!(lines.contains(&"PlayResY: 1920"));
        assert!(lines.contains(&
            "Style: Default,Poppins ExtraBold,80,&H00FFFFFF,&H00FFFFFF,&H00000000,&H00000000,-1,0,0,0,100,100,0,0,1,6,0,2,80,80,288,1"
        ));
        assert_eq!(
            lines.last().copied(),
            Some("Dialogue: 0,0:00:01.00,0:00:01.50,Default,,0,0,0,,HI")
        );
    }
}
