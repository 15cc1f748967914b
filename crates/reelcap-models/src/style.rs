//! Caption style presets.
//!
//! A [`StylePreset`] is what the user sends: every field is optional. It is
//! resolved exactly once per job into a [`ResolvedStyle`] where every field
//! carries a concrete value, so downstream stages never deal with defaults.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::job::ValidationError;

/// Default caption font family.
pub const DEFAULT_FONT_FAMILY: &str = "Poppins ExtraBold";
/// Default font size in points.
pub const DEFAULT_FONT_SIZE: f64 = 80.0;
/// Default text colour (white).
pub const DEFAULT_TEXT_COLOR: RgbColor = RgbColor::new(0xFF, 0xFF, 0xFF);
/// Default outline colour (black).
pub const DEFAULT_OUTLINE_COLOR: RgbColor = RgbColor::new(0x00, 0x00, 0x00);
/// Default outline thickness in points.
pub const DEFAULT_OUTLINE_THICKNESS: f64 = 6.0;
/// Default vertical position, as percent from the top of the frame.
pub const DEFAULT_VERTICAL_POSITION: f64 = 85.0;

/// User-facing caption style. All fields are optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StylePreset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size_points: Option<f64>,

    /// Hex RGB, `#RRGGBB` or `RRGGBB`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,

    /// Hex RGB, `#RRGGBB` or `RRGGBB`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outline_thickness_points: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub horizontal_alignment: Option<HorizontalAlignment>,

    /// 0 = top of frame, 100 = bottom of frame
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_position_percent: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub font_weight: Option<FontWeight>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<String>")]
    pub font_style: Option<FontStyle>,
}

impl StylePreset {
    /// Apply defaults and validate, producing a fully-specified style.
    pub fn resolve(&self) -> Result<ResolvedStyle, ValidationError> {
        let font_family = match self.font_family.as_deref().map(str::trim) {
            Some(family) if !family.is_empty() => family.to_string(),
            _ => DEFAULT_FONT_FAMILY.to_string(),
        };

        let font_size = self.font_size_points.unwrap_or(DEFAULT_FONT_SIZE);
        if !font_size.is_finite() || font_size <= 0.0 {
            return Err(ValidationError::InvalidFontSize(font_size));
        }

        let outline_thickness = self
            .outline_thickness_points
            .unwrap_or(DEFAULT_OUTLINE_THICKNESS);
        if !outline_thickness.is_finite() || outline_thickness < 0.0 {
            return Err(ValidationError::InvalidOutline(outline_thickness));
        }

        let vertical_position_percent = self
            .vertical_position_percent
            .unwrap_or(DEFAULT_VERTICAL_POSITION);
        if !(0.0..=100.0).contains(&vertical_position_percent) {
            return Err(ValidationError::PositionOutOfRange(
                vertical_position_percent,
            ));
        }

        let text_color = match &self.text_color {
            Some(hex) => hex.parse()?,
            None => DEFAULT_TEXT_COLOR,
        };
        let outline_color = match &self.outline_color {
            Some(hex) => hex.parse()?,
            None => DEFAULT_OUTLINE_COLOR,
        };

        Ok(ResolvedStyle {
            font_family,
            font_size,
            text_color,
            outline_color,
            outline_thickness,
            alignment: self.horizontal_alignment.unwrap_or_default(),
            vertical_position_percent,
            weight: self.font_weight.unwrap_or_default(),
            style: self.font_style.unwrap_or_default(),
        })
    }
}

/// A style preset with every default applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedStyle {
    pub font_family: String,
    pub font_size: f64,
    pub text_color: RgbColor,
    pub outline_color: RgbColor,
    pub outline_thickness: f64,
    pub alignment: HorizontalAlignment,
    pub vertical_position_percent: f64,
    pub weight: FontWeight,
    pub style: FontStyle,
}

impl Default for ResolvedStyle {
    fn default() -> Self {
        Self {
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            text_color: DEFAULT_TEXT_COLOR,
            outline_color: DEFAULT_OUTLINE_COLOR,
            outline_thickness: DEFAULT_OUTLINE_THICKNESS,
            alignment: HorizontalAlignment::Center,
            vertical_position_percent: DEFAULT_VERTICAL_POSITION,
            weight: FontWeight::Bold,
            style: FontStyle::Normal,
        }
    }
}

/// A 24-bit RGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RgbColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RgbColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Render as `#RRGGBB`.
    pub fn to_hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for RgbColor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);

        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ValidationError::InvalidColor(s.to_string()));
        }

        let channel = |range: std::ops::Range<usize>| {
            u8::from_str_radix(&hex[range], 16)
                .map_err(|_| ValidationError::InvalidColor(s.to_string()))
        };

        Ok(Self {
            r: channel(0..2)?,
            g: channel(2..4)?,
            b: channel(4..6)?,
        })
    }
}

/// Horizontal caption alignment. Unrecognised values fall back to center.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum HorizontalAlignment {
    Left,
    #[default]
    Center,
    Right,
}

impl HorizontalAlignment {
    pub fn as_str(&self) -> &'static str {
        match self {
            HorizontalAlignment::Left => "left",
            HorizontalAlignment::Center => "center",
            HorizontalAlignment::Right => "right",
        }
    }
}

impl From<String> for HorizontalAlignment {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "left" => HorizontalAlignment::Left,
            "right" => HorizontalAlignment::Right,
            _ => HorizontalAlignment::Center,
        }
    }
}

impl From<HorizontalAlignment> for String {
    fn from(a: HorizontalAlignment) -> Self {
        a.as_str().to_string()
    }
}

/// Font weight. Anything other than `bold` is treated as normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontWeight {
    Normal,
    #[default]
    Bold,
}

impl From<String> for FontWeight {
    fn from(s: String) -> Self {
        if s.trim().eq_ignore_ascii_case("bold") {
            FontWeight::Bold
        } else {
            FontWeight::Normal
        }
    }
}

impl From<FontWeight> for String {
    fn from(w: FontWeight) -> Self {
        match w {
            FontWeight::Normal => "normal".to_string(),
            FontWeight::Bold => "bold".to_string(),
        }
    }
}

/// Font style. Anything other than `italic` is treated as normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl From<String> for FontStyle {
    fn from(s: String) -> Self {
        if s.trim().eq_ignore_ascii_case("italic") {
            FontStyle::Italic
        } else {
            FontStyle::Normal
        }
    }
}

impl From<FontStyle> for String {
    fn from(s: FontStyle) -> Self {
        match s {
            FontStyle::Normal => "normal".to_string(),
            FontStyle::Italic => "italic".to_string(),
        }
    }
}
