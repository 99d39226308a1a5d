//! Text element.

use super::{SerializableColor, clamp_input};
use serde::{Deserialize, Serialize};

/// Smallest font size, in percent of canvas height.
pub const MIN_FONT_SIZE: f64 = 0.5;
/// Largest font size, in percent of canvas height.
pub const MAX_FONT_SIZE: f64 = 100.0;

/// Font weight options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    Light,
    /// Regular weight (default).
    #[default]
    Regular,
    Bold,
    Black,
}

impl FontWeight {
    /// CSS-style numeric weight.
    pub fn numeric(&self) -> u16 {
        match self {
            FontWeight::Light => 300,
            FontWeight::Regular => 400,
            FontWeight::Bold => 700,
            FontWeight::Black => 900,
        }
    }

    /// Get all available font weights.
    pub fn all() -> &'static [FontWeight] {
        &[
            FontWeight::Light,
            FontWeight::Regular,
            FontWeight::Bold,
            FontWeight::Black,
        ]
    }
}

/// Font style options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

/// Case transform applied when displaying text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

impl TextTransform {
    /// Apply the transform to `content`.
    pub fn apply(&self, content: &str) -> String {
        match self {
            TextTransform::None => content.to_string(),
            TextTransform::Uppercase => content.to_uppercase(),
            TextTransform::Lowercase => content.to_lowercase(),
            TextTransform::Capitalize => {
                let mut out = String::with_capacity(content.len());
                let mut at_word_start = true;
                for ch in content.chars() {
                    if at_word_start && ch.is_alphabetic() {
                        out.extend(ch.to_uppercase());
                        at_word_start = false;
                    } else {
                        out.push(ch);
                        at_word_start = ch.is_whitespace();
                    }
                }
                out
            }
        }
    }
}

/// Drop shadow behind text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextShadow {
    pub color: SerializableColor,
    /// Horizontal offset in percent of canvas width.
    pub offset_x: f64,
    /// Vertical offset in percent of canvas height.
    pub offset_y: f64,
    #[serde(default)]
    pub blur: f64,
}

/// Typographic style of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub font_family: String,
    /// Font size in percent of canvas height.
    pub font_size: f64,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub color: SerializableColor,
    pub align: TextAlign,
    /// Extra spacing between characters, in em.
    pub letter_spacing: f64,
    /// Line height multiplier.
    pub line_height: f64,
    pub transform: TextTransform,
    pub shadow: Option<TextShadow>,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: "Inter".to_string(),
            font_size: 4.0,
            font_weight: FontWeight::Regular,
            font_style: FontStyle::Normal,
            color: SerializableColor::black(),
            align: TextAlign::Left,
            letter_spacing: 0.0,
            line_height: 1.2,
            transform: TextTransform::None,
            shadow: None,
        }
    }
}

/// A block of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub content: String,
    #[serde(default)]
    pub style: TextStyle,
}

impl TextElement {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            style: TextStyle::default(),
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    /// Content as it should be displayed, with the case transform applied.
    pub fn display_content(&self) -> String {
        self.style.transform.apply(&self.content)
    }

    pub(crate) fn apply_patch(&mut self, patch: &TextPatch) {
        if let Some(content) = &patch.content {
            self.content = content.clone();
        }
        let style = &mut self.style;
        if let Some(family) = &patch.font_family {
            style.font_family = family.clone();
        }
        if let Some(size) = patch.font_size {
            style.font_size =
                clamp_input("font size", size, MIN_FONT_SIZE, MAX_FONT_SIZE, style.font_size);
        }
        if let Some(weight) = patch.font_weight {
            style.font_weight = weight;
        }
        if let Some(font_style) = patch.font_style {
            style.font_style = font_style;
        }
        if let Some(color) = patch.color {
            style.color = color;
        }
        if let Some(align) = patch.align {
            style.align = align;
        }
        if let Some(spacing) = patch.letter_spacing {
            if spacing.is_finite() {
                style.letter_spacing = spacing;
            }
        }
        if let Some(line_height) = patch.line_height {
            style.line_height =
                clamp_input("line height", line_height, 0.5, 5.0, style.line_height);
        }
        if let Some(transform) = patch.transform {
            style.transform = transform;
        }
        if let Some(shadow) = patch.shadow {
            style.shadow = shadow;
        }
    }
}

/// Partial update for a text payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextPatch {
    pub content: Option<String>,
    pub font_family: Option<String>,
    pub font_size: Option<f64>,
    pub font_weight: Option<FontWeight>,
    pub font_style: Option<FontStyle>,
    pub color: Option<SerializableColor>,
    pub align: Option<TextAlign>,
    pub letter_spacing: Option<f64>,
    pub line_height: Option<f64>,
    pub transform: Option<TextTransform>,
    /// `Some(None)` removes the shadow.
    pub shadow: Option<Option<TextShadow>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_transform() {
        assert_eq!(TextTransform::Uppercase.apply("abc"), "ABC");
        assert_eq!(TextTransform::Lowercase.apply("AbC"), "abc");
        assert_eq!(
            TextTransform::Capitalize.apply("hello big world"),
            "Hello Big World"
        );
        assert_eq!(TextTransform::None.apply("MiXed"), "MiXed");
    }

    #[test]
    fn test_font_size_clamped() {
        let mut text = TextElement::new("x");
        text.apply_patch(&TextPatch {
            font_size: Some(0.01),
            ..TextPatch::default()
        });
        assert_eq!(text.style.font_size, MIN_FONT_SIZE);

        text.apply_patch(&TextPatch {
            font_size: Some(500.0),
            ..TextPatch::default()
        });
        assert_eq!(text.style.font_size, MAX_FONT_SIZE);
    }

    #[test]
    fn test_patch_keeps_other_style() {
        let mut text = TextElement::new("x");
        text.style.align = TextAlign::Center;
        text.apply_patch(&TextPatch {
            font_weight: Some(FontWeight::Bold),
            ..TextPatch::default()
        });
        assert_eq!(text.style.font_weight, FontWeight::Bold);
        assert_eq!(text.style.align, TextAlign::Center);
        assert_eq!(text.content, "x");
    }

    #[test]
    fn test_remove_shadow() {
        let mut text = TextElement::new("x");
        text.style.shadow = Some(TextShadow {
            color: SerializableColor::black(),
            offset_x: 1.0,
            offset_y: 1.0,
            blur: 0.0,
        });
        text.apply_patch(&TextPatch {
            shadow: Some(None),
            ..TextPatch::default()
        });
        assert!(text.style.shadow.is_none());
    }
}
