//! Image element.

use super::clamp_input;
use base64::{Engine, engine::general_purpose::STANDARD};
use kurbo::Rect;
use serde::{Deserialize, Serialize};

/// Largest corner radius, in percent of the smaller side.
pub const MAX_CORNER_RADIUS: f64 = 50.0;

/// Image format for embedded image data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Png,
    Jpeg,
    WebP,
}

impl ImageFormat {
    /// Get MIME type for this format.
    pub fn mime_type(&self) -> &'static str {
        match self {
            ImageFormat::Png => "image/png",
            ImageFormat::Jpeg => "image/jpeg",
            ImageFormat::WebP => "image/webp",
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "png" => Some(ImageFormat::Png),
            "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
            "webp" => Some(ImageFormat::WebP),
            _ => None,
        }
    }

    /// Detect format from magic bytes.
    pub fn from_magic_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < 4 {
            return None;
        }

        // PNG: 89 50 4E 47
        if data.starts_with(&[0x89, 0x50, 0x4E, 0x47]) {
            return Some(ImageFormat::Png);
        }

        // JPEG: FF D8 FF
        if data.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(ImageFormat::Jpeg);
        }

        // WebP: RIFF....WEBP
        if data.len() >= 12 && &data[0..4] == b"RIFF" && &data[8..12] == b"WEBP" {
            return Some(ImageFormat::WebP);
        }

        None
    }
}

/// Where the pixels of an image come from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum ImageSource {
    /// Reference into an external asset store, resolved by an `AssetResolver`.
    Asset { reference: String },
    /// Image bytes stored inline as base64.
    #[serde(rename_all = "camelCase")]
    Embedded {
        format: ImageFormat,
        data_base64: String,
    },
}

impl ImageSource {
    pub fn asset(reference: impl Into<String>) -> Self {
        ImageSource::Asset {
            reference: reference.into(),
        }
    }

    /// Embed raw bytes, detecting the format from magic bytes.
    pub fn embed(data: &[u8]) -> Option<Self> {
        let format = ImageFormat::from_magic_bytes(data)?;
        Some(ImageSource::Embedded {
            format,
            data_base64: STANDARD.encode(data),
        })
    }

    /// Decoded bytes of an embedded image.
    pub fn embedded_bytes(&self) -> Option<Vec<u8>> {
        match self {
            ImageSource::Embedded { data_base64, .. } => STANDARD.decode(data_base64).ok(),
            ImageSource::Asset { .. } => None,
        }
    }
}

/// How an image fills its box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFit {
    /// Scale to cover the box, cropping overflow.
    #[default]
    Cover,
    /// Scale to fit inside the box, letterboxing.
    Contain,
    /// Stretch to the box.
    Fill,
}

impl ImageFit {
    /// Destination rect for an image of `source_size` drawn into `frame`.
    pub fn place(&self, frame: Rect, source_width: f64, source_height: f64) -> Rect {
        if source_width <= 0.0 || source_height <= 0.0 {
            return frame;
        }
        let sx = frame.width() / source_width;
        let sy = frame.height() / source_height;
        let scale = match self {
            ImageFit::Fill => return frame,
            ImageFit::Cover => sx.max(sy),
            ImageFit::Contain => sx.min(sy),
        };
        let width = source_width * scale;
        let height = source_height * scale;
        let center = frame.center();
        Rect::new(
            center.x - width / 2.0,
            center.y - height / 2.0,
            center.x + width / 2.0,
            center.y + height / 2.0,
        )
    }
}

/// A raster image placed on the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageElement {
    #[serde(flatten)]
    pub source: ImageSource,
    #[serde(default)]
    pub fit: ImageFit,
    /// Corner radius in percent of the smaller side.
    #[serde(default)]
    pub corner_radius: f64,
}

impl ImageElement {
    pub fn new(source: ImageSource) -> Self {
        Self {
            source,
            fit: ImageFit::default(),
            corner_radius: 0.0,
        }
    }

    /// Corner radius in pixels for a box of the given pixel size.
    pub fn corner_radius_px(&self, width: f64, height: f64) -> f64 {
        width.min(height) * self.corner_radius / 100.0
    }

    pub(crate) fn apply_patch(&mut self, patch: &ImagePatch) {
        if let Some(source) = &patch.source {
            self.source = source.clone();
        }
        if let Some(fit) = patch.fit {
            self.fit = fit;
        }
        if let Some(radius) = patch.corner_radius {
            self.corner_radius =
                clamp_input("corner radius", radius, 0.0, MAX_CORNER_RADIUS, self.corner_radius);
        }
    }
}

/// Partial update for an image payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImagePatch {
    pub source: Option<ImageSource>,
    pub fit: Option<ImageFit>,
    pub corner_radius: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_detection() {
        assert_eq!(ImageFormat::from_extension("png"), Some(ImageFormat::Png));
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("gif"), None);

        let png_header = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
        assert_eq!(
            ImageFormat::from_magic_bytes(&png_header),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_magic_bytes(&[0, 1]), None);
    }

    #[test]
    fn test_embed_round_trip() {
        let bytes = [0xFF, 0xD8, 0xFF, 0xE0, 1, 2, 3];
        let source = ImageSource::embed(&bytes).unwrap();
        assert!(matches!(
            source,
            ImageSource::Embedded {
                format: ImageFormat::Jpeg,
                ..
            }
        ));
        assert_eq!(source.embedded_bytes().unwrap(), bytes);
        assert!(ImageSource::asset("a/b.png").embedded_bytes().is_none());
    }

    #[test]
    fn test_fit_placement() {
        let frame = Rect::new(0.0, 0.0, 100.0, 100.0);

        let contain = ImageFit::Contain.place(frame, 200.0, 100.0);
        assert!((contain.width() - 100.0).abs() < 1e-9);
        assert!((contain.height() - 50.0).abs() < 1e-9);
        assert!((contain.y0 - 25.0).abs() < 1e-9);

        let cover = ImageFit::Cover.place(frame, 200.0, 100.0);
        assert!((cover.width() - 200.0).abs() < 1e-9);
        assert!((cover.x0 + 50.0).abs() < 1e-9);

        assert_eq!(ImageFit::Fill.place(frame, 200.0, 100.0), frame);
    }

    #[test]
    fn test_corner_radius_clamped() {
        let mut image = ImageElement::new(ImageSource::asset("x"));
        image.apply_patch(&ImagePatch {
            corner_radius: Some(80.0),
            ..ImagePatch::default()
        });
        assert_eq!(image.corner_radius, MAX_CORNER_RADIUS);
        assert!((image.corner_radius_px(200.0, 100.0) - 50.0).abs() < 1e-9);
    }
}
