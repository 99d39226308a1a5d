//! Export options, errors and conversions shared by the raster backend.

use kurbo::{BezPath, PathEl};
use pagecraft_core::elements::SerializableColor;
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid output size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
    #[error("Image error: {0}")]
    Image(String),
    #[error("Encoding failed: {0}")]
    Encode(String),
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Largest accepted output side, in pixels.
pub const MAX_OUTPUT_SIDE: u32 = 16_384;

/// Options for a raster export.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExportOptions {
    /// Painted under the page background; shows through translucent backgrounds.
    pub matte: Color,
    pub anti_alias: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            matte: Color::WHITE,
            anti_alias: true,
        }
    }
}

impl ExportOptions {
    pub fn with_matte(mut self, matte: Color) -> Self {
        self.matte = matte;
        self
    }

    pub fn with_anti_alias(mut self, anti_alias: bool) -> Self {
        self.anti_alias = anti_alias;
        self
    }
}

/// Convert a page color, scaling its alpha by `opacity`.
pub(crate) fn skia_color(color: SerializableColor, opacity: f64) -> tiny_skia::Color {
    let color = color.with_opacity(opacity);
    tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a)
}

pub(crate) fn matte_color(color: Color) -> tiny_skia::Color {
    let rgba = color.to_rgba8();
    tiny_skia::Color::from_rgba8(rgba.r, rgba.g, rgba.b, rgba.a)
}

/// Convert a kurbo path to a tiny-skia path. Empty paths yield `None`.
pub(crate) fn skia_path(path: &BezPath) -> Option<tiny_skia::Path> {
    let mut builder = tiny_skia::PathBuilder::new();
    for el in path.elements() {
        match *el {
            PathEl::MoveTo(p) => builder.move_to(p.x as f32, p.y as f32),
            PathEl::LineTo(p) => builder.line_to(p.x as f32, p.y as f32),
            PathEl::QuadTo(p1, p2) => {
                builder.quad_to(p1.x as f32, p1.y as f32, p2.x as f32, p2.y as f32)
            }
            PathEl::CurveTo(p1, p2, p3) => builder.cubic_to(
                p1.x as f32,
                p1.y as f32,
                p2.x as f32,
                p2.y as f32,
                p3.x as f32,
                p3.y as f32,
            ),
            PathEl::ClosePath => builder.close(),
        }
    }
    builder.finish()
}

/// Encode straight-alpha RGBA8 pixels as PNG.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::Encode(format!("PNG header: {e}")))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| RenderError::Encode(format!("PNG data: {e}")))?;
    }
    Ok(png_data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::{Rect, Shape};

    #[test]
    fn test_skia_path_conversion() {
        let rect = Rect::new(0.0, 0.0, 10.0, 20.0).to_path(0.1);
        let path = skia_path(&rect).unwrap();
        let bounds = path.bounds();
        assert_eq!(bounds.width(), 10.0);
        assert_eq!(bounds.height(), 20.0);

        assert!(skia_path(&BezPath::new()).is_none());
    }

    #[test]
    fn test_color_opacity() {
        let color = skia_color(SerializableColor::new(255, 0, 0, 255), 0.5);
        let rgba = color.to_color_u8();
        assert_eq!(rgba.red(), 255);
        assert_eq!(rgba.alpha(), 128);
    }

    #[test]
    fn test_encode_png_signature() {
        let png = encode_png(&[0u8; 4 * 4], 2, 2).unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }
}
