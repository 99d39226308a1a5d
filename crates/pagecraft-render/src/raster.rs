//! CPU rasterizer for page export.
//!
//! Draws a resolved render plan into a `tiny-skia` pixmap. Glyphs are not
//! shaped here: text is drawn as one bar per line (with its shadow) and
//! stickers as a disc, which is enough for thumbnails and previews.

use crate::images::ImageCache;
use crate::renderer::{
    ExportOptions, MAX_OUTPUT_SIDE, RenderError, RenderResult, encode_png, matte_color,
    skia_color, skia_path,
};
use kurbo::{Ellipse, Rect, RoundedRect, Shape as KurboShape};
use pagecraft_core::elements::{
    Element, ElementKind, Geometry, ImageElement, ImageFit, SerializableColor, ShapeElement,
    StickerElement, TextAlign, TextElement,
};
use pagecraft_core::export::{RasterRequest, RasterTarget};
use pagecraft_core::page::Background;
use pagecraft_core::viewport::Surface;
use tiny_skia::{
    FillRule, FilterQuality, GradientStop, LinearGradient, Paint, Pattern, Pixmap, SpreadMode,
    Stroke, Transform,
};

/// Average glyph advance as a fraction of the font size.
const GLYPH_ADVANCE: f64 = 0.5;
/// Height of a text bar as a fraction of the font size.
const TEXT_BAR_HEIGHT: f64 = 0.6;

const STICKER_COLOR: SerializableColor = SerializableColor {
    r: 0xf2,
    g: 0xb7,
    b: 0x05,
    a: 0xff,
};

/// Raster export backend.
#[derive(Default)]
pub struct RasterRenderer {
    options: ExportOptions,
    images: ImageCache,
}

impl RasterRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ExportOptions) -> Self {
        Self {
            options,
            images: ImageCache::new(),
        }
    }

    pub fn options(&self) -> &ExportOptions {
        &self.options
    }

    /// Images available to the renderer. Register asset bytes here.
    pub fn images_mut(&mut self) -> &mut ImageCache {
        &mut self.images
    }

    fn solid_paint(&self, color: tiny_skia::Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.anti_alias = self.options.anti_alias;
        paint
    }

    /// Render a request into a pixmap of `request.output_size()`.
    pub fn render_pixmap(&mut self, request: &RasterRequest<'_>) -> RenderResult<Pixmap> {
        let (width, height) = request.output_size();
        if width == 0 || height == 0 || width > MAX_OUTPUT_SIDE || height > MAX_OUTPUT_SIDE {
            return Err(RenderError::InvalidSize { width, height });
        }
        let mut pixmap =
            Pixmap::new(width, height).ok_or(RenderError::InvalidSize { width, height })?;
        pixmap.fill(matte_color(self.options.matte));

        let scale = request.scale as f32;
        let base = Transform::from_scale(scale, scale);
        self.draw_background(&mut pixmap, &request.page.background, &request.surface, base);

        for placement in &request.plan.placements {
            // Empty-cell placeholders are editing affordances, not page content
            let Some(element) = placement.element() else {
                continue;
            };
            self.draw_element(&mut pixmap, element, &placement.geometry, &request.surface, base);
        }

        log::info!(
            "Rendered page {} at {width}x{height} ({} placements)",
            request.page.id,
            request.plan.placements.len()
        );
        Ok(pixmap)
    }

    fn draw_background(
        &self,
        pixmap: &mut Pixmap,
        background: &Background,
        surface: &Surface,
        transform: Transform,
    ) {
        let Some(rect) = tiny_skia::Rect::from_xywh(0.0, 0.0, surface.width as f32, surface.height as f32)
        else {
            return;
        };
        let paint = match background {
            Background::Solid { color } => self.solid_paint(skia_color(*color, 1.0)),
            Background::LinearGradient { angle, stops } => {
                let mut stops = stops.clone();
                stops.sort_by(|a, b| a.offset.total_cmp(&b.offset));
                let skia_stops = stops
                    .iter()
                    .map(|s| GradientStop::new(s.offset.clamp(0.0, 1.0) as f32, skia_color(s.color, 1.0)))
                    .collect();

                // Gradient line through the center, spanning the surface along `angle`
                let (sin, cos) = angle.to_radians().sin_cos();
                let half = (surface.width * cos.abs() + surface.height * sin.abs()) / 2.0;
                let center = surface.bounds().center();
                let start = tiny_skia::Point::from_xy(
                    (center.x - cos * half) as f32,
                    (center.y - sin * half) as f32,
                );
                let end = tiny_skia::Point::from_xy(
                    (center.x + cos * half) as f32,
                    (center.y + sin * half) as f32,
                );
                let Some(shader) = LinearGradient::new(
                    start,
                    end,
                    skia_stops,
                    SpreadMode::Pad,
                    Transform::identity(),
                ) else {
                    log::debug!("Gradient background without stops; leaving matte");
                    return;
                };
                Paint {
                    shader,
                    anti_alias: self.options.anti_alias,
                    ..Paint::default()
                }
            }
        };
        pixmap.fill_rect(rect, &paint, transform, None);
    }

    fn draw_element(
        &mut self,
        pixmap: &mut Pixmap,
        element: &Element,
        geometry: &Geometry,
        surface: &Surface,
        base: Transform,
    ) {
        let frame = surface.rect_px(geometry);
        let transform = if geometry.rotation == 0.0 {
            base
        } else {
            let center = frame.center();
            base.pre_concat(Transform::from_rotate_at(
                geometry.rotation as f32,
                center.x as f32,
                center.y as f32,
            ))
        };
        let opacity = element.opacity;

        match &element.kind {
            ElementKind::Shape(shape) => self.draw_shape(pixmap, shape, frame, opacity, transform),
            ElementKind::Image(image) => {
                self.draw_image(pixmap, element, image, frame, opacity, transform)
            }
            ElementKind::Text(text) => {
                self.draw_text(pixmap, text, frame, surface, opacity, transform)
            }
            ElementKind::Sticker(sticker) => {
                self.draw_sticker(pixmap, sticker, frame, opacity, transform)
            }
        }
    }

    fn draw_shape(
        &self,
        pixmap: &mut Pixmap,
        shape: &ShapeElement,
        frame: Rect,
        opacity: f64,
        transform: Transform,
    ) {
        let Some(path) = skia_path(&shape.to_path(frame)) else {
            return;
        };
        if let Some(fill) = shape.fill {
            let paint = self.solid_paint(skia_color(fill, opacity));
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
        if let Some(stroke) = shape.stroke.filter(|s| s.width > 0.0) {
            let paint = self.solid_paint(skia_color(stroke.color, opacity));
            let stroke_style = Stroke {
                width: stroke.width as f32,
                ..Stroke::default()
            };
            pixmap.stroke_path(&path, &paint, &stroke_style, transform, None);
        }
    }

    fn draw_image(
        &mut self,
        pixmap: &mut Pixmap,
        element: &Element,
        image: &ImageElement,
        frame: Rect,
        opacity: f64,
        transform: Transform,
    ) {
        let radius = image.corner_radius_px(frame.width(), frame.height());
        let Some(source) = self.images.get(element.id, &image.source) else {
            self.draw_image_placeholder(pixmap, frame, radius, opacity, transform);
            return;
        };

        let (source_w, source_h) = (source.width() as f64, source.height() as f64);
        let placed = image.fit.place(frame, source_w, source_h);
        // Cover overflows the frame and is clipped to it; contain leaves bars
        let area = match image.fit {
            ImageFit::Contain => placed,
            ImageFit::Cover | ImageFit::Fill => frame,
        };
        let Some(clip) = skia_path(&rounded(area, radius)) else {
            return;
        };

        let pattern_transform = Transform::from_row(
            (placed.width() / source_w) as f32,
            0.0,
            0.0,
            (placed.height() / source_h) as f32,
            placed.x0 as f32,
            placed.y0 as f32,
        );
        let paint = Paint {
            shader: Pattern::new(
                Pixmap::as_ref(&source),
                SpreadMode::Pad,
                FilterQuality::Bilinear,
                opacity.clamp(0.0, 1.0) as f32,
                pattern_transform,
            ),
            anti_alias: self.options.anti_alias,
            ..Paint::default()
        };
        pixmap.fill_path(&clip, &paint, FillRule::Winding, transform, None);
    }

    /// Gray box with a cross, for images that are missing or undecodable.
    fn draw_image_placeholder(
        &self,
        pixmap: &mut Pixmap,
        frame: Rect,
        radius: f64,
        opacity: f64,
        transform: Transform,
    ) {
        let Some(box_path) = skia_path(&rounded(frame, radius)) else {
            return;
        };
        let fill = self.solid_paint(skia_color(SerializableColor::new(200, 200, 200, 255), opacity));
        pixmap.fill_path(&box_path, &fill, FillRule::Winding, transform, None);

        let mut cross = kurbo::BezPath::new();
        cross.move_to((frame.x0, frame.y0));
        cross.line_to((frame.x1, frame.y1));
        cross.move_to((frame.x1, frame.y0));
        cross.line_to((frame.x0, frame.y1));
        let stroke = Stroke {
            width: 2.0,
            ..Stroke::default()
        };
        if let Some(cross) = skia_path(&cross) {
            let paint =
                self.solid_paint(skia_color(SerializableColor::new(150, 150, 150, 255), opacity));
            pixmap.stroke_path(&cross, &paint, &stroke, transform, None);
        }
        let border = self.solid_paint(skia_color(SerializableColor::new(100, 100, 100, 255), opacity));
        pixmap.stroke_path(&box_path, &border, &stroke, transform, None);
    }

    fn draw_text(
        &self,
        pixmap: &mut Pixmap,
        text: &TextElement,
        frame: Rect,
        surface: &Surface,
        opacity: f64,
        transform: Transform,
    ) {
        let style = &text.style;
        let font_px = surface.percent_to_px_y(style.font_size);
        if font_px <= 0.0 {
            return;
        }
        let line_px = font_px * style.line_height.max(0.1);
        let bar_h = font_px * TEXT_BAR_HEIGHT;
        let advance = font_px * (GLYPH_ADVANCE + style.letter_spacing);

        let mut bars = Vec::new();
        let mut y = frame.y0 + (line_px - bar_h) / 2.0;
        for line in text.display_content().lines() {
            if y + bar_h > frame.y1 {
                break;
            }
            let chars = line.trim_end().chars().count();
            if chars > 0 {
                let width = (chars as f64 * advance).clamp(0.0, frame.width());
                let x = match style.align {
                    TextAlign::Left | TextAlign::Justify => frame.x0,
                    TextAlign::Center => frame.center().x - width / 2.0,
                    TextAlign::Right => frame.x1 - width,
                };
                bars.push(Rect::new(x, y, x + width, y + bar_h));
            }
            y += line_px;
        }

        if let Some(shadow) = &style.shadow {
            let dx = surface.percent_to_px_x(shadow.offset_x);
            let dy = surface.percent_to_px_y(shadow.offset_y);
            let paint = self.solid_paint(skia_color(shadow.color, opacity));
            for bar in &bars {
                fill_rect(pixmap, bar.with_origin((bar.x0 + dx, bar.y0 + dy)), &paint, transform);
            }
        }
        let paint = self.solid_paint(skia_color(style.color, opacity));
        for bar in &bars {
            fill_rect(pixmap, *bar, &paint, transform);
        }
    }

    fn draw_sticker(
        &self,
        pixmap: &mut Pixmap,
        sticker: &StickerElement,
        frame: Rect,
        opacity: f64,
        transform: Transform,
    ) {
        if sticker.glyph.is_empty() {
            return;
        }
        let center = frame.center();
        let half_w = frame.width() * sticker.scale / 2.0;
        let half_h = frame.height() * sticker.scale / 2.0;
        let disc = Ellipse::from_rect(Rect::new(
            center.x - half_w,
            center.y - half_h,
            center.x + half_w,
            center.y + half_h,
        ));
        if let Some(path) = skia_path(&disc.to_path(0.1)) {
            let paint = self.solid_paint(skia_color(STICKER_COLOR, opacity));
            pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
        }
    }
}

fn rounded(rect: Rect, radius: f64) -> kurbo::BezPath {
    if radius > 0.0 {
        RoundedRect::from_rect(rect, radius).to_path(0.1)
    } else {
        rect.to_path(0.1)
    }
}

fn fill_rect(pixmap: &mut Pixmap, rect: Rect, paint: &Paint<'_>, transform: Transform) {
    if let Some(rect) = tiny_skia::Rect::from_ltrb(
        rect.x0 as f32,
        rect.y0 as f32,
        rect.x1 as f32,
        rect.y1 as f32,
    ) {
        pixmap.fill_rect(rect, paint, transform, None);
    }
}

/// Straight-alpha RGBA8 bytes of a pixmap.
pub fn demultiplied_rgba(pixmap: &Pixmap) -> Vec<u8> {
    pixmap
        .pixels()
        .iter()
        .flat_map(|px| {
            let c = px.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect()
}

impl RasterTarget for RasterRenderer {
    type Error = RenderError;

    fn rasterize(&mut self, request: &RasterRequest<'_>) -> RenderResult<Vec<u8>> {
        let pixmap = self.render_pixmap(request)?;
        let rgba = demultiplied_rgba(&pixmap);
        encode_png(&rgba, pixmap.width(), pixmap.height()).inspect_err(|err| {
            log::error!("Failed to encode page {}: {err}", request.page.id);
        })
    }
}
