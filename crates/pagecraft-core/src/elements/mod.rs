//! Element definitions for the design canvas.
//!
//! Elements are pure data: percentage-space geometry, common style and a
//! kind-specific payload. Behaviour lives in the canvas, resolver and
//! transform controller.

mod image;
mod shape;
mod sticker;
mod text;

pub use image::{ImageElement, ImageFit, ImageFormat, ImagePatch, ImageSource};
pub use shape::{ShapeElement, ShapePatch, ShapeVariant, Stroke, point_to_segment_dist};
pub use sticker::{StickerElement, StickerPatch};
pub use text::{
    FontStyle, FontWeight, TextAlign, TextElement, TextPatch, TextShadow, TextStyle,
    TextTransform,
};

use kurbo::Point;
use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Smallest width/height an element may have, in percentage points.
pub const MIN_ELEMENT_SIZE: f64 = 1.0;

/// Upper bound for geometry values, in percentage points.
pub const MAX_EXTENT: f64 = 100.0;

/// Serializable color representation (RGBA8), stored as a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or `transparent`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let color = color.trim();
        if color.eq_ignore_ascii_case("transparent") {
            return Some(Self::transparent());
        }

        let hex = color.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let r = channel(0..1)? * 17;
                let g = channel(1..2)? * 17;
                let b = channel(2..3)? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }

    /// Return the color with its alpha multiplied by `opacity`.
    pub fn with_opacity(&self, opacity: f64) -> Self {
        let alpha = (self.a as f64 * opacity.clamp(0.0, 1.0)).round() as u8;
        Self { a: alpha, ..*self }
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::from_hex(&raw)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color: {raw}")))
    }
}

/// Normalize an angle in degrees to the range (-180, 180].
pub fn normalize_rotation(degrees: f64) -> f64 {
    if !degrees.is_finite() {
        return 0.0;
    }
    let wrapped = degrees.rem_euclid(360.0);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Clamp a numeric input into `[min, max]`, keeping `current` for non-finite input.
pub(crate) fn clamp_input(label: &str, value: f64, min: f64, max: f64, current: f64) -> f64 {
    if !value.is_finite() {
        log::debug!("Ignoring non-finite {label}: {value}");
        return current;
    }
    let clamped = value.clamp(min, max);
    if clamped != value {
        log::debug!("Clamped {label} from {value} to {clamped}");
    }
    clamped
}

/// Position and size in percentage-of-canvas units, plus rotation in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    /// Left edge, 0-100.
    pub x: f64,
    /// Top edge, 0-100.
    pub y: f64,
    /// Width, 0-100.
    pub width: f64,
    /// Height, 0-100.
    pub height: f64,
    /// Rotation around the element center, in degrees.
    #[serde(default)]
    pub rotation: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self::new(10.0, 10.0, 30.0, 20.0)
    }
}

impl Geometry {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            rotation: 0.0,
        }
    }

    pub fn with_rotation(mut self, degrees: f64) -> Self {
        self.rotation = normalize_rotation(degrees);
        self
    }

    /// Center point in percentage space.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Return a copy with every component clamped to its valid range.
    pub fn clamped(&self) -> Self {
        Self {
            x: clamp_input("x", self.x, 0.0, MAX_EXTENT, 0.0),
            y: clamp_input("y", self.y, 0.0, MAX_EXTENT, 0.0),
            width: clamp_input("width", self.width, MIN_ELEMENT_SIZE, MAX_EXTENT, MIN_ELEMENT_SIZE),
            height: clamp_input(
                "height",
                self.height,
                MIN_ELEMENT_SIZE,
                MAX_EXTENT,
                MIN_ELEMENT_SIZE,
            ),
            rotation: normalize_rotation(self.rotation),
        }
    }
}

/// Kind-specific payload of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Text(TextElement),
    Image(ImageElement),
    Shape(ShapeElement),
    Sticker(StickerElement),
}

impl ElementKind {
    /// Short lowercase name of the kind.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Text(_) => "text",
            ElementKind::Image(_) => "image",
            ElementKind::Shape(_) => "shape",
            ElementKind::Sticker(_) => "sticker",
        }
    }
}

fn default_opacity() -> f64 {
    1.0
}

/// One placeable visual object on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    #[serde(flatten)]
    pub geometry: Geometry,
    /// Paint and hit-test order; higher paints later.
    #[serde(default)]
    pub z_index: i32,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    /// Locked elements render but ignore drag, resize, rotate and key delete.
    #[serde(default)]
    pub locked: bool,
    pub kind: ElementKind,
}

impl Element {
    /// Create an element with default common properties.
    pub fn new(geometry: Geometry, kind: ElementKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            geometry: geometry.clamped(),
            z_index: 0,
            opacity: 1.0,
            locked: false,
            kind,
        }
    }

    /// Create a text element.
    pub fn text(geometry: Geometry, content: impl Into<String>) -> Self {
        Self::new(geometry, ElementKind::Text(TextElement::new(content)))
    }

    /// Create an image element.
    pub fn image(geometry: Geometry, source: ImageSource) -> Self {
        Self::new(geometry, ElementKind::Image(ImageElement::new(source)))
    }

    /// Create a shape element.
    pub fn shape(geometry: Geometry, variant: ShapeVariant) -> Self {
        Self::new(geometry, ElementKind::Shape(ShapeElement::new(variant)))
    }

    /// Create a sticker element.
    pub fn sticker(geometry: Geometry, glyph: impl Into<String>) -> Self {
        Self::new(geometry, ElementKind::Sticker(StickerElement::new(glyph)))
    }

    pub fn with_z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = clamp_input("opacity", opacity, 0.0, 1.0, self.opacity);
        self
    }

    pub fn locked(mut self) -> Self {
        self.locked = true;
        self
    }

    /// Assign a fresh identifier (used for duplicates and template copies).
    pub fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ElementKind::Text(_))
    }

    pub fn is_image(&self) -> bool {
        matches!(self.kind, ElementKind::Image(_))
    }

    pub fn as_text(&self) -> Option<&TextElement> {
        match &self.kind {
            ElementKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageElement> {
        match &self.kind {
            ElementKind::Image(image) => Some(image),
            _ => None,
        }
    }

    /// Editable string content (text body or sticker glyph).
    pub fn editable_content(&self) -> Option<&str> {
        match &self.kind {
            ElementKind::Text(text) => Some(&text.content),
            ElementKind::Sticker(sticker) => Some(&sticker.glyph),
            ElementKind::Image(_) | ElementKind::Shape(_) => None,
        }
    }

    /// Apply a partial update. Only `Some` fields are written; values are clamped.
    pub fn apply_patch(&mut self, patch: &ElementPatch) {
        let g = &mut self.geometry;
        if let Some(x) = patch.x {
            g.x = clamp_input("x", x, 0.0, MAX_EXTENT, g.x);
        }
        if let Some(y) = patch.y {
            g.y = clamp_input("y", y, 0.0, MAX_EXTENT, g.y);
        }
        if let Some(width) = patch.width {
            g.width = clamp_input("width", width, MIN_ELEMENT_SIZE, MAX_EXTENT, g.width);
        }
        if let Some(height) = patch.height {
            g.height = clamp_input("height", height, MIN_ELEMENT_SIZE, MAX_EXTENT, g.height);
        }
        if let Some(rotation) = patch.rotation {
            if rotation.is_finite() {
                g.rotation = normalize_rotation(rotation);
            }
        }
        if let Some(z_index) = patch.z_index {
            self.z_index = z_index;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = clamp_input("opacity", opacity, 0.0, 1.0, self.opacity);
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }

        let Some(payload) = &patch.payload else {
            return;
        };
        match (&mut self.kind, payload) {
            (ElementKind::Text(text), PayloadPatch::Text(p)) => text.apply_patch(p),
            (ElementKind::Image(image), PayloadPatch::Image(p)) => image.apply_patch(p),
            (ElementKind::Shape(shape), PayloadPatch::Shape(p)) => shape.apply_patch(p),
            (ElementKind::Sticker(sticker), PayloadPatch::Sticker(p)) => sticker.apply_patch(p),
            (kind, payload) => {
                log::warn!(
                    "Ignoring {} patch for {} element {}",
                    payload.name(),
                    kind.name(),
                    self.id
                );
            }
        }
    }
}

/// Kind-specific part of an [`ElementPatch`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PayloadPatch {
    Text(TextPatch),
    Image(ImagePatch),
    Shape(ShapePatch),
    Sticker(StickerPatch),
}

impl PayloadPatch {
    fn name(&self) -> &'static str {
        match self {
            PayloadPatch::Text(_) => "text",
            PayloadPatch::Image(_) => "image",
            PayloadPatch::Shape(_) => "shape",
            PayloadPatch::Sticker(_) => "sticker",
        }
    }
}

/// Partial update for an element: `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub z_index: Option<i32>,
    pub opacity: Option<f64>,
    pub locked: Option<bool>,
    pub payload: Option<PayloadPatch>,
}

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Patch every geometry component at once.
    pub fn geometry(geometry: Geometry) -> Self {
        Self::new()
            .position(geometry.x, geometry.y)
            .size(geometry.width, geometry.height)
            .rotation(geometry.rotation)
    }

    pub fn rotation(mut self, degrees: f64) -> Self {
        self.rotation = Some(degrees);
        self
    }

    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = Some(z_index);
        self
    }

    pub fn opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    pub fn locked(mut self, locked: bool) -> Self {
        self.locked = Some(locked);
        self
    }

    pub fn payload(mut self, payload: PayloadPatch) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Patch the text content of a text element.
    pub fn text_content(content: impl Into<String>) -> Self {
        Self::new().payload(PayloadPatch::Text(TextPatch {
            content: Some(content.into()),
            ..TextPatch::default()
        }))
    }

    /// Patch the glyph of a sticker element.
    pub fn sticker_glyph(glyph: impl Into<String>) -> Self {
        Self::new().payload(PayloadPatch::Sticker(StickerPatch {
            glyph: Some(glyph.into()),
            ..StickerPatch::default()
        }))
    }

    /// Patch the source of an image element.
    pub fn image_source(source: ImageSource) -> Self {
        Self::new().payload(PayloadPatch::Image(ImagePatch {
            source: Some(source),
            ..ImagePatch::default()
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_rotation() {
        assert!((normalize_rotation(370.0) - 10.0).abs() < 1e-9);
        assert!((normalize_rotation(-190.0) - 170.0).abs() < 1e-9);
        assert!((normalize_rotation(180.0) - 180.0).abs() < 1e-9);
        assert!((normalize_rotation(-180.0) - 180.0).abs() < 1e-9);
        assert!((normalize_rotation(-45.0) + 45.0).abs() < 1e-9);
        assert_eq!(normalize_rotation(f64::NAN), 0.0);
    }

    #[test]
    fn test_color_hex() {
        assert_eq!(
            SerializableColor::from_hex("#ffffff"),
            Some(SerializableColor::white())
        );
        assert_eq!(
            SerializableColor::from_hex("#f00"),
            Some(SerializableColor::new(255, 0, 0, 255))
        );
        assert_eq!(
            SerializableColor::from_hex("#11223380"),
            Some(SerializableColor::new(0x11, 0x22, 0x33, 0x80))
        );
        assert_eq!(SerializableColor::from_hex("red"), None);
        assert_eq!(SerializableColor::new(1, 2, 3, 255).to_hex(), "#010203");
        assert_eq!(SerializableColor::new(1, 2, 3, 4).to_hex(), "#01020304");
    }

    #[test]
    fn test_patch_preserves_unnamed_fields() {
        let mut element = Element::text(Geometry::new(10.0, 20.0, 30.0, 10.0), "Hello")
            .with_z_index(3)
            .with_opacity(0.5);
        let before = element.clone();

        element.apply_patch(&ElementPatch::new().position(40.0, 50.0));

        assert_eq!(element.geometry.x, 40.0);
        assert_eq!(element.geometry.y, 50.0);
        assert_eq!(element.geometry.width, before.geometry.width);
        assert_eq!(element.z_index, 3);
        assert_eq!(element.opacity, 0.5);
        assert_eq!(element.kind, before.kind);
    }

    #[test]
    fn test_patch_clamps_values() {
        let mut element = Element::shape(Geometry::default(), ShapeVariant::Rectangle);
        element.apply_patch(
            &ElementPatch::new()
                .size(-5.0, 250.0)
                .opacity(3.0)
                .position(-10.0, f64::NAN),
        );

        assert_eq!(element.geometry.width, MIN_ELEMENT_SIZE);
        assert_eq!(element.geometry.height, MAX_EXTENT);
        assert_eq!(element.opacity, 1.0);
        assert_eq!(element.geometry.x, 0.0);
        // Non-finite input keeps the previous value
        assert_eq!(element.geometry.y, Geometry::default().y);
    }

    #[test]
    fn test_patch_rotation_is_normalized() {
        let mut element = Element::sticker(Geometry::default(), "*");
        element.apply_patch(&ElementPatch::new().rotation(370.0));
        assert!((element.geometry.rotation - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_mismatched_payload_is_ignored() {
        let mut element = Element::shape(Geometry::default(), ShapeVariant::Circle);
        let before = element.clone();
        element.apply_patch(&ElementPatch::text_content("nope"));
        assert_eq!(element, before);
    }

    #[test]
    fn test_element_json_shape() {
        let element = Element::text(Geometry::new(1.0, 2.0, 3.0, 4.0), "Hi");
        let json = serde_json::to_value(&element).unwrap();
        assert_eq!(json["x"], 1.0);
        assert_eq!(json["zIndex"], 0);
        assert_eq!(json["kind"]["type"], "text");

        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, element);
    }
}
