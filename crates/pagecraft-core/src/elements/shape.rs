//! Geometric shape element.

use super::{SerializableColor, clamp_input};
use kurbo::{BezPath, Ellipse, Point, Rect, Shape as KurboShape, Vec2};
use serde::{Deserialize, Serialize};

/// Largest stroke width, in pixels at 1:1 scale.
pub const MAX_STROKE_WIDTH: f64 = 20.0;

/// Which geometric primitive a shape draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeVariant {
    #[default]
    Rectangle,
    /// Ellipse inscribed in the element box.
    Circle,
    /// Horizontal line through the vertical center of the box.
    Line,
}

/// Outline of a shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: SerializableColor,
    pub width: f64,
}

impl Stroke {
    pub fn new(color: SerializableColor, width: f64) -> Self {
        Self {
            color,
            width: clamp_input("stroke width", width, 0.0, MAX_STROKE_WIDTH, 1.0),
        }
    }
}

/// A filled and/or stroked primitive.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeElement {
    pub variant: ShapeVariant,
    #[serde(default)]
    pub fill: Option<SerializableColor>,
    #[serde(default)]
    pub stroke: Option<Stroke>,
}

impl ShapeElement {
    pub fn new(variant: ShapeVariant) -> Self {
        let (fill, stroke) = match variant {
            ShapeVariant::Line => (None, Some(Stroke::new(SerializableColor::black(), 2.0))),
            ShapeVariant::Rectangle | ShapeVariant::Circle => {
                (Some(SerializableColor::new(0xcc, 0xcc, 0xcc, 255)), None)
            }
        };
        Self {
            variant,
            fill,
            stroke,
        }
    }

    pub fn with_fill(mut self, fill: Option<SerializableColor>) -> Self {
        self.fill = fill;
        self
    }

    pub fn with_stroke(mut self, stroke: Option<Stroke>) -> Self {
        self.stroke = stroke;
        self
    }

    /// Outline of the shape inside `frame` (unrotated).
    pub fn to_path(&self, frame: Rect) -> BezPath {
        match self.variant {
            ShapeVariant::Rectangle => frame.to_path(0.1),
            ShapeVariant::Circle => Ellipse::from_rect(frame).to_path(0.1),
            ShapeVariant::Line => {
                let cy = frame.center().y;
                let mut path = BezPath::new();
                path.move_to(Point::new(frame.x0, cy));
                path.line_to(Point::new(frame.x1, cy));
                path
            }
        }
    }

    /// Whether `point` (unrotated, same space as `frame`) hits the shape.
    pub fn hit_test(&self, point: Point, frame: Rect, tolerance: f64) -> bool {
        match self.variant {
            ShapeVariant::Rectangle => frame.inflate(tolerance, tolerance).contains(point),
            ShapeVariant::Circle => {
                let rx = frame.width() / 2.0 + tolerance;
                let ry = frame.height() / 2.0 + tolerance;
                if rx <= 0.0 || ry <= 0.0 {
                    return false;
                }
                let d: Vec2 = point - frame.center();
                (d.x / rx).powi(2) + (d.y / ry).powi(2) <= 1.0
            }
            ShapeVariant::Line => {
                let cy = frame.center().y;
                let half_width = self.stroke.map(|s| s.width / 2.0).unwrap_or(0.0);
                point_to_segment_dist(point, Point::new(frame.x0, cy), Point::new(frame.x1, cy))
                    <= tolerance + half_width
            }
        }
    }

    pub(crate) fn apply_patch(&mut self, patch: &ShapePatch) {
        if let Some(variant) = patch.variant {
            self.variant = variant;
        }
        if let Some(fill) = patch.fill {
            self.fill = fill;
        }
        if let Some(stroke) = patch.stroke {
            self.stroke = stroke.map(|s| Stroke::new(s.color, s.width));
        }
    }
}

/// Partial update for a shape payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShapePatch {
    pub variant: Option<ShapeVariant>,
    /// `Some(None)` removes the fill.
    pub fill: Option<Option<SerializableColor>>,
    /// `Some(None)` removes the stroke.
    pub stroke: Option<Option<Stroke>>,
}

/// Distance from a point to a line segment.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let seg = Vec2::new(b.x - a.x, b.y - a.y);
    let pv = Vec2::new(point.x - a.x, point.y - a.y);
    let len_sq = seg.hypot2();
    if len_sq < f64::EPSILON {
        return pv.hypot();
    }
    let t = (pv.dot(seg) / len_sq).clamp(0.0, 1.0);
    let proj = Point::new(a.x + t * seg.x, a.y + t * seg.y);
    ((point.x - proj.x).powi(2) + (point.y - proj.y).powi(2)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_to_segment_dist() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
        assert!((point_to_segment_dist(Point::new(-4.0, 3.0), a, b) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_circle_hit_test() {
        let shape = ShapeElement::new(ShapeVariant::Circle);
        let frame = Rect::new(0.0, 0.0, 100.0, 100.0);
        assert!(shape.hit_test(Point::new(50.0, 50.0), frame, 0.0));
        // Corner of the box is outside the inscribed ellipse
        assert!(!shape.hit_test(Point::new(2.0, 2.0), frame, 0.0));
    }

    #[test]
    fn test_line_hit_test() {
        let shape = ShapeElement::new(ShapeVariant::Line);
        let frame = Rect::new(0.0, 0.0, 100.0, 20.0);
        assert!(shape.hit_test(Point::new(50.0, 12.0), frame, 2.0));
        assert!(!shape.hit_test(Point::new(50.0, 0.0), frame, 2.0));
    }

    #[test]
    fn test_stroke_width_clamped() {
        let mut shape = ShapeElement::new(ShapeVariant::Rectangle);
        shape.apply_patch(&ShapePatch {
            stroke: Some(Some(Stroke {
                color: SerializableColor::black(),
                width: 55.0,
            })),
            ..ShapePatch::default()
        });
        assert_eq!(shape.stroke.unwrap().width, MAX_STROKE_WIDTH);
    }
}
