//! Viewport (transient pan/zoom) and the measured drawing surface.

use crate::elements::Geometry;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Pixel size of the rendering surface the page is drawn into.
///
/// Percentage coordinates map onto this rectangle; it is re-measured on resize.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Surface {
    pub width: f64,
    pub height: f64,
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(1000.0, 1000.0)
    }
}

impl Surface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width: sanitize_dimension(width),
            height: sanitize_dimension(height),
        }
    }

    /// Horizontal pixels to percent of width.
    pub fn px_to_percent_x(&self, px: f64) -> f64 {
        px / self.width * 100.0
    }

    /// Vertical pixels to percent of height.
    pub fn px_to_percent_y(&self, px: f64) -> f64 {
        px / self.height * 100.0
    }

    pub fn percent_to_px_x(&self, percent: f64) -> f64 {
        percent / 100.0 * self.width
    }

    pub fn percent_to_px_y(&self, percent: f64) -> f64 {
        percent / 100.0 * self.height
    }

    /// Pixel delta to percentage delta, per axis.
    pub fn delta_to_percent(&self, delta: Vec2) -> Vec2 {
        Vec2::new(self.px_to_percent_x(delta.x), self.px_to_percent_y(delta.y))
    }

    /// Unrotated pixel rectangle of an element geometry.
    pub fn rect_px(&self, geometry: &Geometry) -> Rect {
        let x0 = self.percent_to_px_x(geometry.x);
        let y0 = self.percent_to_px_y(geometry.y);
        Rect::new(
            x0,
            y0,
            x0 + self.percent_to_px_x(geometry.width),
            y0 + self.percent_to_px_y(geometry.height),
        )
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

fn sanitize_dimension(value: f64) -> f64 {
    if value.is_finite() && value >= 1.0 {
        value
    } else {
        log::debug!("Surface dimension {value} replaced by 1px");
        1.0
    }
}

/// Viewport manages the screen transform on top of the surface.
///
/// It handles panning (translation) and zooming (scaling), converting
/// between screen coordinates and surface pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Current translation offset (pan)
    pub offset: Vec2,
    /// Current zoom level (1.0 = neutral)
    pub zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: 0.1,
            max_zoom: 10.0,
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn screen_to_surface(&self, screen_point: Point) -> Point {
        Point::new(
            (screen_point.x - self.offset.x) / self.zoom,
            (screen_point.y - self.offset.y) / self.zoom,
        )
    }

    /// Screen-space length to surface pixels.
    pub fn screen_to_surface_len(&self, len: f64) -> f64 {
        len / self.zoom
    }

    /// Pan by a delta in screen coordinates.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Zoom, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let surface_point = self.screen_to_surface(screen_point);
        self.zoom = new_zoom;

        // surface_point stays under screen_point
        self.offset = screen_point.to_vec2() - surface_point.to_vec2() * new_zoom;
    }

    /// Back to the neutral 1:1 state.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = 1.0;
    }

    pub fn is_neutral(&self) -> bool {
        self.offset == Vec2::ZERO && (self.zoom - 1.0).abs() < f64::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_viewport_is_neutral() {
        let viewport = Viewport::new();
        assert!(viewport.is_neutral());
        let p = Point::new(100.0, 200.0);
        assert_eq!(viewport.screen_to_surface(p), p);
    }

    #[test]
    fn test_screen_to_surface_with_offset_and_zoom() {
        let mut viewport = Viewport::new();
        viewport.offset = Vec2::new(50.0, 100.0);
        viewport.zoom = 2.0;
        let surface = viewport.screen_to_surface(Point::new(150.0, 300.0));
        assert!((surface.x - 50.0).abs() < 1e-10);
        assert!((surface.y - 100.0).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_at_keeps_point_fixed() {
        let mut viewport = Viewport::new();
        let anchor = Point::new(200.0, 100.0);
        let before = viewport.screen_to_surface(anchor);
        viewport.zoom_at(anchor, 2.0);
        let after = viewport.screen_to_surface(anchor);
        assert!((before.x - after.x).abs() < 1e-10);
        assert!((before.y - after.y).abs() < 1e-10);

        viewport.zoom_at(anchor, 1000.0);
        assert!((viewport.zoom - viewport.max_zoom).abs() < f64::EPSILON);

        viewport.reset();
        assert!(viewport.is_neutral());
    }

    #[test]
    fn test_surface_conversions() {
        let surface = Surface::new(800.0, 400.0);
        assert!((surface.px_to_percent_x(200.0) - 25.0).abs() < 1e-10);
        assert!((surface.px_to_percent_y(200.0) - 50.0).abs() < 1e-10);

        let geometry = Geometry::new(10.0, 50.0, 25.0, 25.0);
        let rect = surface.rect_px(&geometry);
        assert_eq!(rect, Rect::new(80.0, 200.0, 280.0, 300.0));
    }

    #[test]
    fn test_surface_rejects_degenerate_size() {
        let surface = Surface::new(0.0, f64::NAN);
        assert_eq!(surface.width, 1.0);
        assert_eq!(surface.height, 1.0);
    }
}
