//! Resize and rotate handles of a selected element, in surface pixels.

use super::rotate_vec;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Distance from the top edge to the rotation handle, in pixels.
pub const ROTATE_HANDLE_OFFSET: f64 = 25.0;

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Edge positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Edge {
    Top,
    Right,
    Bottom,
    Left,
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    Corner(Corner),
    /// Edge midpoint (resizes one axis).
    Edge(Edge),
    /// Rotation handle above the top edge.
    Rotate,
}

impl HandleKind {
    /// Direction of the dragged side along each local axis: -1, 0 or 1.
    /// The opposite side stays anchored. `None` for the rotate handle.
    pub fn resize_signs(&self) -> Option<(f64, f64)> {
        match self {
            HandleKind::Corner(Corner::TopLeft) => Some((-1.0, -1.0)),
            HandleKind::Corner(Corner::TopRight) => Some((1.0, -1.0)),
            HandleKind::Corner(Corner::BottomLeft) => Some((-1.0, 1.0)),
            HandleKind::Corner(Corner::BottomRight) => Some((1.0, 1.0)),
            HandleKind::Edge(Edge::Top) => Some((0.0, -1.0)),
            HandleKind::Edge(Edge::Right) => Some((1.0, 0.0)),
            HandleKind::Edge(Edge::Bottom) => Some((0.0, 1.0)),
            HandleKind::Edge(Edge::Left) => Some((-1.0, 0.0)),
            HandleKind::Rotate => None,
        }
    }
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in surface pixels.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point (surface pixels) hits this handle.
    /// `tolerance` should already be adjusted for viewport zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        let dx = point.x - self.position.x;
        let dy = point.y - self.position.y;
        dx * dx + dy * dy <= tolerance * tolerance
    }
}

/// Corner, edge and rotate handles for a box rotated by `rotation` degrees
/// around its center.
pub fn handles_for(rect: Rect, rotation: f64) -> Vec<Handle> {
    let center = rect.center();
    let half_w = rect.width() / 2.0;
    let half_h = rect.height() / 2.0;
    let at = |dx: f64, dy: f64| center + rotate_vec(Vec2::new(dx, dy), rotation);

    vec![
        // Rotate first so it wins over a top edge handle on tiny boxes
        Handle::new(at(0.0, -half_h - ROTATE_HANDLE_OFFSET), HandleKind::Rotate),
        Handle::new(at(-half_w, -half_h), HandleKind::Corner(Corner::TopLeft)),
        Handle::new(at(half_w, -half_h), HandleKind::Corner(Corner::TopRight)),
        Handle::new(at(-half_w, half_h), HandleKind::Corner(Corner::BottomLeft)),
        Handle::new(at(half_w, half_h), HandleKind::Corner(Corner::BottomRight)),
        Handle::new(at(0.0, -half_h), HandleKind::Edge(Edge::Top)),
        Handle::new(at(half_w, 0.0), HandleKind::Edge(Edge::Right)),
        Handle::new(at(0.0, half_h), HandleKind::Edge(Edge::Bottom)),
        Handle::new(at(-half_w, 0.0), HandleKind::Edge(Edge::Left)),
    ]
}

/// Find the handle hit at `point`, preferring the closest one.
pub fn hit_test_handles(handles: &[Handle], point: Point, tolerance: f64) -> Option<HandleKind> {
    handles
        .iter()
        .filter(|h| h.hit_test(point, tolerance))
        .min_by(|a, b| {
            a.position
                .distance(point)
                .total_cmp(&b.position.distance(point))
        })
        .map(|h| h.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unrotated_handles() {
        let handles = handles_for(Rect::new(100.0, 100.0, 300.0, 200.0), 0.0);
        assert_eq!(handles.len(), 9);

        let find = |kind| handles.iter().find(|h| h.kind == kind).unwrap().position;
        assert_eq!(find(HandleKind::Corner(Corner::TopLeft)), Point::new(100.0, 100.0));
        assert_eq!(find(HandleKind::Corner(Corner::BottomRight)), Point::new(300.0, 200.0));
        assert_eq!(find(HandleKind::Edge(Edge::Right)), Point::new(300.0, 150.0));
        assert_eq!(find(HandleKind::Rotate), Point::new(200.0, 75.0));
    }

    #[test]
    fn test_handles_rotate_with_element() {
        let handles = handles_for(Rect::new(0.0, 0.0, 100.0, 100.0), 90.0);
        let top_left = handles
            .iter()
            .find(|h| h.kind == HandleKind::Corner(Corner::TopLeft))
            .unwrap()
            .position;
        // Rotated 90 degrees clockwise, the top-left corner lands top-right
        assert!((top_left.x - 100.0).abs() < 1e-9);
        assert!(top_left.y.abs() < 1e-9);
    }

    #[test]
    fn test_hit_test_prefers_closest() {
        let handles = handles_for(Rect::new(0.0, 0.0, 20.0, 20.0), 0.0);
        let hit = hit_test_handles(&handles, Point::new(19.0, 19.0), 12.0);
        assert_eq!(hit, Some(HandleKind::Corner(Corner::BottomRight)));
        assert_eq!(hit_test_handles(&handles, Point::new(200.0, 200.0), 12.0), None);
    }

    #[test]
    fn test_resize_signs() {
        assert_eq!(
            HandleKind::Corner(Corner::TopLeft).resize_signs(),
            Some((-1.0, -1.0))
        );
        assert_eq!(HandleKind::Edge(Edge::Bottom).resize_signs(), Some((0.0, 1.0)));
        assert_eq!(HandleKind::Rotate.resize_signs(), None);
    }
}
