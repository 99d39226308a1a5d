//! Drag, resize and rotate gestures.
//!
//! A gesture goes `Idle -> Pending -> Active -> (commit | cancel)`. Every
//! update recomputes the preview from the original geometries and the
//! current pointer, so updates are idempotent and never touch the page.
//! Points are surface pixels.

use crate::elements::{ElementId, Geometry, MIN_ELEMENT_SIZE, normalize_rotation};
use crate::input::Modifiers;
use crate::selection::{HandleKind, rotate_vec};
use crate::viewport::Surface;
use kurbo::{Point, Vec2};

/// Rotation snap increment with shift held, in degrees.
pub const ROTATION_SNAP_DEGREES: f64 = 15.0;

/// What a gesture does once active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize(HandleKind),
    Rotate,
}

#[derive(Debug, Clone, PartialEq)]
enum TransformState {
    Idle,
    /// Pointer is down but has not travelled past the threshold.
    Pending(Gesture),
    Active(Gesture),
}

#[derive(Debug, Clone, PartialEq)]
struct Gesture {
    kind: GestureKind,
    start: Point,
    current: Point,
    /// Travel (surface pixels) needed before the gesture activates.
    threshold: f64,
    originals: Vec<(ElementId, Geometry)>,
    preview: Vec<(ElementId, Geometry)>,
}

impl Gesture {
    fn delta(&self) -> Vec2 {
        self.current - self.start
    }
}

/// State machine for one pointer gesture at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformController {
    state: TransformState,
}

impl Default for TransformController {
    fn default() -> Self {
        Self::new()
    }
}

impl TransformController {
    pub fn new() -> Self {
        Self {
            state: TransformState::Idle,
        }
    }

    /// Arm a gesture on pointer down. Any previous gesture is discarded.
    pub fn begin(
        &mut self,
        kind: GestureKind,
        start: Point,
        originals: Vec<(ElementId, Geometry)>,
        threshold: f64,
    ) {
        if originals.is_empty() {
            self.state = TransformState::Idle;
            return;
        }
        self.state = TransformState::Pending(Gesture {
            kind,
            start,
            current: start,
            threshold: threshold.max(0.0),
            preview: originals.clone(),
            originals,
        });
    }

    /// Feed the current pointer position. Returns true while the gesture is active.
    pub fn update(&mut self, point: Point, modifiers: Modifiers, surface: &Surface) -> bool {
        let state = std::mem::replace(&mut self.state, TransformState::Idle);
        self.state = match state {
            TransformState::Idle => TransformState::Idle,
            TransformState::Pending(mut gesture) => {
                gesture.current = point;
                if gesture.delta().hypot() > gesture.threshold {
                    log::debug!("Gesture {:?} activated", gesture.kind);
                    gesture.preview = compute_preview(&gesture, modifiers, surface);
                    TransformState::Active(gesture)
                } else {
                    TransformState::Pending(gesture)
                }
            }
            TransformState::Active(mut gesture) => {
                gesture.current = point;
                gesture.preview = compute_preview(&gesture, modifiers, surface);
                TransformState::Active(gesture)
            }
        };
        self.is_active()
    }

    /// Finish the gesture. Returns the final geometries if it was active;
    /// `None` for a click that never passed the threshold.
    pub fn commit(&mut self) -> Option<Vec<(ElementId, Geometry)>> {
        match std::mem::replace(&mut self.state, TransformState::Idle) {
            TransformState::Active(gesture) => Some(gesture.preview),
            TransformState::Pending(_) | TransformState::Idle => None,
        }
    }

    /// Discard the gesture and its preview.
    pub fn cancel(&mut self) {
        if !self.is_idle() {
            log::debug!("Gesture cancelled");
        }
        self.state = TransformState::Idle;
    }

    /// Live geometries while active, empty otherwise.
    pub fn preview(&self) -> &[(ElementId, Geometry)] {
        match &self.state {
            TransformState::Active(gesture) => &gesture.preview,
            _ => &[],
        }
    }

    pub fn kind(&self) -> Option<GestureKind> {
        match &self.state {
            TransformState::Pending(g) | TransformState::Active(g) => Some(g.kind),
            TransformState::Idle => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, TransformState::Idle)
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, TransformState::Pending(_))
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, TransformState::Active(_))
    }
}

fn compute_preview(
    gesture: &Gesture,
    modifiers: Modifiers,
    surface: &Surface,
) -> Vec<(ElementId, Geometry)> {
    let delta = gesture.delta();
    gesture
        .originals
        .iter()
        .map(|(id, original)| {
            let geometry = match gesture.kind {
                GestureKind::Move => apply_move(original, delta, surface),
                GestureKind::Resize(handle) => {
                    apply_resize(original, handle, delta, modifiers.shift, surface)
                }
                GestureKind::Rotate => apply_rotation(original, gesture.current, modifiers.shift, surface),
            };
            (*id, geometry.clamped())
        })
        .collect()
}

/// Translate by a pixel delta.
pub fn apply_move(original: &Geometry, delta: Vec2, surface: &Surface) -> Geometry {
    let d = surface.delta_to_percent(delta);
    Geometry {
        x: original.x + d.x,
        y: original.y + d.y,
        ..*original
    }
}

/// Resize from a handle, keeping the opposite side anchored in the
/// element's rotated frame. `keep_aspect_ratio` applies to corner handles.
pub fn apply_resize(
    original: &Geometry,
    handle: HandleKind,
    delta: Vec2,
    keep_aspect_ratio: bool,
    surface: &Surface,
) -> Geometry {
    let Some((sx, sy)) = handle.resize_signs() else {
        return *original;
    };
    let rect = surface.rect_px(original);
    let (w, h) = (rect.width(), rect.height());
    let theta = original.rotation;
    let local = rotate_vec(delta, -theta);

    let min_w = surface.percent_to_px_x(MIN_ELEMENT_SIZE);
    let min_h = surface.percent_to_px_y(MIN_ELEMENT_SIZE);
    let mut new_w = (w + sx * local.x).max(min_w);
    let mut new_h = (h + sy * local.y).max(min_h);

    if keep_aspect_ratio && sx != 0.0 && sy != 0.0 && w > 0.0 && h > 0.0 {
        let ratio = w / h;
        if new_w / w >= new_h / h {
            new_h = new_w / ratio;
        } else {
            new_w = new_h * ratio;
        }
    }

    let center = rect.center();
    let anchor = center + rotate_vec(Vec2::new(-sx * w / 2.0, -sy * h / 2.0), theta);
    let new_center = anchor + rotate_vec(Vec2::new(sx * new_w / 2.0, sy * new_h / 2.0), theta);

    let top_left = Point::new(new_center.x - new_w / 2.0, new_center.y - new_h / 2.0);
    Geometry {
        x: surface.px_to_percent_x(top_left.x),
        y: surface.px_to_percent_y(top_left.y),
        width: surface.px_to_percent_x(new_w),
        height: surface.px_to_percent_y(new_h),
        rotation: theta,
    }
}

/// Rotate around the element center so its top faces `cursor`.
/// `snap` rounds to 15 degree steps.
pub fn apply_rotation(original: &Geometry, cursor: Point, snap: bool, surface: &Surface) -> Geometry {
    let center = surface.rect_px(original).center();
    let dx = cursor.x - center.x;
    let dy = cursor.y - center.y;
    // Offset so 0 degrees is up
    let mut angle = dy.atan2(dx).to_degrees() + 90.0;
    if snap {
        angle = (angle / ROTATION_SNAP_DEGREES).round() * ROTATION_SNAP_DEGREES;
    }
    Geometry {
        rotation: normalize_rotation(angle),
        ..*original
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::{Corner, Edge};
    use uuid::Uuid;

    fn surface() -> Surface {
        Surface::new(1000.0, 1000.0)
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_threshold() {
        let id = Uuid::new_v4();
        let mut controller = TransformController::new();
        controller.begin(
            GestureKind::Move,
            Point::new(100.0, 100.0),
            vec![(id, Geometry::new(10.0, 10.0, 20.0, 20.0))],
            3.0,
        );
        assert!(controller.is_pending());

        assert!(!controller.update(Point::new(102.0, 101.0), Modifiers::NONE, &surface()));
        assert!(controller.preview().is_empty());
        assert_eq!(controller.commit(), None);
        assert!(controller.is_idle());
    }

    #[test]
    fn test_move_is_idempotent() {
        let id = Uuid::new_v4();
        let original = Geometry::new(10.0, 10.0, 20.0, 20.0);
        let mut controller = TransformController::new();
        controller.begin(GestureKind::Move, Point::new(150.0, 150.0), vec![(id, original)], 3.0);

        let target = Point::new(250.0, 200.0);
        controller.update(target, Modifiers::NONE, &surface());
        let first = controller.preview().to_vec();
        controller.update(target, Modifiers::NONE, &surface());
        assert_eq!(controller.preview(), first.as_slice());

        let committed = controller.commit().unwrap();
        assert!(approx(committed[0].1.x, 20.0));
        assert!(approx(committed[0].1.y, 15.0));
        assert!(controller.is_idle());
    }

    #[test]
    fn test_cancel_discards_preview() {
        let id = Uuid::new_v4();
        let mut controller = TransformController::new();
        controller.begin(
            GestureKind::Move,
            Point::ZERO,
            vec![(id, Geometry::default())],
            0.0,
        );
        controller.update(Point::new(50.0, 50.0), Modifiers::NONE, &surface());
        assert!(controller.is_active());
        controller.cancel();
        assert!(controller.preview().is_empty());
        assert_eq!(controller.commit(), None);
    }

    #[test]
    fn test_resize_anchors_opposite_corner() {
        let original = Geometry::new(10.0, 10.0, 20.0, 20.0);
        let resized = apply_resize(
            &original,
            HandleKind::Corner(Corner::BottomRight),
            Vec2::new(100.0, 50.0),
            false,
            &surface(),
        );
        assert!(approx(resized.x, 10.0));
        assert!(approx(resized.y, 10.0));
        assert!(approx(resized.width, 30.0));
        assert!(approx(resized.height, 25.0));

        let from_top_left = apply_resize(
            &original,
            HandleKind::Corner(Corner::TopLeft),
            Vec2::new(50.0, 50.0),
            false,
            &surface(),
        );
        assert!(approx(from_top_left.x, 15.0));
        assert!(approx(from_top_left.width, 15.0));
        // Bottom-right stays at 30
        assert!(approx(from_top_left.x + from_top_left.width, 30.0));
    }

    #[test]
    fn test_resize_keeps_aspect_ratio_with_shift() {
        let original = Geometry::new(10.0, 10.0, 20.0, 10.0);
        let resized = apply_resize(
            &original,
            HandleKind::Corner(Corner::BottomRight),
            Vec2::new(200.0, 10.0),
            true,
            &surface(),
        );
        assert!(approx(resized.width / resized.height, 2.0));
        assert!(approx(resized.width, 40.0));
    }

    #[test]
    fn test_edge_resize_single_axis() {
        let original = Geometry::new(10.0, 10.0, 20.0, 20.0);
        let resized = apply_resize(
            &original,
            HandleKind::Edge(Edge::Right),
            Vec2::new(100.0, 300.0),
            false,
            &surface(),
        );
        assert!(approx(resized.width, 30.0));
        assert!(approx(resized.height, 20.0));
        assert!(approx(resized.y, 10.0));
    }

    #[test]
    fn test_resize_rotated_keeps_anchor() {
        let original = Geometry::new(40.0, 40.0, 20.0, 10.0).with_rotation(90.0);
        let s = surface();
        let before = s.rect_px(&original);
        let anchor_local = Vec2::new(-before.width() / 2.0, -before.height() / 2.0);
        let anchor = before.center() + rotate_vec(anchor_local, 90.0);

        // Dragging bottom-right along the rotated x axis (screen down) grows width
        let resized = apply_resize(
            &original,
            HandleKind::Corner(Corner::BottomRight),
            Vec2::new(0.0, 100.0),
            false,
            &s,
        );
        assert!(approx(resized.width, 30.0));
        assert!(approx(resized.height, 10.0));

        let after = s.rect_px(&resized);
        let new_anchor_local = Vec2::new(-after.width() / 2.0, -after.height() / 2.0);
        let new_anchor = after.center() + rotate_vec(new_anchor_local, 90.0);
        assert!(approx(anchor.x, new_anchor.x));
        assert!(approx(anchor.y, new_anchor.y));
    }

    #[test]
    fn test_resize_min_size() {
        let original = Geometry::new(10.0, 10.0, 20.0, 20.0);
        let resized = apply_resize(
            &original,
            HandleKind::Corner(Corner::BottomRight),
            Vec2::new(-900.0, -900.0),
            false,
            &surface(),
        );
        assert!(approx(resized.width, MIN_ELEMENT_SIZE));
        assert!(approx(resized.height, MIN_ELEMENT_SIZE));
    }

    #[test]
    fn test_rotation() {
        let original = Geometry::new(40.0, 40.0, 20.0, 20.0);
        // Center is (500, 500); pointer to the right means 90 degrees
        let rotated = apply_rotation(&original, Point::new(800.0, 500.0), false, &surface());
        assert!(approx(rotated.rotation, 90.0));

        // Pointer straight up is 0
        let upright = apply_rotation(&original, Point::new(500.0, 100.0), false, &surface());
        assert!(approx(upright.rotation, 0.0));

        // 20 degrees snaps to 15
        let angle = 20f64.to_radians();
        let cursor = Point::new(500.0 + 100.0 * angle.sin(), 500.0 - 100.0 * angle.cos());
        let snapped = apply_rotation(&original, cursor, true, &surface());
        assert!(approx(snapped.rotation, 15.0));
    }

    #[test]
    fn test_rotation_left_is_negative() {
        let original = Geometry::new(40.0, 40.0, 20.0, 20.0);
        let rotated = apply_rotation(&original, Point::new(200.0, 500.0), false, &surface());
        assert!(approx(rotated.rotation, -90.0));
    }
}
