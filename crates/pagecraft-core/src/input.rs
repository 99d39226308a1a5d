//! Input state tracking for pointer and keyboard events.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// Use web_time for WASM compatibility
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Mouse button identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }

    /// Whether the selection should be extended instead of replaced.
    pub fn extends_selection(&self) -> bool {
        self.shift || self.command()
    }
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
    },
    Up {
        position: Point,
        button: MouseButton,
    },
    Move {
        position: Point,
    },
    Scroll {
        position: Point,
        delta: Vec2,
    },
}

/// Double-click detection constants.
const DOUBLE_CLICK_TIME_MS: u128 = 500;
const DOUBLE_CLICK_DISTANCE: f64 = 5.0;

/// Tracks the current input state between events.
#[derive(Debug, Clone)]
pub struct InputState {
    /// Current pointer position in screen coordinates.
    pub pointer_position: Point,
    pressed_buttons: HashSet<MouseButton>,
    pub modifiers: Modifiers,
    /// Start position of the current primary-button press.
    pub drag_start: Option<Point>,
    last_click_time: Option<Instant>,
    last_click_position: Option<Point>,
    /// Whether the latest press completed a double-click.
    double_click_detected: bool,
}

impl Default for InputState {
    fn default() -> Self {
        Self {
            pointer_position: Point::ZERO,
            pressed_buttons: HashSet::new(),
            modifiers: Modifiers::default(),
            drag_start: None,
            last_click_time: None,
            last_click_position: None,
            double_click_detected: false,
        }
    }
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        match event {
            PointerEvent::Down { position, button } => {
                self.pointer_position = position;
                self.pressed_buttons.insert(button);
                self.double_click_detected = false;

                if button == MouseButton::Left {
                    self.register_click(position, Instant::now());
                    self.drag_start = Some(position);
                }
            }
            PointerEvent::Up { position, button } => {
                self.pointer_position = position;
                self.pressed_buttons.remove(&button);
                if button == MouseButton::Left {
                    self.drag_start = None;
                }
            }
            PointerEvent::Move { position } | PointerEvent::Scroll { position, .. } => {
                self.pointer_position = position;
            }
        }
    }

    fn register_click(&mut self, position: Point, now: Instant) {
        if let (Some(last_time), Some(last_pos)) = (self.last_click_time, self.last_click_position)
        {
            let elapsed = now.duration_since(last_time).as_millis();
            if elapsed < DOUBLE_CLICK_TIME_MS && position.distance(last_pos) < DOUBLE_CLICK_DISTANCE
            {
                self.double_click_detected = true;
                // Reset to prevent triple-click being detected as another double-click
                self.last_click_time = None;
                self.last_click_position = None;
                return;
            }
        }
        self.last_click_time = Some(now);
        self.last_click_position = Some(position);
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    /// Whether the latest press completed a double-click.
    pub fn is_double_click(&self) -> bool {
        self.double_click_detected
    }

    /// Drag delta from the press position, if the primary button is down.
    pub fn drag_delta(&self) -> Option<Vec2> {
        self.drag_start.map(|start| self.pointer_position - start)
    }
}
