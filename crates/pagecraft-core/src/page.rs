//! Page document: elements, background and layout of one page.

use crate::elements::{Element, ElementId, SerializableColor};
use crate::layout::Layout;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One color stop of a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Position along the gradient, 0-1.
    pub offset: f64,
    pub color: SerializableColor,
}

/// Page background fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Background {
    Solid { color: SerializableColor },
    LinearGradient {
        /// Direction in degrees, 0 = left to right, 90 = top to bottom.
        angle: f64,
        stops: Vec<GradientStop>,
    },
}

impl Default for Background {
    fn default() -> Self {
        Background::Solid {
            color: SerializableColor::white(),
        }
    }
}

impl Background {
    pub fn solid(color: SerializableColor) -> Self {
        Background::Solid { color }
    }

    /// Two-stop linear gradient.
    pub fn linear(angle: f64, from: SerializableColor, to: SerializableColor) -> Self {
        Background::LinearGradient {
            angle,
            stops: vec![
                GradientStop {
                    offset: 0.0,
                    color: from,
                },
                GradientStop {
                    offset: 1.0,
                    color: to,
                },
            ],
        }
    }
}

/// The undo-able content of a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageSnapshot {
    pub elements: Vec<Element>,
    pub background: Background,
    pub layout: Layout,
}

/// A page containing elements laid out on a canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageDocument {
    /// Unique page identifier.
    pub id: String,
    /// Page name.
    pub name: String,
    /// Elements in insertion order (not paint order).
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub background: Background,
    #[serde(default)]
    pub layout: Layout,
}

impl Default for PageDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl PageDocument {
    /// Create a new empty freeform page.
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4().to_string())
    }

    /// Create a new empty freeform page with the given id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: "Untitled".to_string(),
            elements: Vec::new(),
            background: Background::default(),
            layout: Layout::Freeform,
        }
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    /// Copy the undo-able content of the page.
    pub fn snapshot(&self) -> PageSnapshot {
        PageSnapshot {
            elements: self.elements.clone(),
            background: self.background.clone(),
            layout: self.layout.clone(),
        }
    }

    /// Replace the content of the page with a snapshot.
    pub fn restore(&mut self, snapshot: PageSnapshot) {
        self.elements = snapshot.elements;
        self.background = snapshot.background;
        self.layout = snapshot.layout;
    }

    /// Whether the page content equals a snapshot.
    pub fn matches(&self, snapshot: &PageSnapshot) -> bool {
        self.elements == snapshot.elements
            && self.background == snapshot.background
            && self.layout == snapshot.layout
    }

    /// Add an element, regenerating its id if it clashes with an existing one.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        while self.contains(element.id) {
            log::debug!("Element id {} already present, regenerating", element.id);
            element.regenerate_id();
        }
        let id = element.id;
        self.elements.push(element);
        id
    }

    /// Remove an element from the page.
    pub fn remove_element(&mut self, id: ElementId) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id == id)?;
        Some(self.elements.remove(index))
    }

    /// Remove all elements.
    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.elements.iter().any(|e| e.id == id)
    }

    pub fn get_element(&self, id: ElementId) -> Option<&Element> {
        self.elements.iter().find(|e| e.id == id)
    }

    pub fn get_element_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.elements.iter_mut().find(|e| e.id == id)
    }

    /// Elements in paint order (ascending z-index, ties by insertion order).
    pub fn elements_painted(&self) -> Vec<&Element> {
        let mut ordered: Vec<&Element> = self.elements.iter().collect();
        ordered.sort_by_key(|e| e.z_index);
        ordered
    }

    pub fn max_z_index(&self) -> Option<i32> {
        self.elements.iter().map(|e| e.z_index).max()
    }

    pub fn min_z_index(&self) -> Option<i32> {
        self.elements.iter().map(|e| e.z_index).min()
    }

    /// Bring an element to the front (topmost).
    /// Returns true if the element moved.
    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        let Some(max) = self.elements.iter().filter(|e| e.id != id).map(|e| e.z_index).max()
        else {
            return false;
        };
        match self.get_element_mut(id) {
            Some(element) if element.z_index <= max => {
                element.z_index = max.saturating_add(1);
                true
            }
            _ => false,
        }
    }

    /// Send an element to the back (bottommost).
    /// Returns true if the element moved.
    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        let Some(min) = self.elements.iter().filter(|e| e.id != id).map(|e| e.z_index).min()
        else {
            return false;
        };
        match self.get_element_mut(id) {
            Some(element) if element.z_index >= min => {
                element.z_index = min.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    /// Move an element one layer forward.
    /// Returns true if the element moved, false if already at front.
    pub fn bring_forward(&mut self, id: ElementId) -> bool {
        let mut order = self.painted_ids();
        match order.iter().position(|&eid| eid == id) {
            Some(pos) if pos + 1 < order.len() => {
                order.swap(pos, pos + 1);
                self.renumber(&order);
                true
            }
            _ => false,
        }
    }

    /// Move an element one layer backward.
    /// Returns true if the element moved, false if already at back.
    pub fn send_backward(&mut self, id: ElementId) -> bool {
        let mut order = self.painted_ids();
        match order.iter().position(|&eid| eid == id) {
            Some(pos) if pos > 0 => {
                order.swap(pos, pos - 1);
                self.renumber(&order);
                true
            }
            _ => false,
        }
    }

    fn painted_ids(&self) -> Vec<ElementId> {
        self.elements_painted().iter().map(|e| e.id).collect()
    }

    /// Assign sequential z-indices following `order`.
    fn renumber(&mut self, order: &[ElementId]) {
        for (z, id) in order.iter().enumerate() {
            if let Some(element) = self.get_element_mut(*id) {
                element.z_index = z as i32;
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Serialize the page to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a page from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
