//! Editing session for one page.
//!
//! [`Canvas`] owns the page, its history, the selection, the gesture and
//! inline-edit state machines and the viewport. Every mutation goes through
//! [`Canvas::mutate`], which records one history entry when the page content
//! actually changed.

use crate::config::EditorConfig;
use crate::edit::{EditCommit, EditTarget, InlineEditor, TextEditResult, TextKey};
use crate::elements::{
    Element, ElementId, ElementKind, ElementPatch, Geometry, ImageSource, TextElement,
};
use crate::export::{RasterRequest, RasterTarget};
use crate::history::{History, HistoryError};
use crate::input::{InputState, Modifiers, MouseButton, PointerEvent};
use crate::layout::{Cell, CellKind, DropPayload, GridLayout, Layout, RenderPlan, resolve};
use crate::page::{Background, PageDocument, PageSnapshot};
use crate::selection::{HandleKind, SelectionState, cell_at, handles_for, hit_test, hit_test_handles};
use crate::template::TemplateCatalog;
use crate::transform::{GestureKind, TransformController};
use crate::viewport::{Surface, Viewport};
use kurbo::{Point, Vec2};
use thiserror::Error;

/// Extra hit radius around elements, screen pixels.
const ELEMENT_HIT_TOLERANCE_PX: f64 = 4.0;

/// Zoom factor per scroll step with the command modifier held.
const SCROLL_ZOOM_STEP: f64 = 1.1;

/// Misuse of a session operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanvasError {
    #[error("Element not found: {0}")]
    ElementNotFound(ElementId),
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
    #[error("Cell {0} does not exist in the current layout")]
    CellOutOfRange(usize),
    #[error("Cell {0} does not accept this content")]
    DropRejected(usize),
    #[error("Element {0} is locked")]
    Locked(ElementId),
}

/// Confirmation token for destructive layout switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSwitch {
    Confirmed,
    Unconfirmed,
}

/// A single-page editing session.
pub struct Canvas {
    page: PageDocument,
    history: History,
    selection: SelectionState,
    transform: TransformController,
    editor: InlineEditor,
    /// Screen transform on top of the surface.
    pub viewport: Viewport,
    surface: Surface,
    config: EditorConfig,
    input: InputState,
    /// Bumped on every recorded mutation, undo and redo.
    version: u64,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(PageDocument::new())
    }
}

impl Canvas {
    /// Open a page with the default configuration.
    pub fn new(page: PageDocument) -> Self {
        Self::with_config(page, EditorConfig::default())
    }

    pub fn with_config(page: PageDocument, config: EditorConfig) -> Self {
        let config = config.sanitized();
        Self {
            page,
            history: History::new(config.history_depth),
            selection: SelectionState::new(),
            transform: TransformController::new(),
            editor: InlineEditor::new(),
            viewport: Viewport::new(),
            surface: Surface::default(),
            config,
            input: InputState::new(),
            version: 0,
        }
    }

    pub fn page(&self) -> &PageDocument {
        &self.page
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn transform(&self) -> &TransformController {
        &self.transform
    }

    pub fn editor(&self) -> &InlineEditor {
        &self.editor
    }

    pub fn surface(&self) -> Surface {
        self.surface
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Record the measured surface size in pixels.
    pub fn set_surface_size(&mut self, width: f64, height: f64) {
        self.surface = Surface::new(width, height);
    }

    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        self.viewport.zoom_at(screen_point, factor);
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.viewport.pan(delta);
    }

    /// Run `f` on the page and record one history entry if it changed anything.
    fn mutate<R>(&mut self, f: impl FnOnce(&mut PageDocument) -> R) -> R {
        let before = self.page.snapshot();
        let result = f(&mut self.page);
        if !self.page.matches(&before) {
            self.history.capture(before);
            self.version += 1;
            let page = &self.page;
            self.selection.prune(|id| page.contains(id));
        }
        result
    }

    fn require(&self, id: ElementId) -> Result<&Element, CanvasError> {
        self.page
            .get_element(id)
            .ok_or(CanvasError::ElementNotFound(id))
    }

    // --- Element operations ---

    /// Add an element. A zero z-index on a non-empty page is placed on top.
    pub fn add_element(&mut self, mut element: Element) -> ElementId {
        if element.z_index == 0 {
            if let Some(max) = self.page.max_z_index() {
                element.z_index = max.saturating_add(1);
            }
        }
        self.mutate(|page| page.add_element(element))
    }

    /// Patch one element.
    pub fn update_element(&mut self, id: ElementId, patch: &ElementPatch) -> Result<(), CanvasError> {
        self.require(id)?;
        self.mutate(|page| {
            if let Some(element) = page.get_element_mut(id) {
                element.apply_patch(patch);
            }
        });
        Ok(())
    }

    /// Delete one element. Locked elements must be unlocked first.
    pub fn delete_element(&mut self, id: ElementId) -> Result<Element, CanvasError> {
        if self.require(id)?.locked {
            return Err(CanvasError::Locked(id));
        }
        if self.editor.is_editing_element(id) {
            self.editor.cancel();
        }
        self.mutate(|page| page.remove_element(id))
            .ok_or(CanvasError::ElementNotFound(id))
    }

    /// Delete every unlocked selected element. Returns how many were removed.
    pub fn delete_selected(&mut self) -> usize {
        let ids: Vec<ElementId> = self
            .selection
            .selected()
            .iter()
            .copied()
            .filter(|id| self.page.get_element(*id).is_some_and(|e| !e.locked))
            .collect();
        if ids.is_empty() {
            return 0;
        }
        self.transform.cancel();
        self.mutate(|page| {
            ids.iter()
                .filter(|id| page.remove_element(**id).is_some())
                .count()
        })
    }

    /// Copy the selection, offset and on top. The copies become the selection.
    pub fn duplicate_selected(&mut self) -> Vec<ElementId> {
        let offset = self.config.duplicate_offset;
        let mut sources: Vec<Element> = self
            .selection
            .selected()
            .iter()
            .filter_map(|id| self.page.get_element(*id).cloned())
            .collect();
        if sources.is_empty() {
            return Vec::new();
        }
        // Keep relative stacking among the copies
        sources.sort_by_key(|e| e.z_index);

        let ids = self.mutate(|page| {
            let mut next_z = page.max_z_index().map_or(0, |z| z.saturating_add(1));
            sources
                .into_iter()
                .map(|mut copy| {
                    copy.regenerate_id();
                    copy.apply_patch(
                        &ElementPatch::new()
                            .position(copy.geometry.x + offset, copy.geometry.y + offset),
                    );
                    copy.z_index = next_z;
                    next_z = next_z.saturating_add(1);
                    page.add_element(copy)
                })
                .collect::<Vec<_>>()
        });
        self.selection.select_all(ids.iter().copied());
        ids
    }

    pub fn bring_to_front(&mut self, id: ElementId) -> Result<bool, CanvasError> {
        self.require(id)?;
        Ok(self.mutate(|page| page.bring_to_front(id)))
    }

    pub fn send_to_back(&mut self, id: ElementId) -> Result<bool, CanvasError> {
        self.require(id)?;
        Ok(self.mutate(|page| page.send_to_back(id)))
    }

    pub fn bring_forward(&mut self, id: ElementId) -> Result<bool, CanvasError> {
        self.require(id)?;
        Ok(self.mutate(|page| page.bring_forward(id)))
    }

    pub fn send_backward(&mut self, id: ElementId) -> Result<bool, CanvasError> {
        self.require(id)?;
        Ok(self.mutate(|page| page.send_backward(id)))
    }

    pub fn set_locked(&mut self, id: ElementId, locked: bool) -> Result<(), CanvasError> {
        self.update_element(id, &ElementPatch::new().locked(locked))?;
        if locked && self.transform.preview().iter().any(|(pid, _)| *pid == id) {
            self.transform.cancel();
        }
        Ok(())
    }

    pub fn set_background(&mut self, background: Background) {
        self.mutate(|page| page.background = background);
    }

    // --- Layouts and templates ---

    /// Replace the page content with a template. Grid pages become freeform.
    pub fn apply_template(
        &mut self,
        template_id: &str,
        catalog: &impl TemplateCatalog,
    ) -> Result<(), CanvasError> {
        let template = catalog
            .get(template_id)
            .ok_or_else(|| CanvasError::TemplateNotFound(template_id.to_string()))?;
        let elements = template.instantiate();
        let background = template.background.clone();

        self.transform.cancel();
        self.editor.cancel();
        self.mutate(|page| {
            page.layout = Layout::Freeform;
            page.elements = elements;
            page.background = background;
        });
        self.selection.clear();
        log::info!("Applied template {template_id} to page {}", self.page.id);
        Ok(())
    }

    /// Switch to a grid layout, deleting every element.
    ///
    /// Returns false when the switch was not confirmed.
    pub fn switch_grid_layout(&mut self, grid: GridLayout, confirmation: LayoutSwitch) -> bool {
        if confirmation == LayoutSwitch::Unconfirmed {
            log::debug!("Layout switch to {} not confirmed", grid.id);
            return false;
        }
        let grid_id = grid.id.clone();
        self.transform.cancel();
        self.editor.cancel();
        self.mutate(|page| {
            page.clear();
            page.layout = Layout::Grid(grid);
        });
        self.selection.clear();
        log::info!("Page {} switched to layout {grid_id}", self.page.id);
        true
    }

    /// Switch to freeform, keeping the elements where they are.
    pub fn set_freeform_layout(&mut self) {
        self.mutate(|page| page.layout = Layout::Freeform);
    }

    fn grid_cell(&self, index: usize) -> Result<&Cell, CanvasError> {
        self.page
            .layout
            .as_grid()
            .and_then(|grid| grid.cell(index))
            .ok_or(CanvasError::CellOutOfRange(index))
    }

    /// Element currently displayed in a cell.
    fn cell_occupant(&self, index: usize) -> Option<ElementId> {
        self.render_plan()
            .placement_for_cell(index)
            .and_then(|p| p.element_id())
    }

    /// Set the text of a text cell, creating its element on first entry.
    pub fn fill_text_cell(
        &mut self,
        index: usize,
        content: impl Into<String>,
    ) -> Result<ElementId, CanvasError> {
        let cell = self.grid_cell(index)?;
        if !cell.accepts(DropPayload::Text) {
            return Err(CanvasError::DropRejected(index));
        }
        let geometry = cell.geometry();
        let style = cell.default_style.text_style.clone();
        let content = content.into();

        if let Some(id) = self.cell_occupant(index) {
            self.update_element(id, &ElementPatch::text_content(content))?;
            return Ok(id);
        }

        let mut text = TextElement::new(content);
        if let Some(style) = style {
            text = text.with_style(style);
        }
        Ok(self.add_element(Element::new(geometry, ElementKind::Text(text))))
    }

    /// Drop an image onto a cell, replacing whatever the cell shows.
    pub fn drop_image(&mut self, index: usize, source: ImageSource) -> Result<ElementId, CanvasError> {
        let cell = self.grid_cell(index)?;
        if !cell.accepts(DropPayload::Image) {
            log::debug!("Cell {index} rejected an image drop");
            return Err(CanvasError::DropRejected(index));
        }
        let geometry = cell.geometry();

        let occupant = self.cell_occupant(index);
        if let Some(id) = occupant {
            if self.page.get_element(id).is_some_and(Element::is_image) {
                self.update_element(id, &ElementPatch::image_source(source))?;
                return Ok(id);
            }
        }

        // A mismatched occupant would keep claiming the cell
        let mut image = Element::image(geometry, source);
        image.z_index = self.page.max_z_index().map_or(0, |z| z.saturating_add(1));
        Ok(self.mutate(|page| {
            if let Some(old) = occupant {
                page.remove_element(old);
            }
            page.add_element(image)
        }))
    }

    // --- History ---

    pub fn undo(&mut self) -> Result<(), HistoryError> {
        let snapshot = self.history.undo(self.page.snapshot()).inspect_err(|err| {
            log::debug!("{err}");
        })?;
        self.restore(snapshot);
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), HistoryError> {
        let snapshot = self.history.redo(self.page.snapshot()).inspect_err(|err| {
            log::debug!("{err}");
        })?;
        self.restore(snapshot);
        Ok(())
    }

    fn restore(&mut self, snapshot: PageSnapshot) {
        self.transform.cancel();
        self.editor.cancel();
        self.page.restore(snapshot);
        let page = &self.page;
        self.selection.prune(|id| page.contains(id));
        self.version += 1;
    }

    // --- Selection ---

    pub fn select(&mut self, id: ElementId) -> Result<(), CanvasError> {
        self.require(id)?;
        self.selection.select(id);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    /// Select every displayed element.
    pub fn select_all(&mut self) {
        let ids = self.render_plan().element_ids();
        self.selection.select_all(ids);
    }

    pub fn selected_elements(&self) -> Vec<&Element> {
        self.selection
            .selected()
            .iter()
            .filter_map(|id| self.page.get_element(*id))
            .collect()
    }

    // --- Rendering ---

    /// Resolve the page for display, including any live gesture preview.
    pub fn render_plan(&self) -> RenderPlan {
        let mut plan = resolve(
            &self.page.layout,
            &self.page.elements,
            &self.config.resolve_options(),
        );
        plan.apply_preview(self.transform.preview());
        plan
    }

    /// Export the committed page at `scale` through `target`.
    ///
    /// The viewport is neutral for the export and restored afterwards.
    pub fn render_to_raster<T: RasterTarget>(
        &mut self,
        target: &mut T,
        scale: f64,
    ) -> Result<Vec<u8>, T::Error> {
        let saved = self.viewport;
        self.viewport.reset();
        self.transform.cancel();

        let plan = self.render_plan();
        let request = RasterRequest {
            page: &self.page,
            plan: &plan,
            surface: self.surface,
            viewport: self.viewport,
            scale,
        };
        let result = target.rasterize(&request);

        self.viewport = saved;
        if let Err(err) = &result {
            log::error!("Export of page {} failed: {err}", self.page.id);
        }
        result
    }

    // --- Pointer input (surface pixels) ---

    /// Route a pointer event in screen coordinates.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        self.input.handle_pointer_event(event);
        let modifiers = self.input.modifiers;
        match event {
            PointerEvent::Down { position, button } => {
                if button != MouseButton::Left {
                    return;
                }
                let point = self.viewport.screen_to_surface(position);
                if self.input.is_double_click() {
                    self.double_activate(point);
                } else {
                    self.pointer_down(point, modifiers);
                }
            }
            PointerEvent::Move { position } => {
                let point = self.viewport.screen_to_surface(position);
                self.pointer_move(point, modifiers);
            }
            PointerEvent::Up { position, button } => {
                if button == MouseButton::Left {
                    let point = self.viewport.screen_to_surface(position);
                    self.pointer_up(point, modifiers);
                }
            }
            PointerEvent::Scroll { position, delta } => {
                if modifiers.command() {
                    let factor = if delta.y < 0.0 {
                        SCROLL_ZOOM_STEP
                    } else {
                        1.0 / SCROLL_ZOOM_STEP
                    };
                    self.viewport.zoom_at(position, factor);
                } else {
                    self.viewport.pan(-delta);
                }
            }
        }
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.input.set_modifiers(modifiers);
    }

    fn handle_tolerance(&self) -> f64 {
        self.viewport
            .screen_to_surface_len(self.config.handle_hit_tolerance_px)
    }

    fn drag_threshold(&self) -> f64 {
        self.viewport.screen_to_surface_len(self.config.drag_threshold_px)
    }

    /// Handle of the single selected, transformable element under `point`.
    fn handle_at(&self, plan: &RenderPlan, point: Point) -> Option<(ElementId, HandleKind)> {
        let id = self.selection.single()?;
        let placement = plan.placement(id)?;
        if !placement.transformable {
            return None;
        }
        let rect = self.surface.rect_px(&placement.geometry);
        let handles = handles_for(rect, placement.geometry.rotation);
        hit_test_handles(&handles, point, self.handle_tolerance()).map(|kind| (id, kind))
    }

    /// Primary button pressed at a surface point.
    pub fn pointer_down(&mut self, point: Point, modifiers: Modifiers) {
        let plan = self.render_plan();
        let tolerance = self.viewport.screen_to_surface_len(ELEMENT_HIT_TOLERANCE_PX);
        let hit = hit_test(&plan, &self.surface, point, tolerance);

        if self.editor.is_editing() {
            let inside_edit = match (self.editor.target(), hit) {
                (Some(EditTarget::Element(editing)), Some(id)) => editing == id,
                (Some(EditTarget::Cell(cell)), None) => {
                    cell_at(&plan, &self.surface, point) == Some(cell)
                }
                _ => false,
            };
            if inside_edit {
                return;
            }
            self.blur_edit();
        }
        // Editing may have changed the page
        let plan = self.render_plan();

        if let Some((id, handle)) = self.handle_at(&plan, point) {
            let kind = match handle {
                HandleKind::Rotate => GestureKind::Rotate,
                other => GestureKind::Resize(other),
            };
            if let Some(placement) = plan.placement(id) {
                let threshold = self.drag_threshold();
                self.transform
                    .begin(kind, point, vec![(id, placement.geometry)], threshold);
            }
            return;
        }

        let Some(id) = hit else {
            self.selection.clear();
            self.transform.cancel();
            return;
        };

        if modifiers.extends_selection() {
            self.selection.toggle(id);
        } else if !self.selection.is_selected(id) {
            self.selection.select(id);
        }

        if !self.selection.is_selected(id) {
            self.transform.cancel();
            return;
        }
        let originals: Vec<(ElementId, Geometry)> = self
            .selection
            .selected()
            .iter()
            .filter_map(|sid| plan.placement(*sid))
            .filter(|p| p.transformable)
            .filter_map(|p| p.element_id().map(|eid| (eid, p.geometry)))
            .collect();
        let grabbed_movable = originals.iter().any(|(eid, _)| *eid == id);
        if grabbed_movable {
            let threshold = self.drag_threshold();
            self.transform.begin(GestureKind::Move, point, originals, threshold);
        } else {
            self.transform.cancel();
        }
    }

    /// Pointer moved to a surface point. Returns true while a gesture is active.
    pub fn pointer_move(&mut self, point: Point, modifiers: Modifiers) -> bool {
        if self.transform.is_idle() {
            let plan = self.render_plan();
            let tolerance = self.viewport.screen_to_surface_len(ELEMENT_HIT_TOLERANCE_PX);
            self.selection
                .set_hovered(hit_test(&plan, &self.surface, point, tolerance));
            return false;
        }
        self.transform.update(point, modifiers, &self.surface)
    }

    /// Primary button released. Returns true if a gesture was committed.
    pub fn pointer_up(&mut self, point: Point, modifiers: Modifiers) -> bool {
        if self.transform.is_idle() {
            return false;
        }
        self.transform.update(point, modifiers, &self.surface);
        let Some(geometries) = self.transform.commit() else {
            return false;
        };
        self.mutate(|page| {
            for (id, geometry) in &geometries {
                if let Some(element) = page.get_element_mut(*id) {
                    if !element.locked {
                        element.geometry = geometry.clamped();
                    }
                }
            }
        });
        true
    }

    /// Cancel the gesture in progress, discarding its preview.
    pub fn cancel_gesture(&mut self) {
        self.transform.cancel();
    }

    /// Double click at a surface point: enter inline editing.
    pub fn double_activate(&mut self, point: Point) -> bool {
        self.transform.cancel();
        if self.editor.is_editing() {
            self.blur_edit();
        }
        let plan = self.render_plan();
        let tolerance = self.viewport.screen_to_surface_len(ELEMENT_HIT_TOLERANCE_PX);

        if let Some(id) = hit_test(&plan, &self.surface, point, tolerance) {
            let Some(content) = self
                .page
                .get_element(id)
                .and_then(|e| e.editable_content())
            else {
                return false;
            };
            let content = content.to_string();
            self.selection.select(id);
            self.editor.begin(EditTarget::Element(id), &content);
            return true;
        }

        let Some(index) = cell_at(&plan, &self.surface, point) else {
            return false;
        };
        let is_empty_text_cell = self
            .page
            .layout
            .as_grid()
            .and_then(|grid| grid.cell(index))
            .is_some_and(|cell| cell.kind == CellKind::Text)
            && plan
                .placement_for_cell(index)
                .is_some_and(|p| p.is_placeholder());
        if is_empty_text_cell {
            self.selection.clear();
            self.editor.begin(EditTarget::Cell(index), "");
        }
        is_empty_text_cell
    }

    // --- Inline editing ---

    /// Typed text while editing.
    pub fn text_input(&mut self, text: &str) -> bool {
        self.editor.insert_text(text)
    }

    /// Leave inline editing, committing changed content.
    pub fn blur_edit(&mut self) -> bool {
        match self.editor.finish() {
            Some(commit) => self.apply_edit(commit),
            None => false,
        }
    }

    fn apply_edit(&mut self, commit: EditCommit) -> bool {
        match commit.target {
            EditTarget::Element(id) => {
                let patch = match self.page.get_element(id).map(|e| &e.kind) {
                    Some(ElementKind::Text(_)) => ElementPatch::text_content(commit.content),
                    Some(ElementKind::Sticker(_)) => ElementPatch::sticker_glyph(commit.content),
                    _ => {
                        log::debug!("Edited element {id} is gone; dropping edit");
                        return false;
                    }
                };
                self.update_element(id, &patch).is_ok()
            }
            EditTarget::Cell(index) => match self.fill_text_cell(index, commit.content) {
                Ok(id) => {
                    self.selection.select(id);
                    true
                }
                Err(err) => {
                    log::debug!("Dropping cell edit: {err}");
                    false
                }
            },
        }
    }

    // --- Keyboard ---

    /// Handle a key press by name. Returns true if the key was consumed.
    pub fn key_down(&mut self, key: &str, modifiers: Modifiers) -> bool {
        self.input.set_modifiers(modifiers);

        if self.editor.is_editing() {
            let Some(text_key) = TextKey::from_name(key) else {
                return false;
            };
            return match self.editor.handle_key(text_key, modifiers) {
                TextEditResult::Handled => true,
                TextEditResult::ExitEdit => {
                    self.blur_edit();
                    true
                }
                TextEditResult::NotHandled => false,
            };
        }

        let step = if modifiers.shift {
            self.config.nudge_step_large
        } else {
            self.config.nudge_step
        };

        match key {
            "Delete" | "Backspace" => self.delete_selected() > 0,
            "Escape" => {
                if self.transform.is_idle() {
                    self.selection.clear();
                } else {
                    self.transform.cancel();
                }
                true
            }
            "ArrowLeft" => self.nudge_selected(Vec2::new(-step, 0.0)),
            "ArrowRight" => self.nudge_selected(Vec2::new(step, 0.0)),
            "ArrowUp" => self.nudge_selected(Vec2::new(0.0, -step)),
            "ArrowDown" => self.nudge_selected(Vec2::new(0.0, step)),
            _ if modifiers.command() => self.shortcut(key, modifiers),
            _ => false,
        }
    }

    fn shortcut(&mut self, key: &str, modifiers: Modifiers) -> bool {
        match key.to_ascii_lowercase().as_str() {
            "z" if modifiers.shift => self.redo().is_ok(),
            "z" => self.undo().is_ok(),
            "y" => self.redo().is_ok(),
            "d" => !self.duplicate_selected().is_empty(),
            "a" => {
                self.select_all();
                true
            }
            _ => false,
        }
    }

    /// Move movable selected elements by `delta` percentage points.
    pub fn nudge_selected(&mut self, delta: Vec2) -> bool {
        if !self.transform.is_idle() {
            return false;
        }
        let plan = self.render_plan();
        let ids: Vec<ElementId> = self
            .selection
            .selected()
            .iter()
            .copied()
            .filter(|id| plan.placement(*id).is_some_and(|p| p.transformable))
            .collect();
        if ids.is_empty() {
            return false;
        }
        let before = self.version;
        self.mutate(|page| {
            for id in &ids {
                if let Some(element) = page.get_element_mut(*id) {
                    let g = element.geometry;
                    element.apply_patch(&ElementPatch::new().position(g.x + delta.x, g.y + delta.y));
                }
            }
        });
        self.version != before
    }
}
