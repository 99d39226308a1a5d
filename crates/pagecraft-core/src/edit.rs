//! Inline text editing.

use crate::elements::ElementId;
use crate::input::Modifiers;

/// Keyboard key for text editing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextKey {
    Character(String),
    Backspace,
    Delete,
    Enter,
    Left,
    Right,
    Home,
    End,
    Escape,
}

impl TextKey {
    /// Map a key name (as produced by the host toolkit) to a text key.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name {
            "Backspace" => TextKey::Backspace,
            "Delete" => TextKey::Delete,
            "Enter" | "Return" => TextKey::Enter,
            "ArrowLeft" | "Left" => TextKey::Left,
            "ArrowRight" | "Right" => TextKey::Right,
            "Home" => TextKey::Home,
            "End" => TextKey::End,
            "Escape" => TextKey::Escape,
            other if other.chars().count() == 1 => TextKey::Character(other.to_string()),
            _ => return None,
        };
        Some(key)
    }
}

/// Result of handling a text editing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEditResult {
    /// Event was handled, text may have changed.
    Handled,
    /// User wants to leave editing (confirm or Escape).
    ExitEdit,
    /// Event was not handled (pass to other handlers).
    NotHandled,
}

/// Editable string with a cursor kept on a char boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextBuffer {
    text: String,
    /// Byte offset of the cursor.
    cursor: usize,
}

impl TextBuffer {
    /// Create a buffer with the cursor at the end.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            cursor: text.len(),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn insert(&mut self, s: &str) {
        self.text.insert_str(self.cursor, s);
        self.cursor += s.len();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.text.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.text.replace_range(self.cursor..next, "");
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = self.prev_boundary() {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = self.next_boundary() {
            self.cursor = next;
        }
    }

    /// Move to the start of the current line.
    pub fn move_home(&mut self) {
        self.cursor = self.text[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
    }

    /// Move to the end of the current line.
    pub fn move_end(&mut self) {
        self.cursor = self.text[self.cursor..]
            .find('\n')
            .map_or(self.text.len(), |i| self.cursor + i);
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.text[..self.cursor].char_indices().next_back().map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.text[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }
}

/// What is being edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// An existing text or sticker element.
    Element(ElementId),
    /// An empty text cell of a grid layout.
    Cell(usize),
}

/// Content to write back when editing ends with a change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditCommit {
    pub target: EditTarget,
    pub content: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
enum EditState {
    #[default]
    Display,
    Editing {
        target: EditTarget,
        original: String,
        buffer: TextBuffer,
    },
}

/// Display/editing state machine for in-place text editing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineEditor {
    state: EditState,
}

impl InlineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter editing. Any edit in progress is dropped; finish it first.
    pub fn begin(&mut self, target: EditTarget, original: &str) {
        log::debug!("Editing {target:?}");
        self.state = EditState::Editing {
            target,
            original: original.to_string(),
            buffer: TextBuffer::new(original),
        };
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditState::Editing { .. })
    }

    pub fn target(&self) -> Option<EditTarget> {
        match &self.state {
            EditState::Editing { target, .. } => Some(*target),
            EditState::Display => None,
        }
    }

    pub fn is_editing_element(&self, id: ElementId) -> bool {
        self.target() == Some(EditTarget::Element(id))
    }

    pub fn buffer(&self) -> Option<&TextBuffer> {
        match &self.state {
            EditState::Editing { buffer, .. } => Some(buffer),
            EditState::Display => None,
        }
    }

    /// Insert typed text at the cursor.
    pub fn insert_text(&mut self, text: &str) -> bool {
        match &mut self.state {
            EditState::Editing { buffer, .. } => {
                buffer.insert(text);
                true
            }
            EditState::Display => false,
        }
    }

    /// Handle an editing key. Escape and Ctrl+Enter ask to leave editing.
    pub fn handle_key(&mut self, key: TextKey, modifiers: Modifiers) -> TextEditResult {
        let EditState::Editing { buffer, .. } = &mut self.state else {
            return TextEditResult::NotHandled;
        };
        match key {
            TextKey::Escape => return TextEditResult::ExitEdit,
            TextKey::Enter if modifiers.command() => return TextEditResult::ExitEdit,
            TextKey::Enter => buffer.insert("\n"),
            TextKey::Backspace => buffer.backspace(),
            TextKey::Delete => buffer.delete(),
            TextKey::Left => buffer.move_left(),
            TextKey::Right => buffer.move_right(),
            TextKey::Home => buffer.move_home(),
            TextKey::End => buffer.move_end(),
            TextKey::Character(c) => {
                if modifiers.command() {
                    return TextEditResult::NotHandled;
                }
                buffer.insert(&c);
            }
        }
        TextEditResult::Handled
    }

    /// Leave editing. Returns the trimmed content if it differs from the original.
    pub fn finish(&mut self) -> Option<EditCommit> {
        let EditState::Editing {
            target,
            original,
            buffer,
        } = std::mem::take(&mut self.state)
        else {
            return None;
        };
        let content = buffer.text().trim_end();
        if content == original.trim_end() {
            log::debug!("Edit of {target:?} left content unchanged");
            return None;
        }
        Some(EditCommit {
            target,
            content: content.to_string(),
        })
    }

    /// Leave editing without committing.
    pub fn cancel(&mut self) {
        self.state = EditState::Display;
    }
}
