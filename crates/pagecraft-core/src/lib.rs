//! PageCraft Core Library
//!
//! Platform-agnostic data structures and editing logic for the PageCraft
//! design canvas.

pub mod asset;
pub mod canvas;
pub mod config;
pub mod edit;
pub mod elements;
pub mod export;
pub mod history;
pub mod input;
pub mod layout;
pub mod page;
pub mod selection;
pub mod storage;
pub mod template;
pub mod transform;
pub mod viewport;

pub use asset::{AssetResolver, PrefixAssetResolver};
pub use canvas::{Canvas, CanvasError, LayoutSwitch};
pub use config::{ConfigError, EditorConfig};
pub use edit::{EditTarget, InlineEditor, TextBuffer, TextEditResult, TextKey};
pub use elements::{Element, ElementId, ElementKind, ElementPatch, Geometry, normalize_rotation};
pub use export::{RasterRequest, RasterTarget};
pub use history::{DEFAULT_HISTORY_DEPTH, History, HistoryError};
pub use input::{InputState, Modifiers, MouseButton, PointerEvent};
pub use layout::{
    Cell, CellKind, GridLayout, Layout, LayoutCatalog, LayoutError, MATCH_TOLERANCE, Placement,
    RenderPlan, resolve,
};
pub use page::{Background, PageDocument, PageSnapshot};
pub use selection::SelectionState;
pub use storage::{
    MemoryStorage, PersistenceAdapter, SaveCoordinator, Storage, StorageError, StorageResult,
};
pub use template::{StaticTemplateCatalog, Template, TemplateCatalog};
pub use transform::{GestureKind, TransformController};
pub use viewport::{Surface, Viewport};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileStorage;
