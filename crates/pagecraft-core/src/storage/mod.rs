//! Storage abstraction for page persistence.

mod coordinator;
mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use coordinator::{
    DEFAULT_AUTOSAVE_INTERVAL_SECS, PendingSave, SaveCoordinator, SaveNotice, SaveOutcome,
    SaveStatus,
};
pub use memory::MemoryStorage;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

use crate::elements::Element;
use crate::page::PageDocument;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("Page not found: {0}")]
    NotFound(String),
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for page storage backends. Saves always replace the whole page.
///
/// On native platforms implementations must be Send + Sync.
/// On WASM these bounds are relaxed since it's single-threaded.
#[cfg(not(target_arch = "wasm32"))]
pub trait Storage: Send + Sync {
    fn save(&self, id: &str, page: &PageDocument) -> BoxFuture<'_, StorageResult<()>>;

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<PageDocument>>;

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all page IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// Trait for page storage backends (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Storage {
    fn save(&self, id: &str, page: &PageDocument) -> BoxFuture<'_, StorageResult<()>>;

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<PageDocument>>;

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all page IDs.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>>;
}

/// The element-level load/save pair the editor consumes.
pub struct PersistenceAdapter<S: Storage> {
    storage: Arc<S>,
}

impl<S: Storage> Clone for PersistenceAdapter<S> {
    fn clone(&self) -> Self {
        Self {
            storage: Arc::clone(&self.storage),
        }
    }
}

impl<S: Storage> PersistenceAdapter<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }

    /// Elements of a page, in stored order.
    pub async fn load(&self, page_id: &str) -> StorageResult<Vec<Element>> {
        Ok(self.storage.load(page_id).await?.elements)
    }

    /// Replace the elements of a page, creating the page if it does not exist.
    pub async fn save(&self, page_id: &str, elements: &[Element]) -> StorageResult<()> {
        let mut page = match self.storage.load(page_id).await {
            Ok(page) => page,
            Err(StorageError::NotFound(_)) => PageDocument::with_id(page_id),
            Err(err) => return Err(err),
        };
        page.elements = elements.to_vec();
        self.storage.save(page_id, &page).await
    }

    /// Load the whole page.
    pub async fn load_page(&self, page_id: &str) -> StorageResult<PageDocument> {
        self.storage.load(page_id).await
    }

    /// Save the whole page under its own id.
    pub async fn save_page(&self, page: &PageDocument) -> StorageResult<()> {
        self.storage.save(&page.id, page).await
    }
}

/// Create file storage in the platform data directory.
#[cfg(not(target_arch = "wasm32"))]
pub fn create_default_storage() -> StorageResult<Arc<FileStorage>> {
    Ok(Arc::new(FileStorage::default_location()?))
}
