//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::page::PageDocument;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    pages: RwLock<HashMap<String, PageDocument>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {e}"))
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, page: &PageDocument) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let page = page.clone();
        Box::pin(async move {
            let mut pages = self.pages.write().map_err(lock_error)?;
            pages.insert(id, page);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<PageDocument>> {
        let id = id.to_string();
        Box::pin(async move {
            let pages = self.pages.read().map_err(lock_error)?;
            pages.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut pages = self.pages.write().map_err(lock_error)?;
            pages.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let pages = self.pages.read().map_err(lock_error)?;
            Ok(pages.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let pages = self.pages.read().map_err(lock_error)?;
            Ok(pages.contains_key(&id))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pollster::block_on;

    #[test]
    fn test_save_and_load() {
        let storage = MemoryStorage::new();
        let page = PageDocument::new();

        block_on(storage.save("test", &page)).unwrap();
        let loaded = block_on(storage.load("test")).unwrap();

        assert_eq!(page, loaded);
    }

    #[test]
    fn test_not_found() {
        let storage = MemoryStorage::new();
        let result = block_on(storage.load("nonexistent"));

        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[test]
    fn test_exists_and_delete() {
        let storage = MemoryStorage::new();
        let page = PageDocument::new();

        assert!(!block_on(storage.exists("test")).unwrap());
        block_on(storage.save("test", &page)).unwrap();
        assert!(block_on(storage.exists("test")).unwrap());

        block_on(storage.delete("test")).unwrap();
        assert!(!block_on(storage.exists("test")).unwrap());
    }

    #[test]
    fn test_list() {
        let storage = MemoryStorage::new();
        let page = PageDocument::new();

        block_on(storage.save("page1", &page)).unwrap();
        block_on(storage.save("page2", &page)).unwrap();

        let list = block_on(storage.list()).unwrap();
        assert_eq!(list.len(), 2);
        assert!(list.contains(&"page1".to_string()));
        assert!(list.contains(&"page2".to_string()));
    }
}
