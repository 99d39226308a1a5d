//! Save coordination: dirty tracking, in-flight saves and failure notices.
//!
//! A save is requested with a clone of the page and runs as an independent
//! future, so editing continues while it is in flight. Completions are fed
//! back through [`SaveCoordinator::complete`], which applies them
//! last-write-wins by revision.
//!
//! Saves share a high-water mark of the newest revision written. A save that
//! starts after a newer one landed skips its write; one whose write raced a
//! newer write is reported as overlapped, and the page is marked dirty again
//! so the next save rewrites the current content.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::page::PageDocument;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[cfg(not(target_arch = "wasm32"))]
use std::time::{Duration, Instant};

#[cfg(target_arch = "wasm32")]
use web_time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 30;

/// A save in flight. Owns everything it needs; borrows nothing from the session.
pub type PendingSave = BoxFuture<'static, SaveOutcome>;

/// Result of one save request.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// Request order, starting at 1.
    pub revision: u64,
    /// Edit generation the saved content corresponds to.
    pub generation: u64,
    pub result: StorageResult<()>,
    /// A newer revision was written while this one was writing, so storage
    /// may hold this older content.
    pub overlapped: bool,
}

/// How a completion was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    Saved,
    /// The save failed; a notice is set and the page stays dirty.
    Failed,
    /// A newer save already completed, or this one may have overwritten it.
    Superseded,
    /// The session was closed.
    Ignored,
}

/// User-facing, dismissable save failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveNotice {
    pub revision: u64,
    pub message: String,
}

/// Tracks unsaved changes and the saves issued for one page.
pub struct SaveCoordinator<S: Storage + 'static> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
    /// Bumped on every change.
    generation: u64,
    next_revision: u64,
    /// Newest revision written to storage, shared with pending saves.
    written: Arc<AtomicU64>,
    /// Newest revision whose completion was applied.
    last_completed: Option<u64>,
    in_flight: usize,
    notice: Option<SaveNotice>,
    closed: bool,
}

impl<S: Storage + 'static> SaveCoordinator<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
            generation: 0,
            next_revision: 1,
            written: Arc::new(AtomicU64::new(0)),
            last_completed: None,
            in_flight: 0,
            notice: None,
            closed: false,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Record an unsaved change.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.generation += 1;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether an interval-driven save should be issued now.
    pub fn autosave_due(&self) -> bool {
        if !self.dirty || self.closed {
            return false;
        }
        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Start saving a copy of `page`. The returned future owns its data;
    /// pass its output to [`complete`](Self::complete).
    pub fn request_save(&mut self, page: &PageDocument) -> PendingSave {
        let revision = self.next_revision;
        self.next_revision += 1;
        self.in_flight += 1;
        let generation = self.generation;
        let storage = Arc::clone(&self.storage);
        let written = Arc::clone(&self.written);
        let page = page.clone();
        log::debug!("Save revision {revision} requested for page {}", page.id);

        Box::pin(async move {
            if written.load(Ordering::Acquire) > revision {
                log::debug!("Save revision {revision} skipped, newer content already written");
                return SaveOutcome {
                    revision,
                    generation,
                    result: Ok(()),
                    overlapped: false,
                };
            }
            let result = storage.save(&page.id, &page).await;
            let overlapped =
                result.is_ok() && written.fetch_max(revision, Ordering::AcqRel) > revision;
            SaveOutcome {
                revision,
                generation,
                result,
                overlapped,
            }
        })
    }

    /// Apply a finished save.
    pub fn complete(&mut self, outcome: SaveOutcome) -> SaveStatus {
        self.in_flight = self.in_flight.saturating_sub(1);
        if self.closed {
            log::debug!("Ignoring save revision {} after close", outcome.revision);
            return SaveStatus::Ignored;
        }
        if outcome.overlapped {
            log::warn!(
                "Save revision {} raced a newer save; page marked for resave",
                outcome.revision
            );
            self.mark_dirty();
            self.last_save = None;
            return SaveStatus::Superseded;
        }
        if self
            .last_completed
            .is_some_and(|last| outcome.revision < last)
        {
            log::debug!("Save revision {} superseded", outcome.revision);
            return SaveStatus::Superseded;
        }
        self.last_completed = Some(outcome.revision);

        match outcome.result {
            Ok(()) => {
                self.last_save = Some(Instant::now());
                self.notice = None;
                if outcome.generation == self.generation {
                    self.dirty = false;
                }
                log::info!("Saved revision {}", outcome.revision);
                SaveStatus::Saved
            }
            Err(err) => {
                log::warn!("Save revision {} failed: {err}", outcome.revision);
                self.notice = Some(SaveNotice {
                    revision: outcome.revision,
                    message: notice_message(&err),
                });
                SaveStatus::Failed
            }
        }
    }

    /// Run a save to completion and apply it.
    pub async fn save_now(&mut self, page: &PageDocument) -> SaveStatus {
        let outcome = self.request_save(page).await;
        self.complete(outcome)
    }

    pub fn notice(&self) -> Option<&SaveNotice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Stop applying completions; saves still in flight are ignored.
    pub fn close(&mut self) {
        if !self.closed {
            log::info!("Save coordinator closed with {} save(s) in flight", self.in_flight);
        }
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

fn notice_message(err: &StorageError) -> String {
    match err {
        StorageError::NotFound(_) => "The page could not be found.".to_string(),
        StorageError::Serialization(_) => "The page could not be encoded.".to_string(),
        StorageError::Io(_) | StorageError::Other(_) => {
            "Your changes could not be saved. Try again.".to_string()
        }
    }
}

#[cfg(all(test, not(target_arch = "wasm32")))]
mod tests {
    use super::*;
    use crate::storage::{BoxFuture, MemoryStorage};
    use pollster::block_on;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll, Waker};

    /// Resolves on its second poll.
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                return Poll::Ready(());
            }
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }

    /// Memory storage whose writes suspend once before landing.
    #[derive(Default)]
    struct SlowStorage {
        inner: MemoryStorage,
    }

    impl Storage for SlowStorage {
        fn save(&self, id: &str, page: &PageDocument) -> BoxFuture<'_, StorageResult<()>> {
            let id = id.to_string();
            let page = page.clone();
            Box::pin(async move {
                YieldOnce(false).await;
                self.inner.save(&id, &page).await
            })
        }

        fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<PageDocument>> {
            self.inner.load(id)
        }

        fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
            self.inner.delete(id)
        }

        fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
            self.inner.list()
        }

        fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
            self.inner.exists(id)
        }
    }

    fn named(name: &str) -> PageDocument {
        let mut page = PageDocument::with_id("p");
        page.name = name.to_string();
        page
    }

    /// Storage whose saves always fail.
    struct FailingStorage;

    impl Storage for FailingStorage {
        fn save(&self, _id: &str, _page: &PageDocument) -> BoxFuture<'_, StorageResult<()>> {
            Box::pin(async { Err(StorageError::Io("disk full".to_string())) })
        }

        fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<PageDocument>> {
            let id = id.to_string();
            Box::pin(async move { Err(StorageError::NotFound(id)) })
        }

        fn delete(&self, _id: &str) -> BoxFuture<'_, StorageResult<()>> {
            Box::pin(async { Ok(()) })
        }

        fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
            Box::pin(async { Ok(Vec::new()) })
        }

        fn exists(&self, _id: &str) -> BoxFuture<'_, StorageResult<bool>> {
            Box::pin(async { Ok(false) })
        }
    }

    #[test]
    fn test_save_clears_dirty() {
        let storage = Arc::new(MemoryStorage::new());
        let mut coordinator = SaveCoordinator::new(Arc::clone(&storage));
        let page = PageDocument::with_id("p");

        assert!(!coordinator.autosave_due());
        coordinator.mark_dirty();
        assert!(coordinator.autosave_due());

        assert_eq!(block_on(coordinator.save_now(&page)), SaveStatus::Saved);
        assert!(!coordinator.is_dirty());
        assert!(block_on(storage.exists("p")).unwrap());
    }

    #[test]
    fn test_edit_during_save_stays_dirty() {
        let mut coordinator = SaveCoordinator::new(Arc::new(MemoryStorage::new()));
        let page = PageDocument::with_id("p");
        coordinator.mark_dirty();

        let pending = coordinator.request_save(&page);
        coordinator.mark_dirty();
        let outcome = block_on(pending);
        assert_eq!(coordinator.complete(outcome), SaveStatus::Saved);
        assert!(coordinator.is_dirty());
    }

    #[test]
    fn test_last_write_wins() {
        let storage = Arc::new(MemoryStorage::new());
        let mut coordinator = SaveCoordinator::new(Arc::clone(&storage));
        coordinator.mark_dirty();

        let older = coordinator.request_save(&named("first"));
        let newer = coordinator.request_save(&named("second"));
        assert_eq!(coordinator.in_flight(), 2);

        // Newer completes first; the late older one neither writes nor wins
        let newer_outcome = block_on(newer);
        let older_outcome = block_on(older);
        assert_eq!(coordinator.complete(newer_outcome), SaveStatus::Saved);
        assert_eq!(coordinator.complete(older_outcome), SaveStatus::Superseded);
        assert_eq!(coordinator.in_flight(), 0);

        assert!(!coordinator.is_dirty());
        assert_eq!(block_on(storage.load("p")).unwrap().name, "second");
    }

    #[test]
    fn test_racing_older_write_marks_page_for_resave() {
        let storage = Arc::new(SlowStorage::default());
        let mut coordinator = SaveCoordinator::new(Arc::clone(&storage));
        coordinator.mark_dirty();

        // The older save starts writing, then the newer one lands underneath it
        let mut older = coordinator.request_save(&named("first"));
        let mut cx = Context::from_waker(Waker::noop());
        assert!(older.as_mut().poll(&mut cx).is_pending());
        let newer_outcome = block_on(coordinator.request_save(&named("second")));
        let older_outcome = block_on(older);
        assert!(older_outcome.overlapped);

        assert_eq!(coordinator.complete(newer_outcome), SaveStatus::Saved);
        assert_eq!(coordinator.complete(older_outcome), SaveStatus::Superseded);
        assert!(coordinator.is_dirty());
        assert!(coordinator.autosave_due());

        assert_eq!(block_on(coordinator.save_now(&named("second"))), SaveStatus::Saved);
        assert!(!coordinator.is_dirty());
        assert_eq!(block_on(storage.load("p")).unwrap().name, "second");
    }

    #[test]
    fn test_racing_write_completed_first_keeps_dirty() {
        let storage = Arc::new(SlowStorage::default());
        let mut coordinator = SaveCoordinator::new(Arc::clone(&storage));
        coordinator.mark_dirty();

        let mut older = coordinator.request_save(&named("first"));
        let mut cx = Context::from_waker(Waker::noop());
        assert!(older.as_mut().poll(&mut cx).is_pending());
        let newer_outcome = block_on(coordinator.request_save(&named("second")));
        let older_outcome = block_on(older);

        assert_eq!(coordinator.complete(older_outcome), SaveStatus::Superseded);
        // The newer completion must not clear the flag the race set
        assert_eq!(coordinator.complete(newer_outcome), SaveStatus::Saved);
        assert!(coordinator.is_dirty());
    }

    #[test]
    fn test_failure_sets_notice_and_keeps_dirty() {
        let mut coordinator = SaveCoordinator::new(Arc::new(FailingStorage));
        coordinator.mark_dirty();

        let status = block_on(coordinator.save_now(&PageDocument::new()));
        assert_eq!(status, SaveStatus::Failed);
        assert!(coordinator.is_dirty());
        let notice = coordinator.notice().unwrap();
        assert_eq!(notice.revision, 1);

        coordinator.dismiss_notice();
        assert!(coordinator.notice().is_none());
    }

    #[test]
    fn test_completion_after_close_ignored() {
        let mut coordinator = SaveCoordinator::new(Arc::new(FailingStorage));
        coordinator.mark_dirty();
        let pending = coordinator.request_save(&PageDocument::new());
        coordinator.close();

        let outcome = block_on(pending);
        assert_eq!(coordinator.complete(outcome), SaveStatus::Ignored);
        assert!(coordinator.notice().is_none());
        assert!(!coordinator.autosave_due());
    }
}
