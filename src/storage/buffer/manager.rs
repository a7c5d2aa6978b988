use std::collections::HashMap;
use std::sync::Arc;

use log::debug;
use parking_lot::{Mutex, RwLock};

use crate::common::config::{EvictionPolicy, StorageConfig};
use crate::common::types::{PageId, PagePtr, TableId, TransactionId};
use crate::storage::buffer::error::BufferPoolError;
use crate::storage::buffer::replacer::LruReplacer;
use crate::storage::buffer::tracker::TxnTracker;
use crate::storage::disk::PageStore;
use crate::storage::tuple::Tuple;
use crate::transaction::concurrency::{LockManager, LockMode};

/// The page map and its LRU order change together, so they live under one
/// mutex as a unit.
struct CacheInner {
    pages: HashMap<PageId, PagePtr>,
    replacer: LruReplacer,
}

/// Caches fixed-size pages from registered table files and coordinates
/// access across transactions with page-level two-phase locking.
///
/// Dirty pages never leave memory before their transaction commits
/// (NO-STEAL, under the default policy) and commit flushes every dirty page
/// before releasing locks (FORCE), so the on-disk image of any page touched
/// by an active transaction is always the last committed state.
pub struct BufferPool {
    capacity: usize,
    eviction: EvictionPolicy,
    cache: Mutex<CacheInner>,
    lock_manager: LockManager,
    tracker: TxnTracker,
    files: RwLock<HashMap<TableId, Arc<dyn PageStore>>>,
}

impl BufferPool {
    pub fn new(config: &StorageConfig) -> Self {
        Self {
            capacity: config.pool_capacity,
            eviction: config.eviction,
            cache: Mutex::new(CacheInner {
                pages: HashMap::new(),
                replacer: LruReplacer::new(config.pool_capacity),
            }),
            lock_manager: LockManager::new(config.deadlock_timeout),
            tracker: TxnTracker::new(),
            files: RwLock::new(HashMap::new()),
        }
    }

    /// Make a table file available for page lookups by its table id.
    pub fn register_file(&self, file: Arc<dyn PageStore>) {
        self.files.write().insert(file.table_id(), file);
    }

    /// Retrieve a page on behalf of a transaction, locking it in the
    /// requested mode. Blocks while the lock is contended and returns an
    /// abort error if the wait times out. The page is served from the cache
    /// when resident, otherwise loaded from its file, evicting if the pool
    /// is full.
    pub fn get_page(
        &self,
        txn: TransactionId,
        pid: PageId,
        mode: LockMode,
    ) -> Result<PagePtr, BufferPoolError> {
        self.lock_manager.acquire(txn, pid, mode)?;
        self.tracker.record(txn, pid);

        let mut cache = self.cache.lock();
        if let Some(page) = cache.pages.get(&pid).cloned() {
            cache.replacer.record_access(pid);
            return Ok(page);
        }

        if cache.pages.len() >= self.capacity {
            self.evict_one(&mut cache)?;
        }

        let file = self.file_for(pid.table_id)?;
        let page = Arc::new(RwLock::new(file.read_page(pid)?));
        cache.pages.insert(pid, page.clone());
        cache.replacer.record_access(pid);
        Ok(page)
    }

    /// Add a tuple to the table on behalf of the transaction. The file picks
    /// the page (locking it exclusively through this pool) and every page it
    /// dirtied is marked with the transaction.
    pub fn insert_tuple(
        &self,
        txn: TransactionId,
        table_id: TableId,
        tuple: &mut Tuple,
    ) -> Result<(), BufferPoolError> {
        let file = self.file_for(table_id)?;
        let dirtied = file.insert_tuple(txn, self, tuple)?;
        self.mark_dirtied(txn, &dirtied);
        Ok(())
    }

    /// Remove a tuple from whatever page it lives on.
    pub fn delete_tuple(&self, txn: TransactionId, tuple: &Tuple) -> Result<(), BufferPoolError> {
        let rid = tuple
            .rid()
            .ok_or_else(|| BufferPoolError::InvalidOperation("tuple has no record id".into()))?;
        let file = self.file_for(rid.page_id.table_id)?;
        let dirtied = file.delete_tuple(txn, self, tuple)?;
        self.mark_dirtied(txn, &dirtied);
        Ok(())
    }

    pub fn holds_lock(&self, txn: TransactionId, pid: PageId) -> bool {
        self.lock_manager.holds(txn, pid)
    }

    /// Release a single lock outside transaction completion. Breaks two-phase
    /// locking; for tests only.
    pub fn unsafe_release_page(&self, txn: TransactionId, pid: PageId) {
        self.lock_manager.release(txn, pid);
    }

    /// Write a resident dirty page back to its file and clear the dirty
    /// marker. A page that is not resident, or not dirty, is left alone.
    pub fn flush_page(&self, pid: PageId) -> Result<(), BufferPoolError> {
        let page = self.cache.lock().pages.get(&pid).cloned();
        match page {
            Some(page) => self.flush_ptr(&page),
            None => Ok(()),
        }
    }

    /// Flush every resident dirty page whose transaction has completed.
    /// Pages dirtied by a still-active transaction are skipped: writing them
    /// would publish uncommitted data.
    pub fn flush_all_pages(&self) -> Result<(), BufferPoolError> {
        let pages: Vec<PagePtr> = self.cache.lock().pages.values().cloned().collect();
        for page in pages {
            let uncommitted = match page.read().dirtied_by() {
                Some(txn) => self.tracker.is_active(txn),
                None => false,
            };
            if !uncommitted {
                self.flush_ptr(&page)?;
            }
        }
        Ok(())
    }

    /// Drop a page from the cache without flushing it.
    pub fn discard_page(&self, pid: PageId) {
        let mut cache = self.cache.lock();
        cache.pages.remove(&pid);
        cache.replacer.remove(pid);
    }

    /// Commit or abort a transaction. Commit flushes all of its dirty pages
    /// before any lock is released; abort restores its dirty pages from
    /// disk, which still holds the pre-transaction contents because dirty
    /// pages are never stolen. Either way, every lock the transaction holds
    /// is then released and its touched-page set dropped.
    pub fn complete_transaction(
        &self,
        txn: TransactionId,
        commit: bool,
    ) -> Result<(), BufferPoolError> {
        let touched = match self.tracker.take(txn) {
            Some(touched) => touched,
            None => return Ok(()),
        };

        let mut first_err = None;
        for &pid in &touched {
            let page = self.cache.lock().pages.get(&pid).cloned();
            let outcome = match page {
                Some(page) if commit => self.flush_ptr(&page),
                Some(page) => self.revert(txn, pid, &page),
                None => Ok(()),
            };
            if let Err(e) = outcome {
                first_err.get_or_insert(e);
            }
        }

        // Locks go last: a waiter woken here must observe the flushed or
        // reverted page, never an in-between state.
        for &pid in &touched {
            self.lock_manager.release(txn, pid);
        }

        debug!(
            "{} {} with {} touched pages",
            txn,
            if commit { "committed" } else { "aborted" },
            touched.len()
        );

        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn file_for(&self, table_id: TableId) -> Result<Arc<dyn PageStore>, BufferPoolError> {
        self.files
            .read()
            .get(&table_id)
            .cloned()
            .ok_or(BufferPoolError::UnknownTable(table_id))
    }

    fn mark_dirtied(&self, txn: TransactionId, dirtied: &[PageId]) {
        let cache = self.cache.lock();
        for pid in dirtied {
            if let Some(page) = cache.pages.get(pid) {
                page.write().mark_dirty(Some(txn));
            }
        }
    }

    /// Make room for one incoming page. Under NO-STEAL the victim scan
    /// skips dirty pages and fails when none is clean; under STEAL the LRU
    /// victim is flushed first and then dropped.
    fn evict_one(&self, cache: &mut CacheInner) -> Result<(), BufferPoolError> {
        let CacheInner { pages, replacer } = cache;

        match self.eviction {
            EvictionPolicy::NoSteal => {
                let victim = replacer
                    .victim_where(|pid| {
                        pages.get(&pid).map_or(true, |p| p.read().dirtied_by().is_none())
                    })
                    .ok_or(BufferPoolError::NoEvictablePage)?;
                pages.remove(&victim);
                debug!("evicted page {}", victim);
            }
            EvictionPolicy::Steal => {
                let victim = replacer.victim().ok_or(BufferPoolError::NoEvictablePage)?;
                if let Some(page) = pages.get(&victim).cloned() {
                    if let Err(e) = self.flush_ptr(&page) {
                        replacer.record_access(victim);
                        return Err(e);
                    }
                }
                pages.remove(&victim);
                debug!("flushed and evicted page {}", victim);
            }
        }
        Ok(())
    }

    fn flush_ptr(&self, page: &PagePtr) -> Result<(), BufferPoolError> {
        let mut guard = page.write();
        if guard.dirtied_by().is_none() {
            return Ok(());
        }

        let file = self.file_for(guard.id.table_id)?;
        file.write_page(&guard)?;
        guard.mark_dirty(None);
        // Refresh the snapshot so a later transaction can abort cleanly.
        guard.set_before_image();
        Ok(())
    }

    /// Undo a transaction's writes to a page by reloading the on-disk image,
    /// which NO-STEAL guarantees is the pre-transaction state. If the reload
    /// fails the entry is dropped instead so the next reader refetches.
    fn revert(
        &self,
        txn: TransactionId,
        pid: PageId,
        page: &PagePtr,
    ) -> Result<(), BufferPoolError> {
        if page.read().dirtied_by() != Some(txn) {
            return Ok(());
        }

        let file = self.file_for(pid.table_id)?;
        match file.read_page(pid) {
            Ok(restored) => {
                *page.write() = restored;
            }
            Err(_) => {
                self.discard_page(pid);
            }
        }
        Ok(())
    }
}
