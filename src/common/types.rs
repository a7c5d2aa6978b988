use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Table ID type (stable hash of the backing file path)
pub type TableId = u64;

/// Page number within a table file
pub type PageNo = u32;

/// Slot index of a tuple within a page
pub type SlotId = u32;

/// Identity of a page within the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageId {
    pub table_id: TableId,
    pub page_no: PageNo,
}

impl PageId {
    pub fn new(table_id: TableId, page_no: PageNo) -> Self {
        Self { table_id, page_no }
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}:{}", self.table_id, self.page_no)
    }
}

static NEXT_TXN_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque transaction identifier, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(u64);

impl TransactionId {
    /// Allocate a fresh, never-before-seen transaction ID
    pub fn fresh() -> Self {
        Self(NEXT_TXN_ID.fetch_add(1, Ordering::SeqCst))
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn-{}", self.0)
    }
}

/// Page structure: a fixed-size byte container plus transactional bookkeeping
#[derive(Clone)]
pub struct Page {
    pub id: PageId,
    pub data: Box<[u8]>,
    dirty_by: Option<TransactionId>,
    before_image: Box<[u8]>,
}

impl Page {
    pub fn new(id: PageId, page_size: usize) -> Self {
        Self {
            id,
            data: vec![0u8; page_size].into_boxed_slice(),
            dirty_by: None,
            before_image: vec![0u8; page_size].into_boxed_slice(),
        }
    }

    pub fn page_size(&self) -> usize {
        self.data.len()
    }

    /// Mark the page dirty on behalf of a transaction, or clean with `None`
    pub fn mark_dirty(&mut self, txn: Option<TransactionId>) {
        self.dirty_by = txn;
    }

    /// The transaction that last dirtied this page, if it is dirty
    pub fn dirtied_by(&self) -> Option<TransactionId> {
        self.dirty_by
    }

    /// Snapshot the current contents as the before-image.
    /// Called at load time and after each flush.
    pub fn set_before_image(&mut self) {
        self.before_image.copy_from_slice(&self.data);
    }

    pub fn before_image(&self) -> &[u8] {
        &self.before_image
    }
}

/// Smart pointer to a page
pub type PagePtr = Arc<RwLock<Page>>;
