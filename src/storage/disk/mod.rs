mod heap_file;

pub use heap_file::HeapFile;

use thiserror::Error;

use crate::common::types::{Page, PageId, PageNo, TableId, TransactionId};
use crate::storage::buffer::{BufferPool, BufferPoolError};
use crate::storage::tuple::Tuple;

#[derive(Error, Debug)]
pub enum DiskError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("page {0} is out of bounds")]
    PageOutOfBounds(PageId),
    #[error("page {0} does not belong to this file")]
    ForeignPage(PageId),
}

/// A file backend the buffer pool can cache pages from.
///
/// `read_page` on the page number one past the end must return a freshly
/// initialized empty page and extend the logical page count; tuple-level
/// operations go back through the pool with exclusive locks and report which
/// pages they dirtied.
pub trait PageStore: Send + Sync {
    fn table_id(&self) -> TableId;

    fn num_pages(&self) -> PageNo;

    fn read_page(&self, pid: PageId) -> Result<Page, DiskError>;

    fn write_page(&self, page: &Page) -> Result<(), DiskError>;

    fn insert_tuple(
        &self,
        txn: TransactionId,
        pool: &BufferPool,
        tuple: &mut Tuple,
    ) -> Result<Vec<PageId>, BufferPoolError>;

    fn delete_tuple(
        &self,
        txn: TransactionId,
        pool: &BufferPool,
        tuple: &Tuple,
    ) -> Result<Vec<PageId>, BufferPoolError>;
}
