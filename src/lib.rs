// Export public modules
pub mod common;
pub mod storage;
pub mod transaction;

// Re-export key items for convenient access
pub use common::config::{EvictionPolicy, StorageConfig};
pub use common::types::{Page, PageId, PagePtr, TransactionId};
pub use storage::buffer::{BufferPool, BufferPoolError};
pub use storage::disk::{DiskError, HeapFile, PageStore};
pub use storage::page::{PageError, PageManager};
pub use storage::tuple::{RecordId, Tuple};
pub use transaction::concurrency::{
    LockError, LockManager, LockMode, TransactionError, TransactionManager,
};
