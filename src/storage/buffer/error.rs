use thiserror::Error;

use crate::common::types::TableId;
use crate::storage::disk::DiskError;
use crate::storage::page::PageError;
use crate::transaction::concurrency::LockError;

#[derive(Error, Debug)]
pub enum BufferPoolError {
    #[error(transparent)]
    Aborted(#[from] LockError),

    #[error("no table registered under id {0:#x}")]
    UnknownTable(TableId),

    #[error("buffer pool full: every resident page is dirty")]
    NoEvictablePage,

    #[error("page error: {0}")]
    Page(#[from] PageError),

    #[error("disk error: {0}")]
    Disk(#[from] DiskError),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),
}

impl BufferPoolError {
    /// True when the transaction lost a lock wait and must be completed
    /// with `commit = false` by its caller.
    pub fn is_aborted(&self) -> bool {
        matches!(self, BufferPoolError::Aborted(_))
    }
}
