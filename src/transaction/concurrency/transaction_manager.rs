use std::collections::HashSet;
use std::sync::Arc;

use log::debug;
use parking_lot::Mutex;
use thiserror::Error;

use crate::common::types::TransactionId;
use crate::storage::buffer::{BufferPool, BufferPoolError};

/// Errors from the transaction lifecycle surface
#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("transaction {0} is not active")]
    UnknownTransaction(TransactionId),

    #[error("storage error: {0}")]
    Storage(#[from] BufferPoolError),
}

/// Transaction manager - hands out transaction IDs and drives commit/abort
/// through the buffer pool.
pub struct TransactionManager {
    buffer_pool: Arc<BufferPool>,
    active: Mutex<HashSet<TransactionId>>,
}

impl TransactionManager {
    pub fn new(buffer_pool: Arc<BufferPool>) -> Self {
        Self {
            buffer_pool,
            active: Mutex::new(HashSet::new()),
        }
    }

    /// Begin a new transaction
    pub fn begin(&self) -> TransactionId {
        let txn = TransactionId::fresh();
        self.active.lock().insert(txn);
        debug!("{} started", txn);
        txn
    }

    /// Commit a transaction: flush its dirty pages, then release its locks.
    pub fn commit(&self, txn: TransactionId) -> Result<(), TransactionError> {
        self.complete(txn, true)
    }

    /// Abort a transaction: revert its dirty pages, then release its locks.
    pub fn abort(&self, txn: TransactionId) -> Result<(), TransactionError> {
        self.complete(txn, false)
    }

    pub fn is_active(&self, txn: TransactionId) -> bool {
        self.active.lock().contains(&txn)
    }

    pub fn active_transactions(&self) -> Vec<TransactionId> {
        self.active.lock().iter().copied().collect()
    }

    fn complete(&self, txn: TransactionId, commit: bool) -> Result<(), TransactionError> {
        if !self.active.lock().remove(&txn) {
            return Err(TransactionError::UnknownTransaction(txn));
        }
        self.buffer_pool.complete_transaction(txn, commit)?;
        Ok(())
    }
}
