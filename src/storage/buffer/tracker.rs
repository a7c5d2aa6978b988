use std::collections::{HashMap, HashSet};

use parking_lot::Mutex;

use crate::common::types::{PageId, TransactionId};

/// The set of pages each active transaction has accessed. Entries are
/// created lazily on first access and removed only at completion; under
/// strict 2PL the set grows monotonically until then.
#[derive(Default)]
pub struct TxnTracker {
    touched: Mutex<HashMap<TransactionId, HashSet<PageId>>>,
}

impl TxnTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, txn: TransactionId, pid: PageId) {
        self.touched.lock().entry(txn).or_default().insert(pid);
    }

    /// Whether the transaction has touched any page and not yet completed.
    pub fn is_active(&self, txn: TransactionId) -> bool {
        self.touched.lock().contains_key(&txn)
    }

    /// Remove and return the transaction's touched set.
    pub fn take(&self, txn: TransactionId) -> Option<HashSet<PageId>> {
        self.touched.lock().remove(&txn)
    }
}
