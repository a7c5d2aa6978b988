use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use log::warn;
use parking_lot::{Condvar, Mutex, RwLock};
use thiserror::Error;

use crate::common::types::{PageId, TransactionId};

/// Lock modes for page access
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockMode {
    Shared,
    Exclusive,
}

#[derive(Error, Debug)]
pub enum LockError {
    #[error("{txn} timed out waiting for {mode:?} lock on page {pid}; aborting")]
    Timeout {
        txn: TransactionId,
        pid: PageId,
        mode: LockMode,
    },
}

#[derive(Default)]
struct LockState {
    exclusive: Option<TransactionId>,
    shared: HashSet<TransactionId>,
}

impl LockState {
    fn blocks_shared(&self, txn: TransactionId) -> bool {
        matches!(self.exclusive, Some(holder) if holder != txn)
    }

    fn blocks_exclusive(&self, txn: TransactionId) -> bool {
        if matches!(self.exclusive, Some(holder) if holder != txn) {
            return true;
        }
        // Readers block a writer unless the requester is the lone reader
        // (the upgrade case).
        !(self.shared.is_empty() || (self.shared.len() == 1 && self.shared.contains(&txn)))
    }
}

#[derive(Default)]
struct LockEntry {
    state: Mutex<LockState>,
    ready: Condvar,
}

/// Per-page shared/exclusive lock table with timeout-based deadlock abort.
///
/// A transaction's locks are released only at completion (strict 2PL); a
/// blocked acquisition gives up after `timeout` and the requester must abort.
pub struct LockManager {
    entries: RwLock<HashMap<PageId, Arc<LockEntry>>>,
    timeout: Duration,
}

impl LockManager {
    pub fn new(timeout: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            timeout,
        }
    }

    pub fn acquire(
        &self,
        txn: TransactionId,
        pid: PageId,
        mode: LockMode,
    ) -> Result<(), LockError> {
        let entry = self.entry(pid);
        let mut state = entry.state.lock();
        // One absolute deadline bounds the total wait across wakeups.
        let deadline = Instant::now() + self.timeout;

        match mode {
            LockMode::Shared => {
                while state.blocks_shared(txn) {
                    if entry.ready.wait_until(&mut state, deadline).timed_out()
                        && state.blocks_shared(txn)
                    {
                        warn!("{} gave up waiting for shared lock on {}", txn, pid);
                        return Err(LockError::Timeout { txn, pid, mode });
                    }
                }
                state.shared.insert(txn);
            }
            LockMode::Exclusive => {
                while state.blocks_exclusive(txn) {
                    if entry.ready.wait_until(&mut state, deadline).timed_out()
                        && state.blocks_exclusive(txn)
                    {
                        warn!("{} gave up waiting for exclusive lock on {}", txn, pid);
                        return Err(LockError::Timeout { txn, pid, mode });
                    }
                }
                state.exclusive = Some(txn);
            }
        }

        Ok(())
    }

    pub fn release(&self, txn: TransactionId, pid: PageId) {
        let entry = match self.entries.read().get(&pid) {
            Some(entry) => entry.clone(),
            None => return,
        };

        let mut state = entry.state.lock();
        if state.exclusive == Some(txn) {
            state.exclusive = None;
            state.shared.remove(&txn);
            // Several compatible waiters may now be eligible at once.
            entry.ready.notify_all();
        } else {
            state.shared.remove(&txn);
            // A lone remaining reader may now be able to upgrade.
            if state.shared.len() <= 1 {
                entry.ready.notify_all();
            }
        }
    }

    pub fn holds(&self, txn: TransactionId, pid: PageId) -> bool {
        let entry = match self.entries.read().get(&pid) {
            Some(entry) => entry.clone(),
            None => return false,
        };

        let state = entry.state.lock();
        state.exclusive == Some(txn) || state.shared.contains(&txn)
    }

    fn entry(&self, pid: PageId) -> Arc<LockEntry> {
        if let Some(entry) = self.entries.read().get(&pid) {
            return entry.clone();
        }
        self.entries.write().entry(pid).or_default().clone()
    }
}
