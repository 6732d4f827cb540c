//! Result Queue
//!
//! Many execution units append, one consumer drains. Both operations hold the
//! same lock, and only for the duration of a push or a swap, so a drain sees
//! each record exactly once and in append order.

use std::mem;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::job::JobRecord;

/// Mutex-guarded, append-ordered sequence of completed jobs
#[derive(Debug, Default)]
pub struct ResultQueue {
    records: Mutex<Vec<JobRecord>>,
}

impl ResultQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed record
    pub fn append(&self, record: JobRecord) {
        self.lock().push(record);
    }

    /// Take every queued record, leaving the queue empty
    pub fn drain_all(&self) -> Vec<JobRecord> {
        mem::take(&mut *self.lock())
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A panic while the lock was held cannot leave the Vec half-written:
    // push and take are the only mutations.
    fn lock(&self) -> MutexGuard<'_, Vec<JobRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
