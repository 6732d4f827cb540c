//! Dispatch counters
//!
//! Lock-free tallies updated by producers, execution units and the tick
//! handler. Snapshots are not atomic across fields.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

#[derive(Debug, Default)]
pub struct DispatchStats {
    submitted: AtomicU64,
    rejected: AtomicU64,
    spawn_failures: AtomicU64,
    completed: AtomicU64,
    delivered: AtomicU64,
    skipped: AtomicU64,
    callback_failures: AtomicU64,
}

/// Point-in-time copy of `DispatchStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    /// Requests that passed validation
    pub submitted: u64,
    /// Requests refused at the boundary
    pub rejected: u64,
    /// Accepted requests dropped because no execution unit could be started
    pub spawn_failures: u64,
    /// Records appended to the result queue
    pub completed: u64,
    /// Host callback invocations that ran
    pub delivered: u64,
    /// (host, record) pairs where the host had no matching callback
    pub skipped: u64,
    /// Host callback invocations that reported an error
    pub callback_failures: u64,
}

impl StatsSnapshot {
    /// Accepted jobs whose record has not been produced yet
    pub fn in_flight(&self) -> u64 {
        self.submitted
            .saturating_sub(self.spawn_failures)
            .saturating_sub(self.completed)
    }
}

impl DispatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_submitted(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_spawn_failure(&self) {
        self.spawn_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_delivery(&self, delivered: u64, skipped: u64, failed: u64) {
        self.delivered.fetch_add(delivered, Ordering::Relaxed);
        self.skipped.fetch_add(skipped, Ordering::Relaxed);
        self.callback_failures.fetch_add(failed, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            submitted: self.submitted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            spawn_failures: self.spawn_failures.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            callback_failures: self.callback_failures.load(Ordering::Relaxed),
        }
    }
}
