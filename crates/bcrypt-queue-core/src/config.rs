//! Dispatcher Configuration
//!
//! Everything tunable about the plugin: which bcrypt revision to emit, how
//! execution units are started, and which host callbacks receive results.

use std::thread;

use serde::{Deserialize, Serialize};

use crate::engine::HashVersion;
use crate::errors::{DispatchError, Result};

// ----------------------------------------------------------------------------
// Executor Selection
// ----------------------------------------------------------------------------

/// Strategy used to start execution units
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutorKind {
    /// A new OS thread for every job
    #[default]
    Thread,
    /// A fixed pool of worker threads behind an unbounded channel
    Pool,
    /// The blocking pool of the ambient tokio runtime
    Tokio,
}

// ----------------------------------------------------------------------------
// Callback Names
// ----------------------------------------------------------------------------

/// Names of the host callbacks that receive results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackNames {
    /// `(caller_index, caller_id, hash)` on completed hash jobs
    pub hashed: String,
    /// `(caller_index, caller_id, matched)` on completed verify jobs
    pub verified: String,
}

impl Default for CallbackNames {
    fn default() -> Self {
        Self {
            hashed: "OnHashed".to_string(),
            verified: "OnVerified".to_string(),
        }
    }
}

// ----------------------------------------------------------------------------
// Dispatcher Configuration
// ----------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherConfig {
    /// Revision tag written into generated hashes
    pub hash_version: HashVersion,
    /// How execution units are started
    pub executor: ExecutorKind,
    /// Worker count when `executor` is `pool`
    pub pool_workers: usize,
    /// Name prefix for threads started by the dispatcher
    pub thread_name: String,
    /// Host callbacks that receive results
    pub callbacks: CallbackNames,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            hash_version: HashVersion::TwoY,
            executor: ExecutorKind::Thread,
            pool_workers: available_parallelism(),
            thread_name: "bcrypt-worker".to_string(),
            callbacks: CallbackNames::default(),
        }
    }
}

impl DispatcherConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Small pool, suitable for tests that submit many cheap jobs
    pub fn testing() -> Self {
        Self {
            executor: ExecutorKind::Pool,
            pool_workers: 4,
            thread_name: "bcrypt-test".to_string(),
            ..Self::default()
        }
    }

    /// One pool worker: jobs complete in submission order
    pub fn single_worker() -> Self {
        Self {
            executor: ExecutorKind::Pool,
            pool_workers: 1,
            ..Self::default()
        }
    }

    pub fn with_executor(mut self, executor: ExecutorKind) -> Self {
        self.executor = executor;
        self
    }

    pub fn with_pool_workers(mut self, workers: usize) -> Self {
        self.pool_workers = workers;
        self
    }

    pub fn with_hash_version(mut self, version: HashVersion) -> Self {
        self.hash_version = version;
        self
    }

    pub fn with_callbacks(mut self, callbacks: CallbackNames) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.executor == ExecutorKind::Pool && self.pool_workers == 0 {
            return Err(DispatchError::config_error(
                "pool_workers must be at least 1",
            ));
        }
        if self.hash_version == HashVersion::TwoX {
            return Err(DispatchError::config_error(
                "hash_version 2x is only accepted for verification",
            ));
        }
        if self.thread_name.trim().is_empty() {
            return Err(DispatchError::config_error("thread_name must not be empty"));
        }
        if self.callbacks.hashed.is_empty() || self.callbacks.verified.is_empty() {
            return Err(DispatchError::config_error(
                "callback names must not be empty",
            ));
        }
        Ok(())
    }
}

/// Hardware threads available to this process, at least 1
pub fn available_parallelism() -> usize {
    thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}
