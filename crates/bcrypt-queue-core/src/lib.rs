//! bcrypt Job Dispatcher
//!
//! Accepts password hashing and verification requests from an embedding
//! host, runs each one off the host's thread, and hands the results back
//! through a queue that the host drains once per tick.
//!
//! ```text
//! caller thread ──submit──▶ Dispatcher ──spawn──▶ execution unit
//!                                                     │ HashEngine
//!                                                     ▼
//! host tick ──drain_all──▶ ResultQueue ◀──append── JobRecord
//!     │
//!     └──▶ Notifier ──▶ every attached Host: OnHashed / OnVerified
//! ```

// ----------------------------------------------------------------------------
// Module Declarations
// ----------------------------------------------------------------------------

pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod errors;
pub mod host;
pub mod job;
pub mod natives;
pub mod notifier;
pub mod plugin;
pub mod queue;
pub mod registry;
pub mod spawner;
pub mod stats;

// ----------------------------------------------------------------------------
// Public API
// ----------------------------------------------------------------------------

pub use config::{CallbackNames, DispatcherConfig, ExecutorKind};
pub use dispatcher::Dispatcher;
pub use engine::{Cost, HashEngine, HashInfo, HashVersion, MAX_COST, MIN_COST};
pub use errors::{CallbackError, DispatchError, Result};
pub use host::{CallbackArg, CallbackIndex, Host, HostHandle};
pub use job::{CallerTag, JobKind, JobOutcome, JobRecord, JobRequest};
pub use natives::NativeArgs;
pub use notifier::{Notifier, NotifyReport};
pub use plugin::{BcryptPlugin, TickReport};
pub use queue::ResultQueue;
pub use registry::Registry;
pub use spawner::{InlineSpawner, Job, Spawner, ThreadSpawner, WorkerPool};
pub use stats::{DispatchStats, StatsSnapshot};

#[cfg(feature = "tokio")]
pub use spawner::TokioSpawner;

/// Version reported to the host on load
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
