//! Plugin lifecycle
//!
//! `BcryptPlugin` is the single object an embedding layer keeps between
//! `Load` and `Unload`. It owns the dispatcher, the host registry and the
//! notifier. Producers on other threads get a `Dispatcher` clone; everything
//! that touches the registry takes `&mut self` and so stays on the host's
//! own thread.

use serde::Serialize;
use tracing::{debug, info};

use crate::config::{available_parallelism, DispatcherConfig};
use crate::dispatcher::Dispatcher;
use crate::errors::Result;
use crate::host::{Host, HostHandle};
use crate::natives::{self, NativeArgs};
use crate::notifier::{Notifier, NotifyReport};
use crate::registry::Registry;
use crate::stats::StatsSnapshot;

/// What one tick did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Records taken off the result queue
    pub drained: usize,
    /// Hosts the records were fanned out to
    pub hosts: usize,
    pub notify: NotifyReport,
}

pub struct BcryptPlugin<H> {
    config: DispatcherConfig,
    dispatcher: Dispatcher,
    registry: Registry<H>,
    notifier: Notifier,
}

impl<H: Host> BcryptPlugin<H> {
    /// Process-wide setup
    pub fn on_load(config: DispatcherConfig) -> Result<Self> {
        let dispatcher = Dispatcher::from_config(&config)?;
        let notifier = Notifier::new(config.callbacks.clone());

        info!("plugin.bcrypt {} was loaded.", crate::VERSION);
        info!(
            "plugin.bcrypt: Concurrent threads supported: {} ({} executor)",
            available_parallelism(),
            dispatcher.spawner_name()
        );

        Ok(Self {
            config,
            dispatcher,
            registry: Registry::new(),
            notifier,
        })
    }

    /// Process-wide teardown. Jobs still running are abandoned; their
    /// records land in a queue nobody drains.
    pub fn on_unload(mut self) -> StatsSnapshot {
        self.registry.clear();
        let stats = self.dispatcher.stats();
        info!(
            "plugin.bcrypt: Plugin unloaded ({} submitted, {} completed, {} in flight).",
            stats.submitted,
            stats.completed,
            stats.in_flight()
        );
        stats
    }

    pub fn on_host_attach(&mut self, host: H) -> bool {
        let handle = host.handle();
        let inserted = self.registry.attach(host);
        if inserted {
            info!("Attached {} ({} natives registered)", handle, natives::NATIVES.len());
        }
        inserted
    }

    pub fn on_host_detach(&mut self, handle: HostHandle) -> Option<H> {
        let removed = self.registry.detach(handle);
        if removed.is_some() {
            info!("Detached {}", handle);
        } else {
            debug!("Detach of unknown {} ignored", handle);
        }
        removed
    }

    /// Host tick: drain the result queue and notify every attached host
    pub fn on_tick(&mut self) -> TickReport {
        self.drain_and_notify()
    }

    pub fn drain_and_notify(&mut self) -> TickReport {
        let records = self.dispatcher.drain();
        if records.is_empty() {
            return TickReport::default();
        }

        let notify = self.notifier.notify(&mut self.registry, &records);
        self.dispatcher
            .stats_handle()
            .record_delivery(notify.delivered, notify.skipped, notify.failed);
        debug!(
            "Tick delivered {} records to {} hosts",
            records.len(),
            self.registry.len()
        );

        TickReport {
            drained: records.len(),
            hosts: self.registry.len(),
            notify,
        }
    }

    // ------------------------------------------------------------------------
    // Submission
    // ------------------------------------------------------------------------

    pub fn submit_hash(&self, caller_index: i32, caller_id: i32, password: &[u8], cost: u16) -> bool {
        self.dispatcher.submit_hash(caller_index, caller_id, password, cost)
    }

    pub fn submit_verify(
        &self,
        caller_index: i32,
        caller_id: i32,
        password: &[u8],
        reference_hash: &[u8],
    ) -> bool {
        self.dispatcher
            .submit_verify(caller_index, caller_id, password, reference_hash)
    }

    pub fn call_native(&self, name: &str, args: &dyn NativeArgs) -> i32 {
        natives::call_native(&self.dispatcher, name, args)
    }

    // ------------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------------

    /// Handle for submitting from other threads
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    pub fn hosts(&self) -> &Registry<H> {
        &self.registry
    }

    pub fn pending(&self) -> usize {
        self.dispatcher.queue().len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.dispatcher.stats()
    }
}
