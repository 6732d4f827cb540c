//! Async host main loop
//!
//! Stands in for the embedding server: owns the plugin, ticks it on a tokio
//! interval and watches the invocation log of its script instances.

use std::time::Instant;

use bcrypt_queue_core::{BcryptPlugin, StatsSnapshot};
use bcrypt_queue_harness::{InvocationLog, ScriptHost, TickOutcome};
use tokio::time::{interval, MissedTickBehavior};
use tracing::debug;

use crate::config::AppConfig;
use crate::error::{CliError, Result};

pub struct HostLoop {
    plugin: BcryptPlugin<ScriptHost>,
    log: InvocationLog,
    config: AppConfig,
}

impl HostLoop {
    /// Load the plugin and attach `hosts` standard script instances
    pub fn start(config: AppConfig, hosts: usize) -> Result<Self> {
        let mut plugin = BcryptPlugin::on_load(config.dispatcher.clone())?;
        let log = InvocationLog::new();
        for id in 1..=hosts {
            let script = ScriptHost::new(id as u64, format!("script-{}", id), log.clone())
                .with_public(config.dispatcher.callbacks.hashed.clone())
                .with_public(config.dispatcher.callbacks.verified.clone());
            plugin.on_host_attach(script);
        }
        Ok(Self {
            plugin,
            log,
            config,
        })
    }

    pub fn plugin(&self) -> &BcryptPlugin<ScriptHost> {
        &self.plugin
    }

    pub fn log(&self) -> &InvocationLog {
        &self.log
    }

    /// Tick until `expected` callbacks have run across all scripts
    pub async fn run_until(&mut self, expected: usize) -> Result<TickOutcome> {
        let started = Instant::now();
        let timeout = self.config.host.wait_timeout();
        let mut ticker = interval(self.config.host.tick_interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut outcome = TickOutcome::default();
        loop {
            ticker.tick().await;
            let report = self.plugin.on_tick();
            outcome.ticks += 1;
            outcome.drained += report.drained;
            outcome.delivered += report.notify.delivered;
            if report.drained > 0 {
                debug!("Tick {} drained {} records", outcome.ticks, report.drained);
            }

            let received = self.log.len();
            if received >= expected {
                outcome.satisfied = true;
                return Ok(outcome);
            }
            if started.elapsed() >= timeout {
                return Err(CliError::Timeout {
                    expected,
                    received,
                    waited_secs: timeout.as_secs(),
                });
            }
        }
    }

    pub fn shutdown(self) -> StatsSnapshot {
        self.plugin.on_unload()
    }
}
