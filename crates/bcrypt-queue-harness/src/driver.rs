//! Synchronous tick driver
//!
//! Plays the host's main loop: tick, sleep, repeat, until a condition holds
//! or the deadline passes.

use std::thread;
use std::time::{Duration, Instant};

use bcrypt_queue_core::{BcryptPlugin, Host, TickReport};

/// Totals across every tick of one `tick_until` run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickOutcome {
    pub ticks: u64,
    pub drained: usize,
    pub delivered: u64,
    /// Whether `done` returned true before the deadline
    pub satisfied: bool,
}

impl TickOutcome {
    fn absorb(&mut self, report: &TickReport) {
        self.ticks += 1;
        self.drained += report.drained;
        self.delivered += report.notify.delivered;
    }
}

/// Tick `plugin` every `interval` until `done` or `timeout`
pub fn tick_until<H, F>(
    plugin: &mut BcryptPlugin<H>,
    interval: Duration,
    timeout: Duration,
    mut done: F,
) -> TickOutcome
where
    H: Host,
    F: FnMut(&BcryptPlugin<H>) -> bool,
{
    let deadline = Instant::now() + timeout;
    let mut outcome = TickOutcome::default();

    loop {
        let report = plugin.on_tick();
        outcome.absorb(&report);
        if done(plugin) {
            outcome.satisfied = true;
            return outcome;
        }
        if Instant::now() >= deadline {
            return outcome;
        }
        thread::sleep(interval);
    }
}
