//! Host Notifier
//!
//! Fans a drained batch of records out to every attached host. The outer
//! loop is over hosts and the inner loop over records, so one host sees all
//! of this tick's results before the next host sees any.

use serde::Serialize;
use tracing::{trace, warn};

use crate::config::CallbackNames;
use crate::host::{CallbackArg, Host};
use crate::job::{JobOutcome, JobRecord};
use crate::registry::Registry;

/// Outcome counters for one fan-out
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NotifyReport {
    /// Callback invocations that returned successfully
    pub delivered: u64,
    /// Pairs where the host does not define the callback
    pub skipped: u64,
    /// Callback invocations that returned an error
    pub failed: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Notifier {
    callbacks: CallbackNames,
}

impl Notifier {
    pub fn new(callbacks: CallbackNames) -> Self {
        Self { callbacks }
    }

    /// Deliver `records` to every host in `registry`
    pub fn notify<H: Host>(&self, registry: &mut Registry<H>, records: &[JobRecord]) -> NotifyReport {
        let mut report = NotifyReport::default();
        if records.is_empty() {
            return report;
        }

        for host in registry.iter_mut() {
            for record in records {
                self.deliver(host, record, &mut report);
            }
        }
        report
    }

    fn deliver<H: Host>(&self, host: &mut H, record: &JobRecord, report: &mut NotifyReport) {
        let name = match record.outcome {
            JobOutcome::Hashed { .. } => &self.callbacks.hashed,
            JobOutcome::Verified { .. } => &self.callbacks.verified,
        };
        let Some(callback) = host.find_callback(name) else {
            report.skipped += 1;
            return;
        };

        let payload = match &record.outcome {
            JobOutcome::Hashed { hash } => CallbackArg::Str(hash),
            JobOutcome::Verified { matched } => CallbackArg::Bool(*matched),
        };
        let args = [
            CallbackArg::Int(record.tag.index),
            CallbackArg::Int(record.tag.id),
            payload,
        ];

        match host.execute(callback, &args) {
            Ok(()) => {
                trace!("{} -> {}({})", host.handle(), name, record.tag);
                report.delivered += 1;
            }
            Err(e) => {
                warn!("{} rejected {} for job {}: {}", host.handle(), name, record.tag, e);
                report.failed += 1;
            }
        }
    }
}
