//! Work Dispatcher
//!
//! Validates requests on the caller's thread, then moves each one into its
//! own execution unit. The unit hashes or verifies, appends exactly one
//! record to the result queue and ends. Nothing waits on it.

use std::sync::Arc;

use tracing::{debug, error};

use crate::config::{DispatcherConfig, ExecutorKind};
use crate::engine::{Cost, HashEngine};
use crate::errors::{DispatchError, Result};
use crate::job::{CallerTag, JobRecord, JobRequest};
use crate::queue::ResultQueue;
use crate::spawner::{Spawner, ThreadSpawner, WorkerPool};
use crate::stats::{DispatchStats, StatsSnapshot};

/// Cheap to clone; every clone feeds the same result queue
#[derive(Clone)]
pub struct Dispatcher {
    engine: HashEngine,
    queue: Arc<ResultQueue>,
    stats: Arc<DispatchStats>,
    spawner: Arc<dyn Spawner>,
}

impl Dispatcher {
    pub fn new(engine: HashEngine, spawner: Arc<dyn Spawner>) -> Self {
        Self {
            engine,
            queue: Arc::new(ResultQueue::new()),
            stats: Arc::new(DispatchStats::new()),
            spawner,
        }
    }

    /// Build the engine and spawner described by `config`.
    ///
    /// `ExecutorKind::Tokio` must be called from within a tokio runtime.
    pub fn from_config(config: &DispatcherConfig) -> Result<Self> {
        config.validate()?;
        let engine = HashEngine::new(config.hash_version);
        let spawner: Arc<dyn Spawner> = match config.executor {
            ExecutorKind::Thread => Arc::new(ThreadSpawner::new(config.thread_name.clone())),
            ExecutorKind::Pool => {
                Arc::new(WorkerPool::new(config.pool_workers, &config.thread_name)?)
            }
            ExecutorKind::Tokio => tokio_spawner()?,
        };
        Ok(Self::new(engine, spawner))
    }

    pub fn engine(&self) -> &HashEngine {
        &self.engine
    }

    pub fn spawner_name(&self) -> &'static str {
        self.spawner.name()
    }

    pub fn queue(&self) -> &ResultQueue {
        &self.queue
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    pub(crate) fn stats_handle(&self) -> &DispatchStats {
        &self.stats
    }

    /// Take every completed record
    pub fn drain(&self) -> Vec<JobRecord> {
        self.queue.drain_all()
    }

    // ------------------------------------------------------------------------
    // Host-facing Submission
    // ------------------------------------------------------------------------

    /// Queue a hash job; `true` when accepted
    pub fn submit_hash(&self, caller_index: i32, caller_id: i32, secret: &[u8], cost: u16) -> bool {
        let result = self.try_submit_hash(CallerTag::new(caller_index, caller_id), secret, cost);
        accepted("submit_hash", result)
    }

    /// Queue a verify job; `true` when accepted
    pub fn submit_verify(
        &self,
        caller_index: i32,
        caller_id: i32,
        secret: &[u8],
        reference_hash: &[u8],
    ) -> bool {
        let result = self.try_submit_verify(
            CallerTag::new(caller_index, caller_id),
            secret,
            reference_hash,
        );
        accepted("submit_verify", result)
    }

    // ------------------------------------------------------------------------
    // Fallible Submission
    // ------------------------------------------------------------------------

    /// Validate `cost` and queue a hash job
    pub fn try_submit_hash<C: Into<i64>>(&self, tag: CallerTag, secret: &[u8], cost: C) -> Result<()> {
        let cost = Cost::new(cost).inspect_err(|_| self.stats.record_rejected())?;
        self.submit(JobRequest::Hash {
            tag,
            secret: secret.to_vec(),
            cost,
        })
    }

    /// Queue a verify job; any byte strings are accepted, including empty ones
    pub fn try_submit_verify(&self, tag: CallerTag, secret: &[u8], reference_hash: &[u8]) -> Result<()> {
        self.submit(JobRequest::Verify {
            tag,
            secret: secret.to_vec(),
            reference_hash: reference_hash.to_vec(),
        })
    }

    /// Start an execution unit for an already validated request
    pub fn submit(&self, request: JobRequest) -> Result<()> {
        let tag = request.tag();
        let kind = request.kind();
        self.stats.record_submitted();

        let engine = self.engine;
        let queue = Arc::clone(&self.queue);
        let stats = Arc::clone(&self.stats);
        let unit = Box::new(move || {
            let record = request.execute(&engine);
            // Counted before it becomes drainable.
            stats.record_completed();
            queue.append(record);
            debug!("{} job {} completed", kind, tag);
        });

        if let Err(e) = self.spawner.spawn(unit) {
            self.stats.record_spawn_failure();
            error!(
                "Dropping {} job {}: {} executor could not start it: {}",
                kind,
                tag,
                self.spawner.name(),
                e
            );
            return Err(DispatchError::Spawn(e));
        }

        debug!("{} job {} dispatched", kind, tag);
        Ok(())
    }
}

/// Map a submission result onto the host's accepted flag.
///
/// Validation errors are logged and refused. A spawn failure was already
/// logged by `submit`; the request is lost but the caller is not told, as
/// it has no way to tell a dropped job from a slow one anyway.
pub(crate) fn accepted(caller: &str, result: Result<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(DispatchError::Spawn(_)) => true,
        Err(e) => {
            error!("bcrypt error: {} (Called from {})", e, caller);
            false
        }
    }
}

#[cfg(feature = "tokio")]
fn tokio_spawner() -> Result<Arc<dyn Spawner>> {
    let spawner = crate::spawner::TokioSpawner::current()
        .map_err(|_| DispatchError::config_error("tokio executor requires a running runtime"))?;
    Ok(Arc::new(spawner))
}

#[cfg(not(feature = "tokio"))]
fn tokio_spawner() -> Result<Arc<dyn Spawner>> {
    Err(DispatchError::config_error(
        "tokio executor requires the `tokio` feature",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::HashInfo;
    use crate::job::JobKind;
    use crate::spawner::{InlineSpawner, Job};
    use std::io;
    use std::thread;
    use std::time::{Duration, Instant};

    struct FailingSpawner;

    impl Spawner for FailingSpawner {
        fn spawn(&self, _job: Job) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::WouldBlock, "out of threads"))
        }

        fn name(&self) -> &'static str {
            "failing"
        }
    }

    fn inline_dispatcher() -> Dispatcher {
        Dispatcher::new(HashEngine::default(), Arc::new(InlineSpawner))
    }

    fn wait_for(dispatcher: &Dispatcher, count: usize) -> Vec<JobRecord> {
        let deadline = Instant::now() + Duration::from_secs(30);
        let mut records = Vec::new();
        while records.len() < count && Instant::now() < deadline {
            records.extend(dispatcher.drain());
            thread::sleep(Duration::from_millis(5));
        }
        records
    }

    #[test]
    fn test_hash_submission_example() {
        let dispatcher = inline_dispatcher();
        assert!(dispatcher.submit_hash(1, 42, b"correcthorse", 10));

        let records = dispatcher.drain();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.kind(), JobKind::Hash);
        assert_eq!(record.tag, CallerTag::new(1, 42));

        let info = HashInfo::parse(record.hash_output().unwrap()).unwrap();
        assert_eq!(info.cost.get(), 10);
        assert!(dispatcher
            .engine()
            .verify(b"correcthorse", record.hash_output().unwrap().as_bytes()));
    }

    #[test]
    fn test_out_of_range_cost_is_rejected_without_record() {
        let dispatcher = inline_dispatcher();
        for cost in [0u16, 1, 3, 32, 100, u16::MAX] {
            assert!(!dispatcher.submit_hash(0, 0, b"pw", cost));
        }
        assert!(dispatcher.drain().is_empty());

        let stats = dispatcher.stats();
        assert_eq!(stats.rejected, 6);
        assert_eq!(stats.submitted, 0);
    }

    #[test]
    fn test_verify_submission_round_trip() {
        let dispatcher = inline_dispatcher();
        let hash = dispatcher
            .engine()
            .hash(b"pw", Cost::new(4u32).unwrap())
            .unwrap();

        assert!(dispatcher.submit_verify(3, 4, b"pw", hash.as_bytes()));
        assert!(dispatcher.submit_verify(5, 6, b"other", hash.as_bytes()));
        assert!(dispatcher.submit_verify(7, 8, b"pw", b"not a hash"));

        let records = dispatcher.drain();
        let results: Vec<(i32, Option<bool>)> =
            records.iter().map(|r| (r.tag.index, r.matched())).collect();
        assert_eq!(
            results,
            vec![(3, Some(true)), (5, Some(false)), (7, Some(false))]
        );
    }

    #[test]
    fn test_spawn_failure_drops_request() {
        let dispatcher = Dispatcher::new(HashEngine::default(), Arc::new(FailingSpawner));

        let err = dispatcher
            .try_submit_hash(CallerTag::new(0, 0), b"pw", 4u32)
            .unwrap_err();
        assert!(matches!(err, DispatchError::Spawn(_)));

        // The boolean surface cannot distinguish a dropped job from a pending one
        assert!(dispatcher.submit_verify(0, 0, b"pw", b""));
        assert!(dispatcher.drain().is_empty());

        let stats = dispatcher.stats();
        assert_eq!(stats.spawn_failures, 2);
        assert_eq!(stats.in_flight(), 0);
    }

    #[test]
    fn test_thread_per_job_completes_every_request() {
        let dispatcher = Dispatcher::new(
            HashEngine::default(),
            Arc::new(ThreadSpawner::new("dispatch-test")),
        );
        for n in 0..16 {
            assert!(dispatcher.submit_hash(n, n * 10, b"pw", 4));
        }

        let records = wait_for(&dispatcher, 16);
        assert_eq!(records.len(), 16);
        let mut tags: Vec<CallerTag> = records.iter().map(|r| r.tag).collect();
        tags.sort_by_key(|t| t.index);
        assert_eq!(
            tags,
            (0..16).map(|n| CallerTag::new(n, n * 10)).collect::<Vec<_>>()
        );
        assert_eq!(dispatcher.stats().completed, 16);
    }

    #[test]
    fn test_duplicate_tags_are_not_deduplicated() {
        let dispatcher = inline_dispatcher();
        assert!(dispatcher.submit_verify(1, 1, b"a", b""));
        assert!(dispatcher.submit_verify(1, 1, b"a", b""));
        assert_eq!(dispatcher.drain().len(), 2);
    }

    #[test]
    fn test_from_config_builds_pool() {
        let dispatcher = Dispatcher::from_config(&DispatcherConfig::testing()).unwrap();
        assert_eq!(dispatcher.spawner_name(), "pool");

        assert!(dispatcher.submit_hash(9, 9, b"pw", 4));
        let records = wait_for(&dispatcher, 1);
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_from_config_rejects_invalid_config() {
        let config = DispatcherConfig::default()
            .with_executor(ExecutorKind::Pool)
            .with_pool_workers(0);
        assert!(matches!(
            Dispatcher::from_config(&config),
            Err(DispatchError::Configuration { .. })
        ));
    }

    #[test]
    fn test_completion_is_counted_before_record_is_visible() {
        let dispatcher = Dispatcher::new(
            HashEngine::default(),
            Arc::new(ThreadSpawner::new("ordering-test")),
        );
        let deadline = Instant::now() + Duration::from_secs(30);
        let mut drained = 0u64;
        for n in 0..64 {
            assert!(dispatcher.submit_verify(n, n, b"pw", b""));
        }
        while drained < 64 && Instant::now() < deadline {
            drained += dispatcher.drain().len() as u64;
            assert!(dispatcher.stats().completed >= drained);
        }
        assert_eq!(drained, 64);
    }

    #[cfg(feature = "tokio")]
    #[test]
    fn test_shut_down_tokio_runtime_counts_as_spawn_failure() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .build()
            .unwrap();
        let spawner = crate::spawner::TokioSpawner::new(runtime.handle().clone());
        drop(runtime);

        let dispatcher = Dispatcher::new(HashEngine::default(), Arc::new(spawner));
        let err = dispatcher
            .try_submit_verify(CallerTag::new(1, 1), b"pw", b"")
            .unwrap_err();
        assert!(matches!(err, DispatchError::Spawn(_)));
        assert!(dispatcher.drain().is_empty());

        let stats = dispatcher.stats();
        assert_eq!(stats.spawn_failures, 1);
        assert_eq!(stats.in_flight(), 0);
    }

    #[cfg(feature = "tokio")]
    #[test]
    fn test_tokio_executor_outside_runtime_is_config_error() {
        let config = DispatcherConfig::default().with_executor(ExecutorKind::Tokio);
        assert!(matches!(
            Dispatcher::from_config(&config),
            Err(DispatchError::Configuration { .. })
        ));
    }
}
