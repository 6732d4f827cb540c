//! Execution unit spawning
//!
//! The dispatcher hands every accepted job to a `Spawner` and forgets about
//! it. None of the implementations here apply backpressure: a job that was
//! spawned successfully always runs eventually.

use std::io;
#[cfg(feature = "tokio")]
use std::panic::{self, AssertUnwindSafe};
#[cfg(feature = "tokio")]
use std::sync::atomic::AtomicBool;
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(feature = "tokio")]
use std::sync::Arc;
use std::thread;

use crossbeam::channel::{self, Receiver, Sender};
use tracing::{debug, error};

/// Unit of work handed to a spawner
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Starts execution units without tracking them afterwards
pub trait Spawner: Send + Sync {
    /// Start `job` on its own unit of execution.
    ///
    /// An `Err` means the job was not started and never will be.
    fn spawn(&self, job: Job) -> io::Result<()>;

    /// Short name used in logs
    fn name(&self) -> &'static str;
}

// ----------------------------------------------------------------------------
// Thread Per Job
// ----------------------------------------------------------------------------

/// One detached OS thread per job, with no upper bound
#[derive(Debug)]
pub struct ThreadSpawner {
    thread_name: String,
    next_id: AtomicU64,
}

impl ThreadSpawner {
    pub fn new<T: Into<String>>(thread_name: T) -> Self {
        Self {
            thread_name: thread_name.into(),
            next_id: AtomicU64::new(0),
        }
    }
}

impl Spawner for ThreadSpawner {
    fn spawn(&self, job: Job) -> io::Result<()> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        // Dropping the JoinHandle detaches the thread.
        thread::Builder::new()
            .name(format!("{}-{}", self.thread_name, id))
            .spawn(job)
            .map(drop)
    }

    fn name(&self) -> &'static str {
        "thread"
    }
}

// ----------------------------------------------------------------------------
// Worker Pool
// ----------------------------------------------------------------------------

/// Fixed set of worker threads fed by an unbounded channel.
///
/// Parallelism is capped at `workers`, queue depth is not. Workers exit once
/// every sender (i.e. the pool) has been dropped and the backlog is empty.
#[derive(Debug)]
pub struct WorkerPool {
    sender: Sender<Job>,
    workers: usize,
}

impl WorkerPool {
    pub fn new(workers: usize, thread_name: &str) -> io::Result<Self> {
        if workers == 0 {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "worker pool needs at least one worker",
            ));
        }

        let (sender, receiver) = channel::unbounded::<Job>();
        for id in 0..workers {
            let receiver = receiver.clone();
            thread::Builder::new()
                .name(format!("{}-pool-{}", thread_name, id))
                .spawn(move || run_worker(id, receiver))?;
        }
        debug!("Started worker pool with {} workers", workers);

        Ok(Self { sender, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }
}

fn run_worker(id: usize, receiver: Receiver<Job>) {
    while let Ok(job) = receiver.recv() {
        job();
    }
    debug!("Pool worker {} exiting", id);
}

impl Spawner for WorkerPool {
    fn spawn(&self, job: Job) -> io::Result<()> {
        self.sender.send(job).map_err(|_| {
            error!("Worker pool has no live workers");
            io::Error::new(io::ErrorKind::BrokenPipe, "worker pool shut down")
        })
    }

    fn name(&self) -> &'static str {
        "pool"
    }
}

// ----------------------------------------------------------------------------
// Tokio Blocking Pool
// ----------------------------------------------------------------------------

/// Runs jobs on a tokio runtime's blocking thread pool
#[cfg(feature = "tokio")]
#[derive(Debug, Clone)]
pub struct TokioSpawner {
    handle: tokio::runtime::Handle,
}

#[cfg(feature = "tokio")]
impl TokioSpawner {
    pub fn new(handle: tokio::runtime::Handle) -> Self {
        Self { handle }
    }

    /// Bind to the runtime of the calling context
    pub fn current() -> io::Result<Self> {
        tokio::runtime::Handle::try_current()
            .map(Self::new)
            .map_err(|e| io::Error::new(io::ErrorKind::NotFound, e))
    }
}

#[cfg(feature = "tokio")]
impl Spawner for TokioSpawner {
    /// A runtime that is shutting down drops new blocking tasks without
    /// running them, and a blocking pool that cannot start a thread panics.
    /// Both are reported as `Err`.
    fn spawn(&self, job: Job) -> io::Result<()> {
        let unit = StartGuard::new(job);
        let lost = Arc::clone(&unit.lost);

        let spawned = panic::catch_unwind(AssertUnwindSafe(|| {
            drop(self.handle.spawn_blocking(move || unit.run()));
        }));
        if spawned.is_err() {
            return Err(io::Error::new(
                io::ErrorKind::Other,
                "tokio blocking pool could not start a thread",
            ));
        }
        if lost.load(Ordering::Acquire) {
            return Err(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "tokio runtime is shut down",
            ));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "tokio"
    }
}

/// Flags the job as lost if it is dropped without having run
#[cfg(feature = "tokio")]
struct StartGuard {
    job: Option<Job>,
    lost: Arc<AtomicBool>,
}

#[cfg(feature = "tokio")]
impl StartGuard {
    fn new(job: Job) -> Self {
        Self {
            job: Some(job),
            lost: Arc::new(AtomicBool::new(false)),
        }
    }

    fn run(mut self) {
        if let Some(job) = self.job.take() {
            job();
        }
    }
}

#[cfg(feature = "tokio")]
impl Drop for StartGuard {
    fn drop(&mut self) {
        if self.job.is_some() {
            self.lost.store(true, Ordering::Release);
        }
    }
}

// ----------------------------------------------------------------------------
// Inline
// ----------------------------------------------------------------------------

/// Runs the job to completion on the submitting thread
#[derive(Debug, Clone, Copy, Default)]
pub struct InlineSpawner;

impl Spawner for InlineSpawner {
    fn spawn(&self, job: Job) -> io::Result<()> {
        job();
        Ok(())
    }

    fn name(&self) -> &'static str {
        "inline"
    }
}
