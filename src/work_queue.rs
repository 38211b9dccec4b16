//! A fixed-size pool of worker threads consuming a FIFO task queue.
//!
//! Every submitted task increments a pending-work counter before it is
//! enqueued, and the counter is decremented only after the task has
//! returned (or failed, or panicked). [`WorkQueue::finish`] blocks until
//! that counter reaches zero, so a task that submits further tasks keeps
//! the queue busy until all of its descendants have run as well.
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! use searchx::work_queue::WorkQueue;
//!
//! let queue = WorkQueue::new(4).unwrap();
//! let counter = Arc::new(AtomicUsize::new(0));
//!
//! for _ in 0..10 {
//!     let counter = Arc::clone(&counter);
//!     queue
//!         .execute_fn("increment", move || {
//!             counter.fetch_add(1, Ordering::SeqCst);
//!             Ok(())
//!         })
//!         .unwrap();
//! }
//!
//! queue.finish();
//! assert_eq!(counter.load(Ordering::SeqCst), 10);
//! queue.join().unwrap();
//! ```

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, warn};
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_THREADS;
use crate::error::{Result, SearchxError};

/// A unit of work executed by exactly one worker thread.
pub trait Task: Send + 'static {
    /// Run the task, consuming it.
    fn run(self: Box<Self>) -> Result<()>;

    /// Short human-readable description used in log messages.
    fn describe(&self) -> String {
        "task".to_string()
    }
}

/// Adapter that lets a closure be submitted as a task.
struct FnTask<F> {
    name: String,
    func: F,
}

impl<F> Task for FnTask<F>
where
    F: FnOnce() -> Result<()> + Send + 'static,
{
    fn run(self: Box<Self>) -> Result<()> {
        (self.func)()
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Count of queued plus in-flight tasks, with a condition signalled on zero.
#[derive(Debug)]
struct PendingWork {
    count: Mutex<usize>,
    idle: Condvar,
}

impl PendingWork {
    fn new() -> Self {
        Self {
            count: Mutex::new(0),
            idle: Condvar::new(),
        }
    }

    fn increment(&self) {
        *self.count.lock() += 1;
    }

    fn decrement(&self) {
        let mut count = self.count.lock();
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.idle.notify_all();
        }
    }

    fn wait_idle(&self) {
        let mut count = self.count.lock();
        while *count > 0 {
            self.idle.wait(&mut count);
        }
    }

    fn get(&self) -> usize {
        *self.count.lock()
    }
}

/// Decrements the pending counter when dropped, whatever the task outcome.
struct PendingGuard<'a>(&'a PendingWork);

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.decrement();
    }
}

/// Task counters maintained by the workers.
#[derive(Debug, Default)]
pub struct WorkQueueMetrics {
    submitted: AtomicU64,
    succeeded: AtomicU64,
    failed: AtomicU64,
}

impl WorkQueueMetrics {
    fn record_submit(&self) {
        self.submitted.fetch_add(1, Ordering::Relaxed);
    }

    fn record_success(&self) {
        self.succeeded.fetch_add(1, Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a point-in-time copy of the counters.
    pub fn snapshot(&self) -> WorkQueueStats {
        WorkQueueStats {
            submitted: self.submitted.load(Ordering::Relaxed),
            succeeded: self.succeeded.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of [`WorkQueueMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkQueueStats {
    /// Tasks accepted by `execute`.
    pub submitted: u64,

    /// Tasks that returned `Ok`.
    pub succeeded: u64,

    /// Tasks that returned `Err` or panicked.
    pub failed: u64,
}

impl WorkQueueStats {
    /// Tasks that have finished, successfully or not.
    pub fn completed(&self) -> u64 {
        self.succeeded + self.failed
    }
}

/// A pool of long-lived worker threads fed from an unbounded FIFO queue.
pub struct WorkQueue {
    /// Task sender; `None` once the queue has been shut down.
    sender: Mutex<Option<Sender<Box<dyn Task>>>>,

    /// Worker handles; `None` once the queue has been joined.
    workers: Mutex<Option<Vec<JoinHandle<()>>>>,

    pending: Arc<PendingWork>,

    metrics: Arc<WorkQueueMetrics>,

    size: usize,
}

impl WorkQueue {
    /// Number of worker threads used when none is configured.
    pub const DEFAULT_THREADS: usize = DEFAULT_THREADS;

    /// Start a work queue with the given number of worker threads.
    pub fn new(threads: usize) -> Result<Self> {
        if threads == 0 {
            return Err(SearchxError::invalid_argument(
                "work queue needs at least one worker thread",
            ));
        }

        let (sender, receiver) = unbounded::<Box<dyn Task>>();
        let pending = Arc::new(PendingWork::new());
        let metrics = Arc::new(WorkQueueMetrics::default());

        let mut workers = Vec::with_capacity(threads);
        for worker_id in 0..threads {
            workers.push(Self::spawn_worker(
                worker_id,
                receiver.clone(),
                Arc::clone(&pending),
                Arc::clone(&metrics),
            )?);
        }

        debug!("Work queue initialized with {threads} worker threads");

        Ok(Self {
            sender: Mutex::new(Some(sender)),
            workers: Mutex::new(Some(workers)),
            pending,
            metrics,
            size: threads,
        })
    }

    /// Start a work queue with [`WorkQueue::DEFAULT_THREADS`] workers.
    pub fn with_default_threads() -> Result<Self> {
        Self::new(Self::DEFAULT_THREADS)
    }

    /// Enqueue a task. Never blocks; fails if the queue has been shut down.
    pub fn execute<T: Task>(&self, task: T) -> Result<()> {
        self.execute_boxed(Box::new(task))
    }

    /// Enqueue an already boxed task.
    pub fn execute_boxed(&self, task: Box<dyn Task>) -> Result<()> {
        let sender = self.sender.lock();
        let Some(sender) = sender.as_ref() else {
            return Err(SearchxError::pool(format!(
                "cannot execute {} after shutdown",
                task.describe()
            )));
        };

        // The count must be visible before any worker can pick the task up.
        self.pending.increment();
        if sender.send(task).is_err() {
            self.pending.decrement();
            return Err(SearchxError::pool("all worker threads have exited"));
        }
        self.metrics.record_submit();

        Ok(())
    }

    /// Enqueue a closure as a named task.
    pub fn execute_fn<F>(&self, name: impl Into<String>, func: F) -> Result<()>
    where
        F: FnOnce() -> Result<()> + Send + 'static,
    {
        self.execute(FnTask {
            name: name.into(),
            func,
        })
    }

    /// Block until every submitted task, including tasks submitted by other
    /// tasks, has finished. The queue stays usable afterwards.
    ///
    /// Must not be called from inside a task running on this queue.
    pub fn finish(&self) {
        self.pending.wait_idle();
    }

    /// Stop accepting tasks. Workers drain what is already queued and exit;
    /// running tasks are not interrupted.
    pub fn shutdown(&self) {
        if self.sender.lock().take().is_some() {
            debug!("Work queue triggering shutdown");
        }
    }

    /// Wait for all work, shut down and wait for every worker to exit.
    /// The queue cannot be reused afterwards and a second call fails.
    pub fn join(&self) -> Result<()> {
        let handles = self
            .workers
            .lock()
            .take()
            .ok_or_else(|| SearchxError::pool("work queue has already been joined"))?;

        self.finish();
        self.shutdown();

        let mut failures = 0;
        for handle in handles {
            if handle.join().is_err() {
                failures += 1;
            }
        }

        if failures > 0 {
            return Err(SearchxError::ThreadJoin(format!(
                "{failures} worker threads terminated abnormally"
            )));
        }

        debug!("All worker threads terminated");
        Ok(())
    }

    /// Number of worker threads.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of queued plus running tasks.
    pub fn pending(&self) -> usize {
        self.pending.get()
    }

    /// Whether `shutdown` has been called.
    pub fn is_shutdown(&self) -> bool {
        self.sender.lock().is_none()
    }

    /// Current task counters.
    pub fn metrics(&self) -> WorkQueueStats {
        self.metrics.snapshot()
    }

    fn spawn_worker(
        worker_id: usize,
        receiver: Receiver<Box<dyn Task>>,
        pending: Arc<PendingWork>,
        metrics: Arc<WorkQueueMetrics>,
    ) -> Result<JoinHandle<()>> {
        let handle = thread::Builder::new()
            .name(format!("searchx-worker-{worker_id}"))
            .spawn(move || {
                // recv fails only once the sender is gone and the queue is empty
                while let Ok(task) = receiver.recv() {
                    let _guard = PendingGuard(&pending);
                    let description = task.describe();

                    match panic::catch_unwind(AssertUnwindSafe(|| task.run())) {
                        Ok(Ok(())) => metrics.record_success(),
                        Ok(Err(e)) => {
                            warn!("Work queue task {description} failed: {e}");
                            metrics.record_failure();
                        }
                        Err(payload) => {
                            warn!(
                                "Work queue task {description} panicked: {}",
                                panic_message(payload.as_ref())
                            );
                            metrics.record_failure();
                        }
                    }
                }
                debug!("Work queue worker {worker_id} shutting down");
            })?;

        Ok(handle)
    }
}

impl std::fmt::Debug for WorkQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkQueue")
            .field("size", &self.size)
            .field("pending", &self.pending())
            .field("shutdown", &self.is_shutdown())
            .finish()
    }
}

impl Drop for WorkQueue {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
