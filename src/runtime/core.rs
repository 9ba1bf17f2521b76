//! Runtime that registers top-level tasks and drives them to quiescence.
//!
//! The runtime composes the ready queue, the blocking worker pool, and a
//! registry of top-level tasks. Submitting a task starts it inline on the
//! submitting thread; `run` then multiplexes every suspended task on one
//! driving loop until no task is alive and no blocking job is in flight.

use crate::error::Error;
use crate::pool::{Job, WorkerPool};
use crate::runtime::context::enter_context;
use crate::runtime::liveness::LivenessToken;
use crate::runtime::queue::ReadyQueue;
use crate::task::{Runnable, Task};
use crate::utils::slab::{Key, Slab};

use parking_lot::Mutex;

use std::future::Future;
use std::sync::Arc;

/// Registry entry for one top-level task.
///
/// The entry owns the task and a liveness token; dropping the entry releases
/// one unit of active work and wakes the driving loop.
struct RegistryEntry {
    task: Arc<dyn Runnable>,
    _token: LivenessToken,
}

pub(crate) struct Shared {
    queue: Arc<ReadyQueue>,
    pool: WorkerPool,
    registry: Mutex<Slab<RegistryEntry>>,
}

/// Orchestrator for cooperative tasks with offloaded blocking work.
///
/// Top-level futures are submitted with [`Runtime::spawn`] and driven to
/// completion by [`Runtime::run`]. All task bodies execute on the thread that
/// calls `run`; only blocking jobs run in parallel, on the worker pool.
///
/// # Example
/// ```ignore
/// let mut rt = Runtime::new();
///
/// rt.spawn(async {
///     println!("counting lines somewhere");
///     Ok(())
/// });
///
/// rt.run();
/// ```
pub struct Runtime {
    shared: Arc<Shared>,
}

impl Runtime {
    /// Creates a runtime with one worker thread per unit of available
    /// parallelism.
    pub fn new() -> Self {
        Self::with_worker_threads(0)
    }

    /// Creates a runtime whose pool has `worker_threads` threads
    /// (zero selects the host's available parallelism).
    pub(crate) fn with_worker_threads(worker_threads: usize) -> Self {
        Self {
            shared: Arc::new(Shared {
                queue: Arc::new(ReadyQueue::new()),
                pool: WorkerPool::new(worker_threads),
                registry: Mutex::new(Slab::new()),
            }),
        }
    }

    /// Returns a cheap cloneable handle to this runtime.
    ///
    /// Handles are what blocking bridges hold on to: they give access to
    /// liveness tokens and to blocking-job submission without borrowing the
    /// runtime itself.
    pub fn handle(&self) -> Handle {
        Handle {
            shared: self.shared.clone(),
        }
    }

    /// Submits a top-level task and starts it inline on the calling thread.
    ///
    /// The task is registered with a fresh liveness token and polled once
    /// immediately. If it completes without ever suspending, its registry
    /// entry is removed before `spawn` returns; otherwise the driving loop
    /// removes it once it observes completion.
    ///
    /// A failing top-level task has no awaiting consumer, so its error is
    /// reported through the log rather than silently discarded.
    ///
    /// Submit all top-level work before calling [`Runtime::run`], or spawn
    /// from within already-running tasks.
    pub fn spawn<F>(&self, future: F)
    where
        F: Future<Output = Result<(), Error>> + 'static,
    {
        let observed = async move {
            if let Err(error) = future.await {
                log::warn!("top-level task failed: {error}");
            }
        };

        let task = Task::new(observed, self.shared.queue.clone());

        let id = {
            let token = LivenessToken::new(self.shared.queue.clone());
            let runnable: Arc<dyn Runnable> = task.clone();

            self.shared.registry.lock().insert(RegistryEntry {
                task: runnable,
                _token: token,
            })
        };

        task.set_registration(id);
        log::debug!("registered top-level task {id:?}");

        enter_context(self.handle(), || Task::poll(&task));

        if task.is_complete() {
            self.shared.finish(id);
        }
    }

    /// Drives all submitted tasks to completion, then returns.
    ///
    /// Repeatedly pops the next ready task and resumes it; blocks when nothing
    /// is ready but tasks are still alive or blocking jobs are still in
    /// flight. Returns exactly once, when no task remains alive and nothing is
    /// pending; late resumptions cannot arrive after that point.
    ///
    /// Task bodies never run concurrently with each other: this loop is the
    /// only place they execute.
    pub fn run(&mut self) {
        log::debug!(
            "driving {} top-level task(s) with {} pool worker(s)",
            self.shared.registry.lock().len(),
            self.shared.pool.worker_count(),
        );

        enter_context(self.handle(), || {
            while let Some(runnable) = self.shared.queue.next() {
                runnable.clone().poll();

                if runnable.is_complete()
                    && let Some(id) = runnable.registration()
                {
                    self.shared.finish(id);
                }
            }
        });

        log::debug!("runtime quiescent");
    }
}

impl Default for Runtime {
    fn default() -> Self {
        Self::new()
    }
}

impl Shared {
    /// Removes a completed top-level task from the registry.
    ///
    /// The entry's liveness token is dropped outside the registry lock, which
    /// releases one unit of active work and wakes the driving loop.
    fn finish(&self, id: Key) {
        let entry = self.registry.lock().remove(id);
        drop(entry);
    }
}

/// Cheap cloneable reference to a runtime.
///
/// Obtained from [`Runtime::handle`]. Bridges that offload blocking work hold
/// a handle to acquire liveness tokens and submit pool jobs while the task
/// they belong to is suspended.
#[derive(Clone)]
pub struct Handle {
    shared: Arc<Shared>,
}

impl Handle {
    /// Acquires a token pinning the runtime open for one unit of in-flight
    /// blocking work.
    ///
    /// The token must live until the dispatched work has posted its
    /// resumption; transfer it into the blocking job and drop it after the
    /// waiting task has been woken.
    pub fn liveness_token(&self) -> LivenessToken {
        LivenessToken::new(self.shared.queue.clone())
    }

    /// Enqueues a blocking job on the worker pool.
    pub(crate) fn submit_blocking(&self, job: Job) {
        self.shared.pool.submit(job);
    }

    pub(crate) fn queue(&self) -> &Arc<ReadyQueue> {
        &self.shared.queue
    }
}
