//! Fixed-size thread pool for blocking jobs.
//!
//! Worker threads drain a FIFO queue of single-shot jobs. The pool exists so
//! that blocking operations never run on the thread driving the task loop;
//! a job performs its blocking work, deposits the outcome wherever its
//! submitter arranged, and wakes the waiting task.
//!
//! Jobs are expected to capture their own failures into shared state rather
//! than panic: a panicking job takes its worker thread down with it.

use parking_lot::{Condvar, Mutex};

use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

/// A single-invocation unit of blocking work.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Fixed set of worker threads executing queued blocking jobs in FIFO order.
///
/// Jobs run concurrently with respect to each other and with respect to the
/// driving thread. Nothing orders job completions beyond queue-pop order.
pub(crate) struct WorkerPool {
    state: Arc<PoolState>,
    workers: Vec<thread::JoinHandle<()>>,
}

struct PoolState {
    inner: Mutex<PoolInner>,
    not_empty: Condvar,
}

struct PoolInner {
    jobs: VecDeque<Job>,
    shutting_down: bool,
}

impl WorkerPool {
    /// Creates a pool with `worker_count` threads.
    ///
    /// A count of zero selects the host's available parallelism, with a
    /// minimum of one thread.
    pub(crate) fn new(worker_count: usize) -> Self {
        let count = if worker_count == 0 {
            num_cpus::get()
        } else {
            worker_count
        }
        .max(1);

        let state = Arc::new(PoolState {
            inner: Mutex::new(PoolInner {
                jobs: VecDeque::new(),
                shutting_down: false,
            }),
            not_empty: Condvar::new(),
        });

        log::debug!("starting {count} pool worker(s)");

        let workers = (0..count)
            .map(|id| {
                let state = state.clone();

                thread::Builder::new()
                    .name(format!("spool-worker-{id}"))
                    .spawn(move || worker_loop(&state))
                    .expect("failed to spawn pool worker thread")
            })
            .collect();

        Self { state, workers }
    }

    /// Enqueues a job and wakes one worker.
    pub(crate) fn submit(&self, job: Job) {
        {
            let mut inner = self.state.inner.lock();
            inner.jobs.push_back(job);
        }

        self.state.not_empty.notify_one();
    }

    pub(crate) fn worker_count(&self) -> usize {
        self.workers.len()
    }
}

fn worker_loop(state: &PoolState) {
    loop {
        let job = {
            let mut inner = state.inner.lock();

            state
                .not_empty
                .wait_while(&mut inner, |inner| {
                    inner.jobs.is_empty() && !inner.shutting_down
                });

            match inner.jobs.pop_front() {
                Some(job) => job,
                // Shutting down and the queue has been drained.
                None => return,
            }
        };

        job();
    }
}

impl Drop for WorkerPool {
    /// Graceful shutdown: already-queued jobs are drained before the workers
    /// exit, then all threads are joined.
    fn drop(&mut self) {
        {
            let mut inner = self.state.inner.lock();
            inner.shutting_down = true;
        }

        self.state.not_empty.notify_all();

        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}
