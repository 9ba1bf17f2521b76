//! Task wrapper that combines futures with waker integration.
//!
//! A task encapsulates a future and provides mechanisms for polling and awakening
//! when the future is ready to make progress. Top-level tasks are registered and
//! started by the runtime; additional tasks can be spawned from within an async
//! context via [`Task::spawn`] without an explicit runtime reference.
//!
//! # Task Spawning
//!
//! Tasks are spawned using [`Task::spawn`] from within an async context:
//!
//! ```ignore
//! use spool::Task;
//!
//! async fn spawn_example() {
//!     Task::spawn(async {
//!         println!("Running in background");
//!     });
//!     println!("Task spawned, main continues");
//! }
//! ```
//!
//! # Join Handles
//!
//! [`Task::spawn`] returns a [`JoinHandle`] that can be awaited to wait for
//! completion and obtain the task's output:
//!
//! ```ignore
//! use spool::Task;
//!
//! async fn wait_example() {
//!     let handle = Task::spawn(async { 42 });
//!     let result = handle.await;
//!     println!("Task produced {result}");
//! }
//! ```
//!
//! # How Tasks Work
//!
//! 1. A future is wrapped in a [`Task`]
//! 2. The task is enqueued in the runtime's ready queue
//! 3. The driving loop polls the task with a waker that re-queues it
//! 4. When the future yields `Poll::Pending`, it is stored for later
//! 5. When a blocking job finishes on a pool thread, the waker re-queues the task
//! 6. The task is polled again and can make progress
//!
//! Every poll happens on the driving thread; only the wake-up that makes a task
//! ready again may come from another thread.

use crate::runtime::{ReadyQueue, current_handle};
use crate::utils::slab::Key;

use futures::task::ArcWake;
use parking_lot::Mutex;

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll, Waker};

/// A suspendable unit of computation producing a value of type `T`.
///
/// Contains a boxed future, a slot for the produced value, and the waker of
/// the task awaiting this one (the parent), if any. Tasks are created via
/// [`Task::spawn`] or by the runtime when a top-level future is submitted,
/// and should not be constructed directly in user code.
///
/// # Internals
///
/// - `future`: The wrapped future, present while the computation is incomplete
/// - `result`: Stores the output value once the task completes
/// - `completed`: Flag flipped exactly once when the future finishes
/// - `parent`: Waker of the single awaiting consumer, woken on completion
/// - `queue`: Ready queue used to re-schedule this task when it is awakened
/// - `registration`: Registry key, set only for top-level tasks
pub struct Task<T> {
    future: Mutex<Option<Pin<Box<dyn Future<Output = T>>>>>,
    result: Mutex<Option<T>>,
    completed: AtomicBool,
    parent: Mutex<Option<Waker>>,
    queue: Arc<ReadyQueue>,
    registration: Mutex<Option<Key>>,
}

// Task can be shared across threads even though the wrapped future is not
// required to be Send: the future is only ever polled on the driving thread,
// and every slot that does cross threads (result, parent waker, completion
// flag, registration key) sits behind a lock or an atomic.
unsafe impl<T> Send for Task<T> {}
unsafe impl<T> Sync for Task<T> {}

impl<T: 'static> Task<T> {
    /// Creates a new task wrapping the given future.
    ///
    /// # Arguments
    /// * `fut` - The future to wrap as a task
    /// * `queue` - The ready queue used for re-scheduling this task
    ///
    /// # Returns
    /// An Arc-wrapped Task ready for queueing or polling
    pub(crate) fn new<F>(fut: F, queue: Arc<ReadyQueue>) -> Arc<Self>
    where
        F: Future<Output = T> + 'static,
    {
        Arc::new(Task {
            future: Mutex::new(Some(Box::pin(fut))),
            result: Mutex::new(None),
            completed: AtomicBool::new(false),
            parent: Mutex::new(None),
            queue,
            registration: Mutex::new(None),
        })
    }

    /// Polls the task's future once.
    ///
    /// Attempts to make progress on the wrapped future. If the future returns
    /// [`Poll::Pending`], it is stored back for later polling. If it returns
    /// [`Poll::Ready`], the task is complete and the awaiting parent, if any,
    /// is woken. Polling an already-completed task is a no-op.
    ///
    /// [`Poll::Pending`]: std::task::Poll::Pending
    /// [`Poll::Ready`]: std::task::Poll::Ready
    pub(crate) fn poll(self: &Arc<Self>) {
        let waker = futures::task::waker(self.clone());
        let mut context = Context::from_waker(&waker);

        let mut future_slot = self.future.lock();

        if let Some(mut future) = future_slot.take() {
            match future.as_mut().poll(&mut context) {
                Poll::Pending => {
                    *future_slot = Some(future);
                }
                Poll::Ready(val) => {
                    *self.result.lock() = Some(val);
                    self.completed.store(true, Ordering::Release);

                    if let Some(parent) = self.parent.lock().take() {
                        parent.wake();
                    }
                }
            }
        }
    }

    /// Spawns a task on the current runtime context and returns a [`JoinHandle`].
    ///
    /// The new task runs concurrently with the current one on the same driving
    /// loop. The returned [`JoinHandle`] can be awaited to wait for the spawned
    /// task to complete and obtain its output; dropping the handle detaches the
    /// task, which still runs to completion.
    ///
    /// # Requirements
    /// Must be called from within a runtime context, i.e. inside a future
    /// submitted to [`Runtime::spawn`] or inside another task spawned by this
    /// function.
    ///
    /// # Panics
    /// Panics if called outside of a runtime context.
    ///
    /// [`Runtime::spawn`]: crate::Runtime::spawn
    pub fn spawn<F>(future: F) -> JoinHandle<T>
    where
        F: Future<Output = T> + 'static,
    {
        let handle =
            current_handle().expect("Task::spawn() called outside of a runtime context");

        let task: Arc<Task<T>> = Task::new(future, handle.queue().clone());
        let runnable: Arc<dyn Runnable> = task.clone();

        handle.queue().post(runnable);

        JoinHandle { task }
    }

    pub(crate) fn set_registration(&self, key: Key) {
        *self.registration.lock() = Some(key);
    }
}

impl<T: 'static> ArcWake for Task<T> {
    /// Wakes the task by re-queueing it on the ready queue.
    ///
    /// A completed task is never re-queued.
    fn wake_by_ref(arc_self: &Arc<Self>) {
        if !arc_self.completed.load(Ordering::Acquire) {
            arc_self.queue.post(arc_self.clone());
        }
    }
}

/// Trait for objects that can be polled as tasks by the driving loop.
///
/// This trait is used internally to allow heterogeneous task types to be
/// stored in the ready queue and the task registry.
pub(crate) trait Runnable: Send + Sync {
    /// Polls the task for progress.
    fn poll(self: Arc<Self>);

    /// Whether the underlying future has finished.
    fn is_complete(&self) -> bool;

    /// Registry key of this task, if it was submitted as a top-level task.
    fn registration(&self) -> Option<Key>;
}

impl<T: 'static> Runnable for Task<T> {
    /// Polls the generic task by delegating to [`Task::poll`].
    fn poll(self: Arc<Self>) {
        Task::poll(&self);
    }

    fn is_complete(&self) -> bool {
        self.completed.load(Ordering::Acquire)
    }

    fn registration(&self) -> Option<Key> {
        *self.registration.lock()
    }
}

/// A future that resolves when the associated task completes, returning the
/// output value.
///
/// This is the return value of [`Task::spawn`]. Awaiting a handle whose task
/// already finished completes immediately; otherwise the awaiting task is
/// registered as the parent continuation and woken when the task completes.
pub struct JoinHandle<T> {
    task: Arc<Task<T>>,
}

impl<T> Future for JoinHandle<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.task.completed.load(Ordering::Acquire) {
            let result = self
                .task
                .result
                .lock()
                .take()
                .expect("task completed but result missing");

            return Poll::Ready(result);
        }

        *self.task.parent.lock() = Some(cx.waker().clone());

        Poll::Pending
    }
}

/// A helper to collect multiple [`JoinHandle`]s and await all of them at once.
///
/// # Example
/// ```ignore
/// let mut set = JoinSet::new();
///
/// for i in 0..5 {
///     set.push(Task::spawn(async move { i }));
/// }
///
/// set.await_all().await;
/// ```
pub struct JoinSet<T> {
    handles: Vec<JoinHandle<T>>,
}

impl<T> JoinSet<T> {
    /// Creates a new empty JoinSet.
    pub fn new() -> Self {
        Self {
            handles: Vec::new(),
        }
    }

    /// Adds a [`JoinHandle`] to the set.
    pub fn push(&mut self, handle: JoinHandle<T>) {
        self.handles.push(handle);
    }

    /// Awaits all handles until completion, draining progressively.
    pub async fn await_all(&mut self) {
        for handle in self.handles.drain(..) {
            handle.await;
        }
    }
}

impl<T> Default for JoinSet<T> {
    fn default() -> Self {
        Self::new()
    }
}
