//! Thread-safe ready queue and active-work latch.
//!
//! The queue holds tasks whose next resumption is due, in FIFO order across
//! all posting threads. The same structure carries the count of in-flight
//! units of work (registered top-level tasks plus dispatched blocking jobs),
//! so the driving loop's wait predicate ("something is ready, or nothing
//! will ever be again") is evaluated under one lock with no missed wakeups.

use crate::task::Runnable;

use parking_lot::{Condvar, Mutex};

use std::collections::VecDeque;
use std::sync::Arc;

/// FIFO queue of resumable tasks plus the active-work counter.
///
/// Pushed from any thread, popped only by the driving loop. Posting wakes one
/// waiter; releasing a unit of active work wakes all waiters so the loop can
/// re-evaluate whether it is done.
pub(crate) struct ReadyQueue {
    inner: Mutex<Inner>,
    ready_or_idle: Condvar,
}

struct Inner {
    ready: VecDeque<Arc<dyn Runnable>>,
    active: usize,
}

impl ReadyQueue {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                ready: VecDeque::new(),
                active: 0,
            }),
            ready_or_idle: Condvar::new(),
        }
    }

    /// Appends a task to the back of the ready queue and wakes one waiter.
    ///
    /// A task is posted at most once per suspension, so the queue never holds
    /// the same pending resumption twice.
    pub(crate) fn post(&self, runnable: Arc<dyn Runnable>) {
        {
            let mut inner = self.inner.lock();
            inner.ready.push_back(runnable);
        }

        self.ready_or_idle.notify_one();
    }

    /// Records that one more unit of asynchronous work is in flight.
    pub(crate) fn acquire(&self) {
        self.inner.lock().active += 1;
    }

    /// Records that one unit of asynchronous work finished.
    ///
    /// Wakes every waiter: the driving loop must get a chance to observe
    /// "queue empty and nothing active" and return.
    pub(crate) fn release(&self) {
        {
            let mut inner = self.inner.lock();
            debug_assert!(inner.active > 0, "active-work count underflow");
            inner.active -= 1;
        }

        self.ready_or_idle.notify_all();
    }

    /// Blocks until a task is ready or no work remains, then pops.
    ///
    /// Returns `None` exactly when the queue is empty and the active-work
    /// count is zero: nothing is runnable and nothing in flight can make
    /// anything runnable again.
    pub(crate) fn next(&self) -> Option<Arc<dyn Runnable>> {
        let mut inner = self.inner.lock();

        self.ready_or_idle
            .wait_while(&mut inner, |inner| inner.ready.is_empty() && inner.active > 0);

        inner.ready.pop_front()
    }

    #[cfg(test)]
    pub(crate) fn active(&self) -> usize {
        self.inner.lock().active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Noop;

    impl Runnable for Noop {
        fn poll(self: Arc<Self>) {}

        fn is_complete(&self) -> bool {
            true
        }

        fn registration(&self) -> Option<crate::utils::slab::Key> {
            None
        }
    }

    #[test]
    fn next_returns_none_when_idle() {
        let queue = ReadyQueue::new();
        assert!(queue.next().is_none());
    }

    #[test]
    fn posted_entries_come_back_fifo() {
        let queue = ReadyQueue::new();

        let first: Arc<dyn Runnable> = Arc::new(Noop);
        let second: Arc<dyn Runnable> = Arc::new(Noop);

        queue.post(first.clone());
        queue.post(second.clone());

        assert!(Arc::ptr_eq(&queue.next().expect("first entry"), &first));
        assert!(Arc::ptr_eq(&queue.next().expect("second entry"), &second));
        assert!(queue.next().is_none());
    }

    #[test]
    fn pending_work_keeps_the_queue_open() {
        let queue = Arc::new(ReadyQueue::new());
        queue.acquire();
        assert_eq!(queue.active(), 1);

        // A releasing thread must wake the blocked `next` call.
        let releaser = {
            let queue = queue.clone();
            std::thread::spawn(move || {
                std::thread::sleep(std::time::Duration::from_millis(50));
                queue.release();
            })
        };

        assert!(queue.next().is_none());
        releaser.join().expect("releaser thread");
        assert_eq!(queue.active(), 0);
    }
}
