//! Scope-bound guard over the runtime's active-work count.

use crate::runtime::queue::ReadyQueue;

use std::sync::Arc;

/// Keeps the runtime's driving loop alive for as long as the token exists.
///
/// A token is acquired whenever a unit of asynchronous activity begins (a
/// top-level task being registered, or a blocking job being dispatched to the
/// worker pool) and released exactly once when the token is dropped.
/// Dropping the token notifies the driving loop so it can re-check whether
/// all work is done.
///
/// Blocking bridges hand a token into the job they submit, so its lifetime
/// spans exactly "job dispatched" to "job finished". Without it, the loop
/// could observe an empty ready queue while the job is still running on a
/// worker thread and wrongly conclude the runtime is quiescent.
pub struct LivenessToken {
    queue: Arc<ReadyQueue>,
}

impl LivenessToken {
    pub(crate) fn new(queue: Arc<ReadyQueue>) -> Self {
        queue.acquire();
        Self { queue }
    }
}

impl Drop for LivenessToken {
    fn drop(&mut self) {
        self.queue.release();
    }
}
