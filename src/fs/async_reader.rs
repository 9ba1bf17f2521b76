//! Awaitable line reads backed by the worker pool.
//!
//! `AsyncLineReader` is the bridge between a blocking [`LineSource`] and the
//! cooperative task world. Each [`next_line`](AsyncLineReader::next_line) call
//! suspends the awaiting task, ships the blocking read to the worker pool
//! together with the task's waker and a liveness token, and yields the
//! outcome once the task is resumed.

use crate::error::Error;
use crate::fs::reader::{LineReader, LineSource};
use crate::runtime::{Handle, current_handle};

use parking_lot::Mutex;

use std::future::Future;
use std::io;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

/// Outcome of one blocking read, written by a pool worker and consumed by the
/// resumed task.
type ReadState = Arc<Mutex<Option<io::Result<Option<String>>>>>;

/// An asynchronous line reader over a blocking source.
///
/// Reads must be awaited one at a time; each one runs the underlying blocking
/// call on the runtime's worker pool while the awaiting task is suspended.
/// After end of input, every further read keeps yielding `Ok(None)`.
pub struct AsyncLineReader {
    source: Arc<Mutex<Box<dyn LineSource>>>,
    handle: Handle,
}

impl AsyncLineReader {
    /// Opens a file using the current runtime context.
    ///
    /// See [`with_handle`](Self::with_handle) when an explicit handle is
    /// available instead.
    ///
    /// # Panics
    /// Panics if called outside of a runtime context.
    ///
    /// # Errors
    /// Returns [`Error::Open`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let handle = current_handle().expect(
            "no runtime in current context. AsyncLineReader::open must be called from \
             within a task; use AsyncLineReader::with_handle otherwise",
        );

        Self::with_handle(path, handle)
    }

    /// Opens a file with an explicit runtime handle.
    pub fn with_handle(path: impl AsRef<Path>, handle: Handle) -> Result<Self, Error> {
        Ok(Self::from_source(LineReader::open(path)?, handle))
    }

    /// Wraps an arbitrary blocking line source.
    pub fn from_source(source: impl LineSource + 'static, handle: Handle) -> Self {
        Self {
            source: Arc::new(Mutex::new(Box::new(source))),
            handle,
        }
    }

    /// Returns a future yielding the next line, `Ok(None)` at end of input,
    /// or the error the blocking read failed with.
    pub fn next_line(&self) -> NextLine {
        NextLine {
            source: self.source.clone(),
            handle: self.handle.clone(),
            state: Arc::new(Mutex::new(None)),
            submitted: false,
        }
    }
}

/// Future for one asynchronous line read.
///
/// The first poll dispatches the blocking read to the worker pool and
/// suspends; the poll after the wake-up inspects the shared outcome.
pub struct NextLine {
    source: Arc<Mutex<Box<dyn LineSource>>>,
    handle: Handle,
    state: ReadState,
    submitted: bool,
}

impl Future for NextLine {
    type Output = io::Result<Option<String>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if !this.submitted {
            this.submitted = true;

            let source = this.source.clone();
            let state = this.state.clone();
            let waker = cx.waker().clone();
            let token = this.handle.liveness_token();

            this.handle.submit_blocking(Box::new(move || {
                let outcome = source.lock().next_line();

                *state.lock() = Some(outcome);
                waker.wake();

                // Released only after the wake is posted, so the driving loop
                // cannot observe zero active work with the resumption still
                // unannounced.
                drop(token);
            }));

            return Poll::Pending;
        }

        match this.state.lock().take() {
            Some(outcome) => Poll::Ready(outcome),
            // Woken for some other reason before the read finished.
            None => Poll::Pending,
        }
    }
}
