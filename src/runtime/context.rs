//! Thread-local runtime context for task spawning and blocking bridges.
//!
//! This module manages the thread-local state required for global task spawning
//! ([`Task::spawn`]) and for constructing blocking-to-async bridges without an
//! explicit runtime reference.
//!
//! # Purpose
//!
//! - Provides thread-local storage for the current runtime handle.
//! - Lets async primitives reach the current runtime's ready queue and worker
//!   pool while a task body executes.
//!
//! # Usage
//!
//! This module is not intended for direct use by most users. The runtime enters
//! a context around every inline task start and around the whole driving loop,
//! so any code running inside a task body observes the right handle.
//!
//! [`Task::spawn`]: crate::Task::spawn

use crate::runtime::core::Handle;

use std::cell::RefCell;

thread_local! {
    /// Thread-local storage for the current runtime's handle.
    ///
    /// Set by [`enter_context`] for the duration of every task start and of the
    /// driving loop.
    static CURRENT_HANDLE: RefCell<Option<Handle>> = const { RefCell::new(None) };
}

/// Enters a runtime context for the current thread.
///
/// Stores the handle in thread-local storage, executes the provided closure,
/// and restores the previous context on exit, so nested runtimes on one thread
/// do not clobber each other.
pub(crate) fn enter_context<F, R>(handle: Handle, function: F) -> R
where
    F: FnOnce() -> R,
{
    CURRENT_HANDLE.with(|current| {
        let previous = current.borrow_mut().replace(handle);

        let result = function();

        *current.borrow_mut() = previous;

        result
    })
}

/// Returns the current runtime handle, if this thread is inside a context.
pub(crate) fn current_handle() -> Option<Handle> {
    CURRENT_HANDLE.with(|current| current.borrow().clone())
}
