//! Fluent builder for Runtime construction.
//!
//! Provides a builder pattern interface for creating and configuring Runtime instances.

use crate::runtime::Runtime;

/// Builder for constructing Runtime instances with fluent API.
///
/// The only tunable today is the size of the blocking worker pool; by default
/// the pool gets one thread per unit of available parallelism.
///
/// # Example
/// ```ignore
/// let rt = RuntimeBuilder::new().worker_threads(4).build();
/// ```
pub struct RuntimeBuilder {
    worker_threads: usize,
}

impl Default for RuntimeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RuntimeBuilder {
    /// Creates a new runtime builder.
    pub fn new() -> Self {
        Self { worker_threads: 0 }
    }

    /// Sets the number of threads in the blocking worker pool.
    ///
    /// A count of zero selects the host's available parallelism, with a
    /// minimum of one thread.
    pub fn worker_threads(mut self, count: usize) -> Self {
        self.worker_threads = count;
        self
    }

    /// Builds and returns a configured Runtime instance.
    ///
    /// Consumes the builder and constructs a Runtime with the current
    /// configuration.
    pub fn build(self) -> Runtime {
        Runtime::with_worker_threads(self.worker_threads)
    }
}
