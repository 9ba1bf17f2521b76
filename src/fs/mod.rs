//! Line-oriented file input, blocking and asynchronous.
//!
//! [`LineReader`] is the plain synchronous reader: one line per call, `None`
//! at end of input. [`AsyncLineReader`] wraps any [`LineSource`] and turns
//! each read into an await point by running the blocking call on the
//! runtime's worker pool and resuming the waiting task with the outcome.
//!
//! Public API:
//! - [`LineReader`]: Blocking file-backed line reader
//! - [`LineSource`]: Trait for any blocking producer of lines
//! - [`AsyncLineReader`]: Awaitable bridge over a [`LineSource`]

mod async_reader;
mod reader;

pub use async_reader::{AsyncLineReader, NextLine};
pub use reader::{LineReader, LineSource};
