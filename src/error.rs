//! Error types surfaced by the runtime and its file collaborators.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while setting up or reading an input source.
///
/// Construction-time failures ([`Error::Open`]) are returned immediately to the
/// caller that tried to open the source. Read-time failures ([`Error::Read`])
/// are captured on a worker thread and re-raised in the awaiting task once it
/// resumes.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// The input source could not be opened.
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// Path that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// A read failed after the source had been opened.
    #[error("read failed: {0}")]
    Read(#[from] io::Error),
}
