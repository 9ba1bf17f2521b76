//! Blocking line input.

use crate::error::Error;

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

/// A blocking producer of lines.
///
/// `Ok(Some(line))` yields the next line without its terminator,
/// `Ok(None)` signals end of input and keeps doing so on every further call,
/// and `Err` reports a read failure.
pub trait LineSource: Send {
    /// Reads the next line, or signals end of input.
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Reads a text file one line at a time.
///
/// The file is opened in the constructor and closed when the reader is
/// dropped.
pub struct LineReader {
    input: BufReader<File>,
}

impl LineReader {
    /// Opens a file for line-by-line reading.
    ///
    /// # Errors
    /// Returns [`Error::Open`] if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();

        let file = File::open(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Self {
            input: BufReader::new(file),
        })
    }

    /// Reads the next line, without its terminator.
    ///
    /// Returns `Ok(None)` at end of input, on this call and every later one.
    pub fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();

        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        if line.ends_with('\n') {
            line.pop();

            if line.ends_with('\r') {
                line.pop();
            }
        }

        Ok(Some(line))
    }
}

impl LineSource for LineReader {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        LineReader::next_line(self)
    }
}
