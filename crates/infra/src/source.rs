//! Producers of classified updates.

use std::io::BufRead;

use thiserror::Error;

use statekeeper_core::StateUpdate;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read update: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: malformed update: {message}")]
    Decode { line: usize, message: String },
}

/// Something that yields classified updates one at a time.
///
/// `Ok(None)` means the source is exhausted. An `Err` covers a single bad
/// read; callers may keep pulling afterwards.
pub trait UpdateSource {
    fn next_update(&mut self) -> Result<Option<StateUpdate>, SourceError>;
}

impl<S> UpdateSource for Box<S>
where
    S: UpdateSource + ?Sized,
{
    fn next_update(&mut self) -> Result<Option<StateUpdate>, SourceError> {
        (**self).next_update()
    }
}

/// Reads one JSON-encoded [`StateUpdate`] per line. Blank lines are skipped.
#[derive(Debug)]
pub struct JsonLinesSource<R> {
    reader: R,
    line: usize,
    buf: Vec<u8>,
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: 0,
            buf: Vec::new(),
        }
    }

    /// Number of lines consumed so far (1-based for the last one read).
    pub fn line(&self) -> usize {
        self.line
    }
}

impl<R: BufRead> UpdateSource for JsonLinesSource<R> {
    fn next_update(&mut self) -> Result<Option<StateUpdate>, SourceError> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;

            let trimmed = self.buf.trim_ascii();
            if trimmed.is_empty() {
                continue;
            }

            // Invalid UTF-8 surfaces here as a decode error for this line.
            return serde_json::from_slice(trimmed)
                .map(Some)
                .map_err(|e| SourceError::Decode {
                    line: self.line,
                    message: e.to_string(),
                });
        }
    }
}
