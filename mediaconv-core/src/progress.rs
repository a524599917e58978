//! Append-only capture of the tool's progress stream.
//!
//! The sink accumulates raw stdout chunks exactly as they arrive. Chunks are
//! concatenated without separators, so a run that emits `10%`, `55%`, `100%`
//! reads back as `10%55%100%`. Readers may observe the sink at any time while
//! the job is still running; [`ProgressSink::read_from`] supports incremental
//! tailing without re-copying the whole buffer.

use std::sync::Mutex;

/// Shared, append-only buffer of everything the tool wrote to stdout.
#[derive(Debug, Default)]
pub struct ProgressSink {
    buffer: Mutex<String>,
}

impl ProgressSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends one chunk verbatim. Chunks are never reformatted or truncated.
    ///
    /// Only the job worker writes; the sink is read-only outside the crate.
    pub(crate) fn append(&self, chunk: &str) {
        if let Ok(mut buffer) = self.buffer.lock() {
            buffer.push_str(chunk);
        }
    }

    /// A copy of everything captured so far.
    pub fn snapshot(&self) -> String {
        self.buffer.lock().map(|b| b.clone()).unwrap_or_default()
    }

    /// Bytes captured so far.
    pub fn len(&self) -> usize {
        self.buffer.lock().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns everything at or after `offset`, plus the offset to resume
    /// from.
    ///
    /// Callers poll with the returned offset to stream the sink without
    /// copying already-seen content. An offset inside a multi-byte character
    /// (possible when a chunk boundary split a code point) yields nothing and
    /// stays put until the character completes.
    pub fn read_from(&self, offset: usize) -> (usize, String) {
        match self.buffer.lock() {
            Ok(buffer) => match buffer.get(offset..) {
                Some(tail) => (buffer.len(), tail.to_string()),
                None => (offset, String::new()),
            },
            Err(_) => (offset, String::new()),
        }
    }
}
