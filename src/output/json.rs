//! JSON lines output formatter.
//!
//! Provides machine-readable output for scripting and automation. Each pair
//! is written as one compact JSON object on its own line, so consumers can
//! process results while the scan is still running.
//!
//! # Output Schema
//!
//! ```json
//! {"first":"/a/file.txt","second":"/b/file.txt"}
//! ```

use std::io::Write;

use serde::Serialize;

use super::{OrderedPair, OutputError, PairWriter};

/// A single pair in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonPair {
    /// Lexicographically smaller path
    pub first: String,
    /// Lexicographically larger path
    pub second: String,
}

impl From<&OrderedPair> for JsonPair {
    fn from(pair: &OrderedPair) -> Self {
        // Lossy conversion keeps non-UTF-8 paths printable
        Self {
            first: pair.first.to_string_lossy().into_owned(),
            second: pair.second.to_string_lossy().into_owned(),
        }
    }
}

/// JSON lines output formatter.
pub struct JsonOutput<W: Write> {
    writer: W,
}

impl<W: Write> JsonOutput<W> {
    /// Create a new JSON formatter writing to `writer`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> PairWriter for JsonOutput<W> {
    fn write_pair(&mut self, pair: &OrderedPair) -> Result<(), OutputError> {
        serde_json::to_writer(&mut self.writer, &JsonPair::from(pair))?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}
