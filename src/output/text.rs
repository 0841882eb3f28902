//! Plain text output: one `first, second` line per pair.
//!
//! No header and no summary; the result stream on stdout contains nothing
//! but pairs.

use std::io::Write;

use super::{OrderedPair, OutputError, PairWriter};

/// Text output formatter.
pub struct TextOutput<W: Write> {
    writer: W,
}

impl<W: Write> TextOutput<W> {
    /// Create a new text formatter writing to `writer`.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> PairWriter for TextOutput<W> {
    fn write_pair(&mut self, pair: &OrderedPair) -> Result<(), OutputError> {
        writeln!(self.writer, "{pair}")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        self.writer.flush()?;
        Ok(())
    }
}
