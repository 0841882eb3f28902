//! CSV output formatter.
//!
//! Provides machine-readable CSV output for spreadsheets and data analysis.
//! One row is generated for each duplicate pair.
//!
//! # Columns
//!
//! - `first`: Lexicographically smaller path
//! - `second`: Lexicographically larger path

use std::io;

use serde::Serialize;

use super::{OrderedPair, OutputError, PairWriter};

const HEADER: [&str; 2] = ["first", "second"];

/// A single row in the CSV output.
#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    first: &'a str,
    second: &'a str,
}

/// CSV output formatter.
pub struct CsvOutput<W: io::Write> {
    writer: csv::Writer<W>,
    header_written: bool,
}

impl<W: io::Write> CsvOutput<W> {
    /// Create a new CSV formatter writing to `writer`.
    ///
    /// The header row is written before the first pair, or on
    /// [`PairWriter::finish`] if there were no pairs.
    #[must_use]
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(writer),
            header_written: false,
        }
    }

    fn ensure_header(&mut self) -> Result<(), OutputError> {
        if !self.header_written {
            self.writer.write_record(HEADER)?;
            self.header_written = true;
        }
        Ok(())
    }
}

impl<W: io::Write> PairWriter for CsvOutput<W> {
    fn write_pair(&mut self, pair: &OrderedPair) -> Result<(), OutputError> {
        self.ensure_header()?;
        let first = pair.first.to_string_lossy();
        let second = pair.second.to_string_lossy();
        self.writer.serialize(CsvRow {
            first: &first,
            second: &second,
        })?;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), OutputError> {
        self.ensure_header()?;
        self.writer.flush()?;
        Ok(())
    }
}
