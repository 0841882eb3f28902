//! Result collection and output formatting.
//!
//! This module provides:
//! - The result collector turning detector pairs into ordered pairs
//! - Text output (`a, b` per line), the default
//! - JSON lines for automation and scripting
//! - CSV for spreadsheet import
//!
//! Every format is written incrementally, one pair at a time, as the
//! pipeline produces them.
//!
//! # Example
//!
//! ```no_run
//! use dupepair::duplicates::DuplicateFinder;
//! use dupepair::output::OutputFormat;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let mut stream = finder.spawn(vec![PathBuf::from(".")]).unwrap();
//!
//! let mut out = OutputFormat::Json.writer(std::io::stdout());
//! for pair in stream.by_ref() {
//!     out.write_pair(&pair).unwrap();
//! }
//! out.finish().unwrap();
//! let _summary = stream.finish();
//! ```

pub mod collector;
pub mod csv;
pub mod json;
pub mod text;

use std::io;

use thiserror::Error;

// Re-export main types
pub use collector::{OrderedPair, ResultCollector};
pub use csv::CsvOutput;
pub use json::JsonOutput;
pub use text::TextOutput;

/// Errors that can occur while writing pairs.
#[derive(Debug, Error)]
pub enum OutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),

    /// Error during JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Incremental writer for ordered pairs.
pub trait PairWriter {
    /// Write one pair.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if serialization or the underlying write fails.
    fn write_pair(&mut self, pair: &OrderedPair) -> Result<(), OutputError>;

    /// Flush anything buffered.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if the flush fails.
    fn finish(&mut self) -> Result<(), OutputError>;
}

/// Output format for pair results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One `a, b` line per pair
    #[default]
    Text,
    /// One JSON object per line
    Json,
    /// CSV with a `first,second` header
    Csv,
}

impl OutputFormat {
    /// Build a writer for this format over `writer`.
    pub fn writer<'a, W: io::Write + 'a>(self, writer: W) -> Box<dyn PairWriter + 'a> {
        match self {
            OutputFormat::Text => Box::new(TextOutput::new(writer)),
            OutputFormat::Json => Box::new(JsonOutput::new(writer)),
            OutputFormat::Csv => Box::new(CsvOutput::new(writer)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}
