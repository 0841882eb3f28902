//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - The shared fingerprint table with an atomic get-or-insert ([`table`])
//! - Byte-exact verification of candidate pairs ([`verify`])
//! - Detector workers that turn fingerprint records into pairs ([`detector`])
//! - The three-stage pipeline orchestrator ([`finder`])

pub mod detector;
pub mod finder;
pub mod table;
pub mod verify;

use std::path::PathBuf;
use std::sync::Mutex;

use crate::scanner::{FileEntry, Fingerprint, HashError, ScanError};

pub use detector::Detector;
pub use finder::{DuplicateFinder, FinderConfig, FinderError, PairStream, ScanSummary};
pub use table::FingerprintTable;
pub use verify::files_equal;

/// A fingerprinted file travelling from the fingerprint pool to the detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FingerprintRecord {
    /// Digest of the file's content
    pub fingerprint: Fingerprint,
    /// The file the digest was computed from
    pub entry: FileEntry,
}

impl FingerprintRecord {
    /// Create a new record.
    #[must_use]
    pub fn new(fingerprint: Fingerprint, entry: FileEntry) -> Self {
        Self { fingerprint, entry }
    }
}

/// A verified byte-exact duplicate relation.
///
/// `representative` is the first file registered under the shared
/// fingerprint; `duplicate` is the file that collided with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicatePair {
    /// First file observed with this content
    pub representative: PathBuf,
    /// A later file with identical content
    pub duplicate: PathBuf,
}

/// Errors reported by pipeline stages.
///
/// None of these stop the pipeline; each one drops a single path, record or
/// pair and is collected into the run summary.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// A path could not be listed or classified during traversal.
    #[error("traversal: {0}")]
    Traversal(#[from] ScanError),

    /// A file could not be read while fingerprinting or verifying.
    #[error("read: {0}")]
    Read(#[from] HashError),

    /// An internal record was malformed.
    #[error("protocol: {0}")]
    Protocol(String),
}

/// Thread-safe sink for [`PipelineError`]s.
///
/// Every report is logged at warn level and retained for the summary.
#[derive(Debug, Default)]
pub struct ErrorLog {
    errors: Mutex<Vec<PipelineError>>,
}

impl ErrorLog {
    /// Create an empty error log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn report(&self, error: impl Into<PipelineError>) {
        let error = error.into();
        log::warn!("Skipping: {}", error);
        match self.errors.lock() {
            Ok(mut errors) => errors.push(error),
            Err(poisoned) => poisoned.into_inner().push(error),
        }
    }

    /// Number of errors recorded so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.lock().map_or(0, |errors| errors.len())
    }

    /// Whether no errors have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Take every recorded error, leaving the log empty.
    pub fn drain(&self) -> Vec<PipelineError> {
        match self.errors.lock() {
            Ok(mut errors) => std::mem::take(&mut *errors),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}
