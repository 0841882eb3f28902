//! Duplicate detector stage.
//!
//! Each worker takes [`FingerprintRecord`]s off the queue and resolves them
//! against the shared [`FingerprintTable`]:
//!
//! 1. Register the file as representative if its fingerprint is new.
//! 2. Otherwise compare it byte for byte with the representative.
//! 3. Emit a [`DuplicatePair`] only if the bytes match.
//!
//! A fingerprint collision between different contents leaves the table as
//! it was. Unreadable files and malformed records are reported to the
//! [`ErrorLog`] and dropped.

use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

use super::table::FingerprintTable;
use super::verify::{files_equal, CompareBuffers};
use super::{DuplicatePair, ErrorLog, FingerprintRecord, PipelineError};
use crate::progress::{Phase, ProgressCallback};

/// What happened to a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The file became the representative of a new fingerprint.
    Registered,
    /// The file matched its representative byte for byte.
    Duplicate(DuplicatePair),
    /// Same fingerprint, different content.
    Collision,
    /// The record was reported and discarded.
    Dropped,
}

/// Shared state of the detector pool.
pub struct Detector {
    table: Arc<FingerprintTable>,
    errors: Arc<ErrorLog>,
    progress: Option<Arc<dyn ProgressCallback>>,
    buffer_size: usize,
    collisions: AtomicUsize,
    pairs: AtomicUsize,
}

impl Detector {
    /// Create a detector over `table`, reporting to `errors`.
    #[must_use]
    pub fn new(table: Arc<FingerprintTable>, errors: Arc<ErrorLog>, buffer_size: usize) -> Self {
        Self {
            table,
            errors,
            progress: None,
            buffer_size,
            collisions: AtomicUsize::new(0),
            pairs: AtomicUsize::new(0),
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Option<Arc<dyn ProgressCallback>>) -> Self {
        self.progress = callback;
        self
    }

    /// The table this detector resolves against.
    #[must_use]
    pub fn table(&self) -> &FingerprintTable {
        &self.table
    }

    /// Fingerprint collisions rejected by byte comparison so far.
    #[must_use]
    pub fn collisions(&self) -> usize {
        self.collisions.load(Ordering::Relaxed)
    }

    /// Pairs confirmed so far.
    #[must_use]
    pub fn pairs(&self) -> usize {
        self.pairs.load(Ordering::Relaxed)
    }

    /// Resolve one record against the table.
    pub fn resolve(&self, record: FingerprintRecord, buffers: &mut CompareBuffers) -> Resolution {
        if record.entry.path.as_os_str().is_empty() {
            self.errors.report(PipelineError::Protocol(format!(
                "record for fingerprint {} has no path",
                record.fingerprint
            )));
            return Resolution::Dropped;
        }

        let fingerprint = record.fingerprint;
        let path = record.entry.path.clone();

        let Some(rep) = self.table.get_or_insert(fingerprint, record.entry) else {
            log::trace!("New fingerprint {} for {}", fingerprint, path.display());
            return Resolution::Registered;
        };

        if rep.path == path {
            self.errors.report(PipelineError::Protocol(format!(
                "{} delivered twice",
                path.display()
            )));
            return Resolution::Dropped;
        }

        match files_equal(&rep.path, &path, buffers) {
            Ok(true) => {
                self.pairs.fetch_add(1, Ordering::Relaxed);
                if let Some(ref cb) = self.progress {
                    cb.on_pair_found();
                }
                log::debug!("Duplicate: {} == {}", rep.path.display(), path.display());
                Resolution::Duplicate(DuplicatePair {
                    representative: rep.path,
                    duplicate: path,
                })
            }
            Ok(false) => {
                self.collisions.fetch_add(1, Ordering::Relaxed);
                log::debug!(
                    "Fingerprint collision {}: {} differs from {}",
                    fingerprint,
                    path.display(),
                    rep.path.display()
                );
                Resolution::Collision
            }
            Err(e) => {
                self.errors.report(e);
                Resolution::Dropped
            }
        }
    }

    /// Spawn `count` workers draining `records` into `pairs`.
    ///
    /// Workers exit when `records` is closed and empty. Each worker holds a
    /// clone of `pairs`, so the pair queue closes once they have all exited.
    ///
    /// # Errors
    ///
    /// Returns an error if a worker thread cannot be spawned.
    pub fn spawn_workers(
        self: &Arc<Self>,
        count: usize,
        records: Receiver<FingerprintRecord>,
        pairs: Sender<DuplicatePair>,
    ) -> io::Result<Vec<JoinHandle<()>>> {
        let mut handles = Vec::with_capacity(count);

        for idx in 0..count.max(1) {
            let detector = Arc::clone(self);
            let rx = records.clone();
            let tx = pairs.clone();

            let handle = thread::Builder::new()
                .name(format!("detector-{idx}"))
                .spawn(move || {
                    let mut buffers = CompareBuffers::new(detector.buffer_size);
                    for record in rx.iter() {
                        if let Some(ref cb) = detector.progress {
                            cb.on_progress(Phase::Detecting, &record.entry.path);
                        }
                        if let Resolution::Duplicate(pair) = detector.resolve(record, &mut buffers) {
                            if tx.send(pair).is_err() {
                                log::debug!("Pair queue closed; detector-{idx} stopping");
                                break;
                            }
                        }
                    }
                })?;
            handles.push(handle);
        }

        Ok(handles)
    }
}
