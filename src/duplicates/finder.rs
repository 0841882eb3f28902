//! Duplicate finder: wiring of the three-stage pipeline.
//!
//! # Overview
//!
//! ```text
//!  walker-0 ─┐                    ┌─ fingerprint-0 ─┐                 ┌─ detector-0 ─┐
//!  walker-1 ─┼─► [FileEntry] ─────┼─ fingerprint-1 ─┼─► [Record] ─────┼─ detector-1 ─┼─► [Pair] ─► collector
//!  walker-N ─┘   bounded queue    └─ fingerprint-K ─┘  bounded queue  └─ detector-M ─┘  bounded
//! ```
//!
//! Every hop is a bounded queue, so a fast stage blocks instead of buffering
//! without limit. Each queue closes when the last worker of the stage
//! feeding it exits, which in turn lets the next stage drain and exit.
//!
//! # Example
//!
//! ```no_run
//! use dupepair::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::PathBuf;
//!
//! let config = FinderConfig::default().with_fingerprint_workers(4);
//! let finder = DuplicateFinder::new(config);
//!
//! let mut stream = finder.spawn(vec![PathBuf::from("a"), PathBuf::from("b")]).unwrap();
//! for pair in stream.by_ref() {
//!     println!("{pair}");
//! }
//! let summary = stream.finish();
//! println!("{} pairs, {} errors", summary.pairs, summary.errors.len());
//! ```

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use crossbeam_channel::{bounded, Receiver, Sender};

use super::detector::Detector;
use super::table::FingerprintTable;
use super::{ErrorLog, FingerprintRecord, PipelineError};
use crate::output::{OrderedPair, ResultCollector};
use crate::progress::{Phase, ProgressCallback};
use crate::scanner::path_utils::normalize_roots;
use crate::scanner::{
    walk_roots, FileEntry, Fingerprinter, Hasher, ScanError, WalkerConfig, DEFAULT_BUFFER_SIZE,
};

/// Default capacity of each inter-stage queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 1024;

/// Default fingerprint pool size: half the host parallelism, at least one.
#[must_use]
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map(|n| n.get() / 2)
        .unwrap_or(1)
        .max(1)
}

/// Configuration for the duplicate finder.
///
/// Every pool size and queue capacity is set here; none is derived later.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of fingerprint worker threads.
    pub fingerprint_workers: usize,
    /// Number of detector worker threads.
    pub detector_workers: usize,
    /// Capacity of each bounded inter-stage queue.
    pub queue_capacity: usize,
    /// Size of each reusable read buffer, in bytes.
    pub buffer_size: usize,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("fingerprint_workers", &self.fingerprint_workers)
            .field("detector_workers", &self.detector_workers)
            .field("queue_capacity", &self.queue_capacity)
            .field("buffer_size", &self.buffer_size)
            .field("walker_config", &self.walker_config)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        let workers = default_workers();
        Self {
            fingerprint_workers: workers,
            detector_workers: workers,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            buffer_size: DEFAULT_BUFFER_SIZE,
            walker_config: WalkerConfig::default(),
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the fingerprint pool size.
    #[must_use]
    pub fn with_fingerprint_workers(mut self, workers: usize) -> Self {
        self.fingerprint_workers = workers.max(1);
        self
    }

    /// Set the detector pool size.
    #[must_use]
    pub fn with_detector_workers(mut self, workers: usize) -> Self {
        self.detector_workers = workers.max(1);
        self
    }

    /// Set the capacity of each inter-stage queue.
    #[must_use]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Set the read buffer size.
    #[must_use]
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Summary statistics from a completed run.
#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Number of roots actually traversed (after normalization)
    pub roots_scanned: usize,
    /// Files emitted by the walkers
    pub files_discovered: usize,
    /// Files successfully fingerprinted
    pub files_fingerprinted: usize,
    /// Combined size of the fingerprinted files, as recorded at traversal
    pub fingerprinted_size: u64,
    /// Distinct fingerprints registered in the table
    pub unique_fingerprints: usize,
    /// Fingerprint matches rejected by byte comparison
    pub collisions: usize,
    /// Duplicate pairs emitted
    pub pairs: usize,
    /// Every error reported during the run
    pub errors: Vec<PipelineError>,
    /// Wall time of the run
    pub duration: Duration,
}

impl ScanSummary {
    /// Whether any path or record was skipped because of an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Fingerprinted size as a human-readable string.
    #[must_use]
    pub fn size_display(&self) -> String {
        ByteSize::b(self.fingerprinted_size).to_string()
    }
}

/// Errors that prevent the pipeline from starting.
///
/// Errors about individual files never surface here; they are collected in
/// [`ScanSummary::errors`].
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// A worker thread could not be spawned.
    #[error("Failed to start pipeline worker: {0}")]
    Spawn(#[from] io::Error),
}

#[derive(Debug, Default)]
struct Counters {
    fingerprinted: AtomicUsize,
    size: AtomicU64,
}

/// Duplicate finder that runs the walker → fingerprint → detector pipeline.
pub struct DuplicateFinder {
    config: FinderConfig,
    fingerprinter: Arc<dyn Fingerprinter>,
}

impl DuplicateFinder {
    /// Create a new duplicate finder using BLAKE3 fingerprints.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self::with_fingerprinter(config, Arc::new(Hasher::new()))
    }

    /// Create a new duplicate finder with a custom fingerprinter.
    #[must_use]
    pub fn with_fingerprinter(config: FinderConfig, fingerprinter: Arc<dyn Fingerprinter>) -> Self {
        Self {
            config,
            fingerprinter,
        }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Start the pipeline over `roots` and return the stream of pairs.
    ///
    /// Roots that are missing or not directories are reported in the
    /// summary; duplicated and nested roots are traversed once.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Spawn`] if a worker thread cannot be started.
    pub fn spawn(&self, roots: Vec<PathBuf>) -> Result<PairStream, FinderError> {
        let started = Instant::now();
        let errors = Arc::new(ErrorLog::new());

        let (roots, root_errors) = normalize_roots(&roots);
        for e in root_errors {
            errors.report(e);
        }
        log::info!(
            "Scanning {} root(s) with {} fingerprint / {} detector workers",
            roots.len(),
            self.config.fingerprint_workers,
            self.config.detector_workers
        );
        let roots_scanned = roots.len();

        let (file_tx, file_rx) = bounded::<FileEntry>(self.config.queue_capacity);
        let report = {
            let errors = Arc::clone(&errors);
            Arc::new(move |e: ScanError| errors.report(e))
        };
        let progress = self.config.progress_callback.clone();
        if let Some(ref cb) = progress {
            cb.on_phase_start(Phase::Walking);
        }

        let mut stream = self.spawn_stages(file_rx, Arc::clone(&errors), started)?;
        stream.roots_scanned = roots_scanned;
        stream.walkers = walk_roots(roots, &self.config.walker_config, file_tx, report, progress)?;
        Ok(stream)
    }

    /// Run the pipeline to completion and collect every pair.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Spawn`] if a worker thread cannot be started.
    pub fn find_pairs(
        &self,
        roots: Vec<PathBuf>,
    ) -> Result<(Vec<OrderedPair>, ScanSummary), FinderError> {
        let mut stream = self.spawn(roots)?;
        let pairs: Vec<OrderedPair> = stream.by_ref().collect();
        Ok((pairs, stream.finish()))
    }

    /// Run the fingerprint and detector stages over a prepared file list.
    ///
    /// No directory is walked; `files` stands in for the walker output.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::Spawn`] if a worker thread cannot be started.
    pub fn find_pairs_from_files(
        &self,
        files: Vec<FileEntry>,
    ) -> Result<(Vec<OrderedPair>, ScanSummary), FinderError> {
        let started = Instant::now();
        let errors = Arc::new(ErrorLog::new());
        let (file_tx, file_rx) = bounded::<FileEntry>(self.config.queue_capacity);
        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_start(Phase::Walking);
        }

        let mut stream = self.spawn_stages(file_rx, errors, started)?;
        let feeder = thread::Builder::new()
            .name("file-feeder".to_string())
            .spawn(move || {
                let mut sent = 0usize;
                for file in files {
                    if file_tx.send(file).is_err() {
                        break;
                    }
                    sent += 1;
                }
                sent
            })?;
        stream.walkers = vec![feeder];

        let pairs: Vec<OrderedPair> = stream.by_ref().collect();
        Ok((pairs, stream.finish()))
    }

    /// Spawn the detector and fingerprint pools behind `files`.
    fn spawn_stages(
        &self,
        files: Receiver<FileEntry>,
        errors: Arc<ErrorLog>,
        started: Instant,
    ) -> Result<PairStream, FinderError> {
        let capacity = self.config.queue_capacity;
        let (record_tx, record_rx) = bounded::<FingerprintRecord>(capacity);
        let (pair_tx, pair_rx) = bounded(capacity);
        let progress = self.config.progress_callback.clone();

        let table = Arc::new(FingerprintTable::with_shards(self.config.detector_workers * 4));
        let detector = Arc::new(
            Detector::new(table, Arc::clone(&errors), self.config.buffer_size)
                .with_progress_callback(progress.clone()),
        );
        if let Some(ref cb) = progress {
            cb.on_phase_start(Phase::Fingerprinting);
            cb.on_phase_start(Phase::Detecting);
        }

        let detectors = detector.spawn_workers(self.config.detector_workers, record_rx, pair_tx)?;

        let counters = Arc::new(Counters::default());
        let fingerprinters = spawn_fingerprinters(
            self.config.fingerprint_workers,
            self.config.buffer_size,
            Arc::clone(&self.fingerprinter),
            files,
            record_tx,
            Arc::clone(&errors),
            Arc::clone(&counters),
            progress.clone(),
        )?;

        Ok(PairStream {
            collector: ResultCollector::new(pair_rx),
            walkers: Vec::new(),
            fingerprinters,
            detectors,
            detector,
            counters,
            errors,
            progress,
            roots_scanned: 0,
            started,
        })
    }
}

/// Spawn the fingerprint pool.
///
/// Each worker owns one read buffer for its lifetime and one clone of
/// `records`; the record queue closes when the last worker exits.
#[allow(clippy::too_many_arguments)]
fn spawn_fingerprinters(
    count: usize,
    buffer_size: usize,
    fingerprinter: Arc<dyn Fingerprinter>,
    files: Receiver<FileEntry>,
    records: Sender<FingerprintRecord>,
    errors: Arc<ErrorLog>,
    counters: Arc<Counters>,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> io::Result<Vec<JoinHandle<()>>> {
    let mut handles = Vec::with_capacity(count);

    for idx in 0..count.max(1) {
        let rx = files.clone();
        let tx = records.clone();
        let fingerprinter = Arc::clone(&fingerprinter);
        let errors = Arc::clone(&errors);
        let counters = Arc::clone(&counters);
        let progress = progress.clone();

        let handle = thread::Builder::new()
            .name(format!("fingerprint-{idx}"))
            .spawn(move || {
                let mut buf = vec![0u8; buffer_size.max(1)];
                for entry in rx.iter() {
                    if let Some(ref cb) = progress {
                        cb.on_progress(Phase::Fingerprinting, &entry.path);
                    }
                    match fingerprinter.fingerprint(&entry.path, &mut buf) {
                        Ok(fingerprint) => {
                            counters.fingerprinted.fetch_add(1, Ordering::Relaxed);
                            counters.size.fetch_add(entry.size, Ordering::Relaxed);
                            if let Some(ref cb) = progress {
                                cb.on_item_completed(entry.size);
                            }
                            if tx.send(FingerprintRecord::new(fingerprint, entry)).is_err() {
                                log::debug!("Record queue closed; fingerprint-{idx} stopping");
                                break;
                            }
                        }
                        Err(e) => errors.report(e),
                    }
                }
            })?;
        handles.push(handle);
    }

    Ok(handles)
}

/// Running pipeline, yielding [`OrderedPair`]s as they are confirmed.
///
/// Iterate to receive pairs; the iterator ends once every stage has
/// drained. Call [`PairStream::finish`] afterwards to join the workers and
/// obtain the [`ScanSummary`]. Calling `finish` before the iterator is
/// exhausted discards the remaining pairs.
pub struct PairStream {
    collector: ResultCollector,
    walkers: Vec<JoinHandle<usize>>,
    fingerprinters: Vec<JoinHandle<()>>,
    detectors: Vec<JoinHandle<()>>,
    detector: Arc<Detector>,
    counters: Arc<Counters>,
    errors: Arc<ErrorLog>,
    progress: Option<Arc<dyn ProgressCallback>>,
    roots_scanned: usize,
    started: Instant,
}

impl Iterator for PairStream {
    type Item = OrderedPair;

    fn next(&mut self) -> Option<Self::Item> {
        self.collector.next()
    }
}

impl PairStream {
    /// Join every worker and summarize the run.
    #[must_use]
    pub fn finish(self) -> ScanSummary {
        let PairStream {
            collector,
            walkers,
            fingerprinters,
            detectors,
            detector,
            counters,
            errors,
            progress,
            roots_scanned,
            started,
        } = self;

        // Dropping the collector unblocks detectors if pairs were left unread
        drop(collector);

        let files_discovered: usize = join_stage(walkers, "walker", &errors).into_iter().sum();
        end_phase(&progress, Phase::Walking);
        join_stage(fingerprinters, "fingerprint", &errors);
        end_phase(&progress, Phase::Fingerprinting);
        join_stage(detectors, "detector", &errors);
        end_phase(&progress, Phase::Detecting);

        let summary = ScanSummary {
            roots_scanned,
            files_discovered,
            files_fingerprinted: counters.fingerprinted.load(Ordering::Relaxed),
            fingerprinted_size: counters.size.load(Ordering::Relaxed),
            unique_fingerprints: detector.table().len(),
            collisions: detector.collisions(),
            pairs: detector.pairs(),
            errors: errors.drain(),
            duration: started.elapsed(),
        };

        log::info!(
            "Scan complete: {} files ({}) fingerprinted, {} unique, {} pairs, {} collisions, {} errors in {:.2?}",
            summary.files_fingerprinted,
            summary.size_display(),
            summary.unique_fingerprints,
            summary.pairs,
            summary.collisions,
            summary.errors.len(),
            summary.duration
        );

        summary
    }
}

/// Join a stage's threads; a panicked worker is reported, not propagated.
fn join_stage<T>(handles: Vec<JoinHandle<T>>, stage: &str, errors: &ErrorLog) -> Vec<T> {
    handles
        .into_iter()
        .filter_map(|handle| match handle.join() {
            Ok(value) => Some(value),
            Err(_) => {
                errors.report(PipelineError::Protocol(format!("{stage} worker panicked")));
                None
            }
        })
        .collect()
}

fn end_phase(progress: &Option<Arc<dyn ProgressCallback>>, phase: Phase) {
    if let Some(ref cb) = progress {
        cb.on_phase_end(phase);
    }
}
