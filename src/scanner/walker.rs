//! Directory walker implementation using jwalk.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing one root and
//! [`walk_roots`], which runs one walker thread per root and feeds every
//! discovered file into a shared bounded queue.
//!
//! # Features
//!
//! - Parallel directory reading via jwalk's rayon pool
//! - Gitignore-style pattern matching via the `ignore` crate
//! - Size filtering (min/max) and hidden file filtering
//! - Errors yielded per entry; traversal of the rest of the tree continues
//!
//! # Example
//!
//! ```no_run
//! use dupepair::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let files: Vec<_> = walker.walk().filter_map(Result::ok).collect();
//! println!("Found {} files", files.len());
//! ```

use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::Sender;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;

use super::{FileEntry, ScanError, WalkerConfig};
use crate::progress::{Phase, ProgressCallback};

/// Directory walker for a single root.
#[derive(Debug)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Root this walker traverses.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Build gitignore matcher from config patterns and .gitignore file.
    fn build_gitignore(&self) -> Option<Gitignore> {
        let mut builder = GitignoreBuilder::new(&self.root);

        let gitignore_path = self.root.join(".gitignore");
        if gitignore_path.exists() {
            if let Some(e) = builder.add(&gitignore_path) {
                log::warn!(
                    "Failed to load .gitignore from {}: {}",
                    gitignore_path.display(),
                    e
                );
            } else {
                log::debug!("Loaded .gitignore from {}", gitignore_path.display());
            }
        }

        for pattern in &self.config.ignore_patterns {
            if let Err(e) = builder.add_line(None, pattern) {
                log::warn!("Invalid ignore pattern '{}': {}", pattern, e);
            }
        }

        match builder.build() {
            Ok(gitignore) if gitignore.is_empty() => None,
            Ok(gitignore) => Some(gitignore),
            Err(e) => {
                log::warn!("Failed to build ignore patterns: {}", e);
                None
            }
        }
    }

    /// Check if a path should be ignored based on configured patterns.
    fn should_ignore(&self, path: &Path, is_dir: bool, gitignore: &Option<Gitignore>) -> bool {
        let Some(gi) = gitignore else {
            return false;
        };

        // Gitignore matching expects paths relative to the root with forward slashes
        let relative_path = path.strip_prefix(&self.root).unwrap_or(path);
        let path_str = relative_path.to_string_lossy();
        let normalized_path = if cfg!(windows) {
            path_str.replace('\\', "/")
        } else {
            path_str.into_owned()
        };

        gi.matched_path_or_any_parents(normalized_path, is_dir)
            .is_ignore()
    }

    /// Check if a file passes size filters.
    fn passes_size_filter(&self, size: u64) -> bool {
        if self.config.min_size.is_some_and(|min| size < min) {
            return false;
        }
        if self.config.max_size.is_some_and(|max| size > max) {
            return false;
        }
        true
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Directories are traversed but never yielded. Errors are yielded as
    /// [`ScanError`] values rather than stopping iteration.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let gitignore = self.build_gitignore();

        let walk_dir = WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .skip_hidden(self.config.skip_hidden);

        walk_dir.into_iter().filter_map(move |entry_result| match entry_result {
            Ok(entry) => {
                let path = entry.path();
                let file_type = entry.file_type();

                if file_type.is_dir() {
                    return None;
                }

                if self.should_ignore(&path, false, &gitignore) {
                    log::trace!("Ignoring file: {}", path.display());
                    return None;
                }

                // Resolve symlinks so links to regular files are kept
                let metadata = if file_type.is_symlink() {
                    std::fs::metadata(&path)
                } else {
                    std::fs::symlink_metadata(&path)
                };

                match metadata {
                    Ok(metadata) => self.process_file_entry(path, &metadata),
                    Err(e) => Some(self.handle_io_error(&path, e)),
                }
            }
            Err(e) => {
                let path = e
                    .path()
                    .map_or_else(|| self.root.clone(), std::borrow::ToOwned::to_owned);
                Some(self.handle_jwalk_error(path, e))
            }
        })
    }

    /// Create a FileEntry if the metadata describes a regular file that passes filters.
    fn process_file_entry(
        &self,
        path: PathBuf,
        metadata: &Metadata,
    ) -> Option<Result<FileEntry, ScanError>> {
        if !metadata.is_file() {
            log::trace!("Skipping non-regular file: {}", path.display());
            return None;
        }

        let size = metadata.len();
        if !self.passes_size_filter(size) {
            log::trace!(
                "Skipping file due to size filter ({}): {}",
                size,
                path.display()
            );
            return None;
        }

        Some(Ok(FileEntry::new(path, size)))
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: io::Error) -> Result<FileEntry, ScanError> {
        use std::io::ErrorKind;

        match error.kind() {
            ErrorKind::PermissionDenied => Err(ScanError::PermissionDenied(path.to_path_buf())),
            ErrorKind::NotFound => Err(ScanError::NotFound(path.to_path_buf())),
            _ => Err(ScanError::Io {
                path: path.to_path_buf(),
                source: error,
            }),
        }
    }

    /// Handle jwalk errors.
    fn handle_jwalk_error(&self, path: PathBuf, error: jwalk::Error) -> Result<FileEntry, ScanError> {
        match error.io_error().map(io::Error::kind) {
            Some(io::ErrorKind::PermissionDenied) => Err(ScanError::PermissionDenied(path)),
            Some(io::ErrorKind::NotFound) => Err(ScanError::NotFound(path)),
            _ => Err(ScanError::Io {
                path,
                source: io::Error::other(error.to_string()),
            }),
        }
    }
}

/// Walk every root on its own thread, sending files into `sink`.
///
/// Each thread owns a clone of `sink`; once all of them finish, the last
/// sender is dropped and the receiving side of the queue observes the end of
/// the stream. Traversal errors go to `report` and never stop a walk. Each
/// handle yields the number of files that thread emitted.
///
/// # Errors
///
/// Returns an error if a walker thread cannot be spawned.
pub fn walk_roots<R>(
    roots: Vec<PathBuf>,
    config: &WalkerConfig,
    sink: Sender<FileEntry>,
    report: Arc<R>,
    progress: Option<Arc<dyn ProgressCallback>>,
) -> io::Result<Vec<JoinHandle<usize>>>
where
    R: Fn(ScanError) + Send + Sync + 'static,
{
    let mut handles = Vec::with_capacity(roots.len());

    for (idx, root) in roots.into_iter().enumerate() {
        let tx = sink.clone();
        let report = Arc::clone(&report);
        let progress = progress.clone();
        let walker = Walker::new(&root, config.clone());

        let handle = thread::Builder::new()
            .name(format!("walker-{idx}"))
            .spawn(move || {
                log::debug!("Walking {}", walker.root().display());
                let mut emitted = 0usize;

                for result in walker.walk() {
                    match result {
                        Ok(file) => {
                            if let Some(ref cb) = progress {
                                cb.on_progress(Phase::Walking, &file.path);
                            }
                            if tx.send(file).is_err() {
                                log::debug!("File queue closed; stopping walk of {}", walker.root().display());
                                break;
                            }
                            emitted += 1;
                        }
                        Err(e) => report(e),
                    }
                }

                log::debug!("Finished {} ({} files)", walker.root().display(), emitted);
                emitted
            })?;
        handles.push(handle);
    }

    Ok(handles)
}
