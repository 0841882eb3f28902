//! Unicode path normalization and root preparation.
//!
//! macOS stores file names in NFD (decomposed) form while most other
//! platforms use NFC, so the same visual root can arrive with two byte
//! representations. Roots are compared through [`path_key`] before the walk
//! so that duplicated or nested roots are traversed only once.
//!
//! # Example
//!
//! ```
//! use dupepair::scanner::path_utils::{normalize_path_str, path_key};
//! use std::path::Path;
//!
//! let nfc = "café";
//! let nfd = "cafe\u{0301}";
//! assert_eq!(normalize_path_str(nfc), normalize_path_str(nfd));
//! assert_eq!(path_key(Path::new(nfc)), path_key(Path::new(nfd)));
//! ```

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use unicode_normalization::UnicodeNormalization;

use super::ScanError;

/// Normalize a path string to NFC (Composed) form.
#[must_use]
pub fn normalize_path_str(s: &str) -> String {
    s.nfc().collect()
}

/// Normalize a [`Path`] to NFC form.
///
/// If the path contains invalid UTF-8, returns the original path unchanged.
///
/// ```
/// use std::path::PathBuf;
/// use dupepair::scanner::path_utils::normalize_pathbuf;
///
/// let path = PathBuf::from("documents/cafe\u{0301}.txt");
/// assert_eq!(normalize_pathbuf(&path), PathBuf::from("documents/café.txt"));
/// ```
#[must_use]
pub fn normalize_pathbuf(path: &Path) -> PathBuf {
    match path.to_str() {
        Some(s) => PathBuf::from(normalize_path_str(s)),
        None => path.to_path_buf(),
    }
}

/// Create a normalized comparison key for a path.
///
/// If the path contains invalid UTF-8, the lossy conversion is used.
#[must_use]
pub fn path_key(path: &Path) -> String {
    normalize_path_str(&path.to_string_lossy())
}

/// Validate roots and collapse duplicates and nested roots.
///
/// Returns the roots to traverse, in the order given, together with an
/// error for every root that is missing or not a directory. A root whose
/// canonical location equals or lies inside another accepted root is
/// dropped, since its files are already reached through that root.
///
/// The returned roots keep the caller's spelling so reported paths stay
/// relative to what the caller passed in.
#[must_use]
pub fn normalize_roots(roots: &[PathBuf]) -> (Vec<PathBuf>, Vec<ScanError>) {
    let mut errors = Vec::new();
    let mut candidates: Vec<(PathBuf, PathBuf)> = Vec::with_capacity(roots.len());

    for root in roots {
        match fs::metadata(root) {
            Ok(meta) if meta.is_dir() => {
                let canonical = fs::canonicalize(root).unwrap_or_else(|_| root.clone());
                candidates.push((root.clone(), normalize_pathbuf(&canonical)));
            }
            Ok(_) => errors.push(ScanError::NotADirectory(root.clone())),
            Err(e) => errors.push(match e.kind() {
                ErrorKind::NotFound => ScanError::NotFound(root.clone()),
                ErrorKind::PermissionDenied => ScanError::PermissionDenied(root.clone()),
                _ => ScanError::Io {
                    path: root.clone(),
                    source: e,
                },
            }),
        }
    }

    // Shallowest first, so a parent is accepted before any of its children
    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by_key(|&i| candidates[i].1.components().count());

    let mut accepted: Vec<&Path> = Vec::with_capacity(candidates.len());
    let mut keep = vec![false; candidates.len()];
    for i in order {
        let key = candidates[i].1.as_path();
        if accepted.iter().any(|parent| key.starts_with(parent)) {
            log::debug!(
                "Skipping root {} (already covered by another root)",
                candidates[i].0.display()
            );
            continue;
        }
        accepted.push(key);
        keep[i] = true;
    }

    let kept = candidates
        .iter()
        .zip(keep)
        .filter_map(|((root, _), keep)| keep.then(|| root.clone()))
        .collect();

    (kept, errors)
}
