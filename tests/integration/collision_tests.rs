use dupepair::duplicates::{DuplicateFinder, FinderConfig};
use dupepair::output::OrderedPair;
use dupepair::scanner::{FileEntry, Fingerprint, Fingerprinter, HashError};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::tempdir;

/// Fingerprint that only looks at the file length, so every same-size file
/// collides.
struct SizeOnlyFingerprinter;

impl Fingerprinter for SizeOnlyFingerprinter {
    fn fingerprint(&self, path: &Path, _buf: &mut [u8]) -> Result<Fingerprint, HashError> {
        let len = fs::metadata(path)
            .map_err(|e| HashError::from_io(path, e))?
            .len();
        let mut digest = [0u8; 32];
        digest[..8].copy_from_slice(&len.to_le_bytes());
        Ok(Fingerprint(digest))
    }
}

fn entry(path: &Path) -> FileEntry {
    FileEntry::new(path.to_path_buf(), fs::metadata(path).unwrap().len())
}

fn single_worker_finder() -> DuplicateFinder {
    let config = FinderConfig::default()
        .with_fingerprint_workers(1)
        .with_detector_workers(1);
    DuplicateFinder::with_fingerprinter(config, Arc::new(SizeOnlyFingerprinter))
}

#[test]
fn test_colliding_files_with_different_content_are_not_paired() {
    let dir = tempdir().unwrap();
    let files: Vec<PathBuf> = ["content1", "content2", "content3"]
        .iter()
        .enumerate()
        .map(|(i, c)| {
            let p = dir.path().join(format!("f{i}"));
            fs::write(&p, c).unwrap();
            p
        })
        .collect();

    let finder = DuplicateFinder::with_fingerprinter(
        FinderConfig::default(),
        Arc::new(SizeOnlyFingerprinter),
    );
    let (pairs, summary) = finder
        .find_pairs(vec![dir.path().to_path_buf()])
        .unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.unique_fingerprints, 1);
    assert_eq!(summary.collisions, files.len() - 1);
    assert!(!summary.has_errors());
}

#[test]
fn test_collision_does_not_replace_representative() {
    let dir = tempdir().unwrap();
    let x1 = dir.path().join("x1");
    let y = dir.path().join("y");
    let x2 = dir.path().join("x2");
    fs::write(&x1, "aaaa").unwrap();
    fs::write(&y, "bbbb").unwrap();
    fs::write(&x2, "aaaa").unwrap();

    // x1 registers, y collides and is dropped, x2 still matches x1
    let (pairs, summary) = single_worker_finder()
        .find_pairs_from_files(vec![entry(&x1), entry(&y), entry(&x2)])
        .unwrap();

    assert_eq!(pairs, vec![OrderedPair::new(x1, x2)]);
    assert_eq!(summary.collisions, 1);
    assert_eq!(summary.pairs, 1);
}

#[test]
fn test_real_fingerprint_has_no_collisions_on_same_size_files() {
    let dir = tempdir().unwrap();
    for (i, c) in ["aaaa", "bbbb", "cccc", "aaaa"].iter().enumerate() {
        fs::write(dir.path().join(format!("f{i}")), c).unwrap();
    }

    let (pairs, summary) = DuplicateFinder::with_defaults()
        .find_pairs(vec![dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(pairs.len(), 1);
    assert_eq!(summary.collisions, 0);
    assert_eq!(summary.unique_fingerprints, 3);
}
