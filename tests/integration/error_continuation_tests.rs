use dupepair::duplicates::{DuplicateFinder, FinderConfig, PipelineError};
use dupepair::output::OrderedPair;
use dupepair::scanner::{FileEntry, HashError, ScanError};
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_missing_files_are_reported_and_skipped() {
    let finder = DuplicateFinder::with_defaults();
    let file1 = FileEntry::new(PathBuf::from("nonexistent_1.txt"), 100);
    let file2 = FileEntry::new(PathBuf::from("nonexistent_2.txt"), 100);

    let (pairs, summary) = finder.find_pairs_from_files(vec![file1, file2]).unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.errors.len(), 2);
    for err in &summary.errors {
        match err {
            PipelineError::Read(HashError::NotFound(_)) => {}
            other => panic!("Expected NotFound read error, got: {:?}", other),
        }
    }
}

#[test]
fn test_missing_root_does_not_stop_other_roots() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a"), "dup").unwrap();
    fs::write(dir.path().join("b"), "dup").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (pairs, summary) = finder
        .find_pairs(vec![
            dir.path().join("does-not-exist"),
            dir.path().to_path_buf(),
        ])
        .unwrap();

    assert_eq!(pairs.len(), 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(matches!(
        summary.errors[0],
        PipelineError::Traversal(ScanError::NotFound(_))
    ));
}

#[test]
fn test_file_given_as_root_is_reported() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("plain.txt");
    fs::write(&file, "x").unwrap();

    let (pairs, summary) = DuplicateFinder::with_defaults()
        .find_pairs(vec![file])
        .unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.roots_scanned, 0);
    assert!(matches!(
        summary.errors[0],
        PipelineError::Traversal(ScanError::NotADirectory(_))
    ));
}

#[test]
fn test_malformed_record_is_protocol_error() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a");
    let b = dir.path().join("b");
    fs::write(&a, "same").unwrap();
    fs::write(&b, "same").unwrap();

    // One worker per stage keeps delivery order; the same file delivered
    // twice must not pair with itself
    let config = FinderConfig::default()
        .with_fingerprint_workers(1)
        .with_detector_workers(1);
    let (pairs, summary) = DuplicateFinder::new(config)
        .find_pairs_from_files(vec![
            FileEntry::new(a.clone(), 4),
            FileEntry::new(a.clone(), 4),
            FileEntry::new(b.clone(), 4),
        ])
        .unwrap();

    assert_eq!(pairs, vec![OrderedPair::new(a, b)]);
    assert_eq!(summary.errors.len(), 1);
    assert!(matches!(summary.errors[0], PipelineError::Protocol(_)));
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::write(&locked, "same").unwrap();
    fs::write(dir.path().join("a"), "same").unwrap();
    fs::write(dir.path().join("b"), "same").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root ignores permission bits; nothing to observe in that case
    if fs::read(&locked).is_ok() {
        return;
    }

    let (pairs, summary) = DuplicateFinder::with_defaults()
        .find_pairs(vec![dir.path().to_path_buf()])
        .unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(pairs.len(), 1);
    assert_eq!(summary.errors.len(), 1);
    assert!(matches!(
        summary.errors[0],
        PipelineError::Read(HashError::PermissionDenied(_))
    ));
}
