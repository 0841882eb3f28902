use dupepair::duplicates::{DuplicateFinder, FinderConfig};
use dupepair::output::OrderedPair;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(path: &Path, content: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    File::create(path).unwrap().write_all(content).unwrap();
    path.to_path_buf()
}

#[test]
fn test_scan_two_non_overlapping_directories() {
    let dir1 = tempdir().unwrap();
    let dir2 = tempdir().unwrap();
    let a = write(&dir1.path().join("a.txt"), b"dup");
    let b = write(&dir2.path().join("b.txt"), b"dup");

    let finder = DuplicateFinder::with_defaults();
    let (pairs, summary) = finder
        .find_pairs(vec![dir1.path().to_path_buf(), dir2.path().to_path_buf()])
        .unwrap();

    assert_eq!(pairs, vec![OrderedPair::new(a, b)]);
    assert_eq!(summary.roots_scanned, 2);
    assert_eq!(summary.files_discovered, 2);
}

#[test]
fn test_scan_overlapping_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("sub");
    let a = write(&dir.path().join("a.txt"), b"content");
    let b = write(&sub.join("b.txt"), b"content");

    // The nested root is covered by its parent and must not be walked twice
    let finder = DuplicateFinder::with_defaults();
    let (pairs, summary) = finder
        .find_pairs(vec![sub.clone(), dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(pairs, vec![OrderedPair::new(a, b)]);
    assert_eq!(summary.roots_scanned, 1);
    assert_eq!(summary.files_discovered, 2);
    assert!(!summary.has_errors());
}

#[test]
fn test_scan_same_directory_twice() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content");
    write(&dir.path().join("b.txt"), b"content");

    let finder = DuplicateFinder::with_defaults();
    let (pairs, summary) = finder
        .find_pairs(vec![dir.path().to_path_buf(), dir.path().to_path_buf()])
        .unwrap();

    // A file reached through both roots would otherwise pair with itself
    assert_eq!(pairs.len(), 1);
    assert_eq!(summary.roots_scanned, 1);
}

#[test]
fn test_sibling_prefix_directories_are_distinct_roots() {
    let base = tempdir().unwrap();
    let photos = base.path().join("photos");
    let photos_old = base.path().join("photos-old");
    let a = write(&photos.join("img.raw"), b"pixels");
    let b = write(&photos_old.join("img.raw"), b"pixels");

    let (pairs, summary) = DuplicateFinder::with_defaults()
        .find_pairs(vec![photos, photos_old])
        .unwrap();

    assert_eq!(pairs, vec![OrderedPair::new(a, b)]);
    assert_eq!(summary.roots_scanned, 2);
}

#[test]
fn test_many_roots_with_small_queues() {
    let base = tempdir().unwrap();
    let roots: Vec<PathBuf> = (0..6)
        .map(|r| {
            let root = base.path().join(format!("root{r}"));
            for f in 0..10 {
                write(&root.join(format!("f{f}")), format!("file {f}").as_bytes());
            }
            root
        })
        .collect();

    let config = FinderConfig::default()
        .with_fingerprint_workers(3)
        .with_detector_workers(2)
        .with_queue_capacity(2);
    let (pairs, summary) = DuplicateFinder::new(config).find_pairs(roots).unwrap();

    // 10 contents, each present in 6 roots: 10 * (6 - 1) pairs
    assert_eq!(pairs.len(), 50);
    assert_eq!(summary.unique_fingerprints, 10);
    assert_eq!(summary.files_discovered, 60);
}
