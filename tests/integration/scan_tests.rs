use dupepair::duplicates::{DuplicateFinder, FinderConfig};
use dupepair::output::{OrderedPair, OutputFormat};
use dupepair::scanner::WalkerConfig;
use std::collections::BTreeSet;
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

fn render_text(pairs: &[OrderedPair]) -> String {
    let mut buffer = Vec::new();
    {
        let mut out = OutputFormat::Text.writer(&mut buffer);
        for pair in pairs {
            out.write_pair(pair).unwrap();
        }
        out.finish().unwrap();
    }
    String::from_utf8(buffer).unwrap()
}

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (pairs, summary) = finder.find_pairs(vec![dir.path().to_path_buf()]).unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.files_discovered, 0);
    assert_eq!(summary.pairs, 0);
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a.txt"), b"content a");
    write(&dir.path().join("b.txt"), b"content b");
    write(&dir.path().join("c.txt"), b"content c");

    let finder = DuplicateFinder::with_defaults();
    let (pairs, summary) = finder.find_pairs(vec![dir.path().to_path_buf()]).unwrap();

    assert!(pairs.is_empty());
    assert_eq!(summary.files_discovered, 3);
    assert_eq!(summary.unique_fingerprints, 3);
}

#[test]
fn test_two_root_scenario_reports_single_pair() {
    let base = tempdir().unwrap();
    let a = base.path().join("A");
    let b = base.path().join("B");
    let f1 = write(&a.join("f1"), b"content1");
    write(&a.join("f2"), b"content2");
    let f3 = write(&b.join("f3"), b"content1");
    write(&b.join("f4"), b"content3");

    let finder = DuplicateFinder::with_defaults();
    let (pairs, summary) = finder.find_pairs(vec![a, b]).unwrap();

    assert_eq!(
        render_text(&pairs),
        format!("{}, {}\n", f1.display(), f3.display())
    );
    assert_eq!(summary.roots_scanned, 2);
    assert_eq!(summary.files_discovered, 4);
    assert!(!summary.has_errors());
}

#[test]
fn test_star_topology_for_identical_files() {
    let dir = tempdir().unwrap();
    let files: Vec<PathBuf> = (0..5)
        .map(|i| write(&dir.path().join(format!("copy{i}.bin")), b"same bytes"))
        .collect();

    let finder = DuplicateFinder::new(FinderConfig::default().with_fingerprint_workers(4));
    let (pairs, _) = finder.find_pairs(vec![dir.path().to_path_buf()]).unwrap();

    assert_eq!(pairs.len(), files.len() - 1);

    // One path (the representative) is in every pair; every other file
    // appears exactly once.
    let hub = files
        .iter()
        .find(|f| pairs.iter().all(|p| &p.first == *f || &p.second == *f))
        .expect("a path shared by all pairs");
    for file in files.iter().filter(|f| *f != hub) {
        let count = pairs
            .iter()
            .filter(|p| &p.first == file || &p.second == file)
            .count();
        assert_eq!(count, 1, "{} should appear once", file.display());
    }
}

#[test]
fn test_empty_files_are_duplicates() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("empty1"), b"");
    write(&dir.path().join("empty2"), b"");
    write(&dir.path().join("empty3"), b"");
    write(&dir.path().join("full"), b"x");

    let finder = DuplicateFinder::with_defaults();
    let (pairs, summary) = finder.find_pairs(vec![dir.path().to_path_buf()]).unwrap();

    assert_eq!(pairs.len(), 2);
    assert!(pairs
        .iter()
        .all(|p| !p.first.ends_with("full") && !p.second.ends_with("full")));
    assert_eq!(summary.files_discovered, 4);
}

#[test]
fn test_same_size_different_content_not_paired() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("a"), b"aaaa");
    write(&dir.path().join("b"), b"bbbb");

    let (pairs, _) = DuplicateFinder::with_defaults()
        .find_pairs(vec![dir.path().to_path_buf()])
        .unwrap();

    assert!(pairs.is_empty());
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let top = write(&dir.path().join("a.txt"), b"nested dup");
    let deep = write(&dir.path().join("x/y/z/b.txt"), b"nested dup");

    let (pairs, _) = DuplicateFinder::with_defaults()
        .find_pairs(vec![dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(pairs, vec![OrderedPair::new(top, deep)]);
}

#[test]
fn test_every_pair_is_ordered() {
    let dir = tempdir().unwrap();
    for name in ["zeta", "alpha", "mid", "beta"] {
        write(&dir.path().join(name), b"shared");
    }

    let (pairs, _) = DuplicateFinder::with_defaults()
        .find_pairs(vec![dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(pairs.len(), 3);
    for pair in &pairs {
        assert!(pair.first.as_os_str() < pair.second.as_os_str());
    }
}

#[test]
fn test_repeated_runs_produce_same_lines() {
    let dir = tempdir().unwrap();
    for i in 0..30 {
        write(
            &dir.path().join(format!("d{}/f{i}", i % 3)),
            format!("group {}", i % 5).as_bytes(),
        );
    }

    let run = |workers: usize| -> BTreeSet<BTreeSet<PathBuf>> {
        let config = FinderConfig::default()
            .with_fingerprint_workers(workers)
            .with_detector_workers(workers);
        let (pairs, _) = DuplicateFinder::new(config)
            .find_pairs(vec![dir.path().to_path_buf()])
            .unwrap();
        assert_eq!(pairs.len(), 25);
        groups_of(&pairs)
    };

    // The representative of a group can differ between runs; the files it
    // is paired with cannot.
    let first = run(1);
    let second = run(8);

    assert_eq!(first, second);
    assert_eq!(first.len(), 5);
    assert!(first.iter().all(|g| g.len() == 6));
}

/// Merge star-shaped pairs back into their content groups.
fn groups_of(pairs: &[OrderedPair]) -> BTreeSet<BTreeSet<PathBuf>> {
    let mut groups: Vec<BTreeSet<PathBuf>> = Vec::new();
    for pair in pairs {
        match groups
            .iter_mut()
            .find(|g| g.contains(&pair.first) || g.contains(&pair.second))
        {
            Some(group) => {
                group.insert(pair.first.clone());
                group.insert(pair.second.clone());
            }
            None => groups.push([pair.first.clone(), pair.second.clone()].into()),
        }
    }
    groups.into_iter().collect()
}

#[test]
fn test_min_size_filter_applies_to_scan() {
    let dir = tempdir().unwrap();
    write(&dir.path().join("small1"), b"ab");
    write(&dir.path().join("small2"), b"ab");
    write(&dir.path().join("big1"), &[7u8; 2048]);
    write(&dir.path().join("big2"), &[7u8; 2048]);

    let walker_config = WalkerConfig {
        min_size: Some(1024),
        ..WalkerConfig::default()
    };
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (pairs, summary) = finder.find_pairs(vec![dir.path().to_path_buf()]).unwrap();

    assert_eq!(pairs.len(), 1);
    assert!(pairs[0].first.ends_with("big1"));
    assert_eq!(summary.files_discovered, 2);
}
