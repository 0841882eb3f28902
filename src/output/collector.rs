//! Result collector.
//!
//! Drains [`DuplicatePair`]s from the detector queue and orders the two
//! paths of each pair. Pairs are never merged into groups: a representative
//! shared by several pairs appears in each of them.

use std::cmp::Ordering;
use std::fmt;
use std::path::{Path, PathBuf};

use crossbeam_channel::Receiver;
use serde::Serialize;

use crate::duplicates::DuplicatePair;

/// A duplicate pair with `first < second` lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct OrderedPair {
    /// The lexicographically smaller path
    pub first: PathBuf,
    /// The lexicographically larger path
    pub second: PathBuf,
}

impl OrderedPair {
    /// Order `a` and `b` into a pair.
    #[must_use]
    pub fn new(a: PathBuf, b: PathBuf) -> Self {
        if compare_paths(&a, &b) == Ordering::Greater {
            Self {
                first: b,
                second: a,
            }
        } else {
            Self {
                first: a,
                second: b,
            }
        }
    }
}

impl From<DuplicatePair> for OrderedPair {
    fn from(pair: DuplicatePair) -> Self {
        Self::new(pair.representative, pair.duplicate)
    }
}

impl fmt::Display for OrderedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.first.display(), self.second.display())
    }
}

/// Byte-wise comparison of the full path strings.
///
/// Unlike `Path`'s own `Ord`, which compares component by component, this
/// sorts `a-b` before `a/b`.
fn compare_paths(a: &Path, b: &Path) -> Ordering {
    a.as_os_str().cmp(b.as_os_str())
}

/// Iterator over the ordered pairs of a running pipeline.
///
/// Yields pairs in arrival order and ends when every detector has exited.
pub struct ResultCollector {
    pairs: Receiver<DuplicatePair>,
}

impl ResultCollector {
    /// Collect from the detector output queue.
    #[must_use]
    pub fn new(pairs: Receiver<DuplicatePair>) -> Self {
        Self { pairs }
    }
}

impl Iterator for ResultCollector {
    type Item = OrderedPair;

    fn next(&mut self) -> Option<Self::Item> {
        self.pairs.recv().ok().map(OrderedPair::from)
    }
}
