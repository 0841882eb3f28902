//! Byte-exact comparison of two files.
//!
//! Used by the detector whenever a fingerprint is already taken. Sizes are
//! compared first; only same-size files are read, chunk by matched chunk,
//! through two caller-owned buffers.

use std::fs::{self, File};
use std::io::{ErrorKind, Read};
use std::path::Path;

use crate::scanner::{HashError, DEFAULT_BUFFER_SIZE};

/// Pair of equally sized read buffers reused across comparisons.
#[derive(Debug)]
pub struct CompareBuffers {
    left: Vec<u8>,
    right: Vec<u8>,
}

impl CompareBuffers {
    /// Allocate two buffers of `size` bytes each (at least one byte).
    #[must_use]
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            left: vec![0u8; size],
            right: vec![0u8; size],
        }
    }
}

impl Default for CompareBuffers {
    fn default() -> Self {
        Self::new(DEFAULT_BUFFER_SIZE)
    }
}

/// Whether the files at `a` and `b` have identical content.
///
/// Files of different current size are unequal without being read.
/// Otherwise both are read in matched chunks until a chunk differs or both
/// reach end of file together; reaching end of file at different points
/// (one file grew or shrank mid-compare) also means unequal.
///
/// # Errors
///
/// Returns [`HashError`] if either file cannot be inspected, opened or read.
pub fn files_equal(a: &Path, b: &Path, buffers: &mut CompareBuffers) -> Result<bool, HashError> {
    let size_a = fs::metadata(a).map_err(|e| HashError::from_io(a, e))?.len();
    let size_b = fs::metadata(b).map_err(|e| HashError::from_io(b, e))?.len();
    if size_a != size_b {
        log::trace!(
            "Size mismatch {} ({}) vs {} ({})",
            a.display(),
            size_a,
            b.display(),
            size_b
        );
        return Ok(false);
    }

    let mut file_a = File::open(a).map_err(|e| HashError::from_io(a, e))?;
    let mut file_b = File::open(b).map_err(|e| HashError::from_io(b, e))?;

    loop {
        let n_a = fill_chunk(&mut file_a, &mut buffers.left).map_err(|e| HashError::from_io(a, e))?;
        let n_b = fill_chunk(&mut file_b, &mut buffers.right).map_err(|e| HashError::from_io(b, e))?;

        if n_a != n_b {
            return Ok(false);
        }
        if n_a == 0 {
            return Ok(true);
        }
        if buffers.left[..n_a] != buffers.right[..n_b] {
            return Ok(false);
        }
    }
}

/// Read until `buf` is full or the reader is exhausted.
///
/// Returns the number of bytes placed in `buf`; less than `buf.len()` only
/// at end of file.
fn fill_chunk(reader: &mut impl Read, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
