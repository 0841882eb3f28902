//! BLAKE3 file fingerprinting with streaming support.
//!
//! # Overview
//!
//! A fingerprint is the BLAKE3 digest of a file's whole content. It is
//! computed incrementally through a caller-owned buffer, so a worker reuses
//! one buffer for every file it reads and no file is ever fully resident.
//!
//! Fingerprints are not treated as collision-free: equal fingerprints are
//! only ever a reason to compare bytes (see [`crate::duplicates::verify`]).
//!
//! # Example
//!
//! ```no_run
//! use dupepair::scanner::{Fingerprinter, Hasher, DEFAULT_BUFFER_SIZE};
//! use std::path::Path;
//!
//! let hasher = Hasher::new();
//! let mut buf = vec![0u8; DEFAULT_BUFFER_SIZE];
//! let fingerprint = hasher.fingerprint(Path::new("Cargo.toml"), &mut buf).unwrap();
//! println!("{fingerprint}");
//! ```

use std::fmt;
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use super::HashError;

/// Size of the reusable read buffer used by fingerprint and verify workers.
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Fixed-width content digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Raw digest bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hash_to_hex(&self.0))
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({})", hash_to_hex(&self.0))
    }
}

/// Render a digest as lowercase hexadecimal.
#[must_use]
pub fn hash_to_hex(hash: &[u8; 32]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(64);
    for byte in hash {
        let _ = write!(out, "{byte:02x}");
    }
    out
}

/// Computes the content fingerprint of a file.
///
/// The pipeline only talks to this trait, so tests can substitute a
/// fingerprinter that forces collisions.
pub trait Fingerprinter: Send + Sync {
    /// Fingerprint the file at `path`, reading through `buf`.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    fn fingerprint(&self, path: &Path, buf: &mut [u8]) -> Result<Fingerprint, HashError>;
}

/// Streaming BLAKE3 fingerprinter.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hasher;

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Fingerprint a file with a freshly allocated buffer.
    ///
    /// Convenience wrapper for one-off use; pipeline workers call
    /// [`Fingerprinter::fingerprint`] with their own buffer.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] if the file cannot be opened or read.
    pub fn full_hash(&self, path: &Path) -> Result<Fingerprint, HashError> {
        let mut buf = vec![0u8; DEFAULT_BUFFER_SIZE];
        self.fingerprint(path, &mut buf)
    }
}

impl Fingerprinter for Hasher {
    fn fingerprint(&self, path: &Path, buf: &mut [u8]) -> Result<Fingerprint, HashError> {
        let mut file = File::open(path).map_err(|e| HashError::from_io(path, e))?;
        let mut hasher = blake3::Hasher::new();

        loop {
            let n = match file.read(buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(HashError::from_io(path, e)),
            };
            hasher.update(&buf[..n]);
        }

        Ok(Fingerprint(*hasher.finalize().as_bytes()))
    }
}
