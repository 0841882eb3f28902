//! Command-line interface definitions for dupepair.
//!
//! This module defines all CLI arguments and options using the clap derive API.
//! Every argument that is not a flag is a root directory to scan; with no
//! roots the usage text is printed.
//!
//! # Example
//!
//! ```bash
//! # Compare two trees, one "a, b" line per duplicate pair
//! dupepair ~/photos /mnt/backup/photos
//!
//! # JSON lines for scripting, eight fingerprint workers
//! dupepair -j 8 --output json ~/Downloads
//!
//! # Size filters and ignore patterns
//! dupepair ~/src --min-size 1KB --ignore target/ --ignore '*.o'
//!
//! # Verbose mode for debugging
//! dupepair -v ~/Downloads
//! ```

use clap::Parser;
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Exact duplicate file finder.
///
/// Scans every PATH concurrently, fingerprints file contents and confirms
/// each candidate byte for byte. Prints one line per duplicate pair, the
/// lexicographically smaller path first.
#[derive(Debug, Parser)]
#[command(name = "dupepair")]
#[command(author, version)]
pub struct Cli {
    /// Directories to scan for duplicates
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Number of fingerprint worker threads (default: half the CPUs)
    #[arg(short, long, value_name = "N", value_parser = parse_count)]
    pub jobs: Option<usize>,

    /// Number of duplicate detector threads (default: same as --jobs)
    #[arg(long, value_name = "N", value_parser = parse_count)]
    pub detector_jobs: Option<usize>,

    /// Capacity of each queue between pipeline stages (default: 1024)
    #[arg(long, value_name = "N", value_parser = parse_count)]
    pub queue_capacity: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Minimum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Glob patterns to ignore (can be specified multiple times)
    ///
    /// These patterns are added to any .gitignore patterns found.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Follow symbolic links to directories during scan
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Show progress spinners on stderr
    #[arg(long)]
    pub progress: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Path to a JSON config file
    ///
    /// If not specified, a default platform-specific path is used.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Parse a strictly positive count (threads, queue slots).
///
/// # Errors
///
/// Returns an error if the value is not a number or is zero.
pub fn parse_count(s: &str) -> Result<usize, String> {
    let n: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid number: '{s}'"))?;
    if n == 0 {
        return Err("Value must be at least 1".to_string());
    }
    Ok(n)
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use dupepair::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MB").unwrap(), 1_000_000);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    // Find where the number ends and the suffix begins
    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    if num < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
