//! dupepair - Concurrent exact duplicate file finder
//!
//! Walks one or more directory trees, fingerprints every regular file with
//! BLAKE3 and confirms each fingerprint match byte for byte. The stages run
//! concurrently and are connected by bounded queues:
//!
//! ```text
//! walkers → fingerprint pool → duplicate detector → result collector
//! ```
//!
//! Each confirmed duplicate is reported as a pair of paths. Files with the
//! same content form a star around the first one seen: n identical files
//! yield n − 1 pairs.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
pub mod scanner;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::CommandFactory;

use crate::cli::Cli;
use crate::config::Config;
use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::ExitCode;
use crate::progress::Progress;

/// Build the pipeline configuration from defaults, the config file and the
/// command line, later layers winning.
#[must_use]
pub fn build_finder_config(cli: &Cli, file: &Config) -> FinderConfig {
    let mut config = file.apply(FinderConfig::default());

    if let Some(jobs) = cli.jobs {
        config = config.with_fingerprint_workers(jobs);
        if cli.detector_jobs.is_none() && file.detector_jobs.is_none() {
            config = config.with_detector_workers(jobs);
        }
    }
    if let Some(jobs) = cli.detector_jobs {
        config = config.with_detector_workers(jobs);
    }
    if let Some(capacity) = cli.queue_capacity {
        config = config.with_queue_capacity(capacity);
    }

    let walker = &mut config.walker_config;
    walker.skip_hidden |= cli.skip_hidden;
    walker.follow_symlinks |= cli.follow_symlinks;
    walker.min_size = cli.min_size;
    walker.max_size = cli.max_size;
    walker
        .ignore_patterns
        .extend(cli.ignore_patterns.iter().cloned());

    config
}

/// Run the application, writing results to stdout.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be started or stdout cannot be
/// written.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    let stdout = io::stdout();
    run_app_with_output(cli, io::BufWriter::new(stdout.lock()))
}

/// Run the application, writing results (or the usage text) to `out`.
///
/// Returns [`ExitCode::PartialSuccess`] if any path was skipped.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be started or `out` cannot be
/// written.
pub fn run_app_with_output<W: Write>(cli: Cli, mut out: W) -> Result<ExitCode> {
    if cli.paths.is_empty() {
        Cli::command()
            .write_help(&mut out)
            .context("Failed to write usage")?;
        out.flush().context("Failed to write usage")?;
        return Ok(ExitCode::Success);
    }

    let file_config = Config::load_or_default(cli.config.as_deref());
    let mut finder_config = build_finder_config(&cli, &file_config);
    if cli.progress && !cli.quiet {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(false)));
    }
    log::debug!("Finder configuration: {:?}", finder_config);

    let finder = DuplicateFinder::new(finder_config);
    let mut stream = finder
        .spawn(cli.paths)
        .context("Failed to start duplicate scan")?;

    let mut writer = cli.output.writer(&mut out);
    for pair in stream.by_ref() {
        writer
            .write_pair(&pair)
            .context("Failed to write results")?;
    }
    writer.finish().context("Failed to write results")?;
    drop(writer);

    let summary = stream.finish();
    if summary.has_errors() {
        log::warn!(
            "{} path(s) skipped because of errors; results may be incomplete",
            summary.errors.len()
        );
        Ok(ExitCode::PartialSuccess)
    } else {
        Ok(ExitCode::Success)
    }
}
