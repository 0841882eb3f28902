//! Logging infrastructure for dupepair.
//!
//! Structured logging goes through the `log` facade with an `env_logger`
//! backend writing to stderr, so stdout carries nothing but result lines.
//! Log levels are determined by (in priority order):
//!
//! 1. `RUST_LOG` environment variable (if set)
//! 2. CLI flags: `--quiet` (error only) or `--verbose` (debug/trace)
//! 3. Default: info level
//!
//! Pipeline workers log per-file detail at debug and trace; skipped paths
//! are logged at warn and the run summary at info.
//!
//! # Example
//!
//! ```rust,no_run
//! use dupepair::logging::init_logging;
//!
//! // -vv: trace, with thread names in every line
//! init_logging(2, false);
//! ```

use env_logger::{Builder, Target};
use log::LevelFilter;
use std::env;
use std::io::Write;

/// Initialize the logging subsystem based on CLI verbosity flags.
///
/// Call once, before any log output. A second call is ignored.
///
/// # Arguments
///
/// * `verbose` - Verbosity count from CLI (0=normal, 1=debug, 2+=trace)
/// * `quiet` - If true, only show errors (overridden by RUST_LOG)
pub fn init_logging(verbose: u8, quiet: bool) {
    let from_env = env::var("RUST_LOG").is_ok();

    let mut builder = Builder::new();
    builder.target(Target::Stderr);
    if from_env {
        builder.parse_default_env();
    } else {
        builder.filter_level(determine_level(verbose, quiet));
    }
    configure_format(&mut builder, verbose);

    if builder.try_init().is_err() {
        return;
    }

    if from_env {
        log::debug!(
            "Logging initialized from RUST_LOG: {:?}",
            env::var("RUST_LOG").ok()
        );
    } else {
        log::debug!("Logging initialized at level: {}", current_level_name());
    }
}

/// Map CLI flags to a level filter; `quiet` wins over `verbose`.
fn determine_level(verbose: u8, quiet: bool) -> LevelFilter {
    if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }
}

/// Configure the log line format.
///
/// Debug builds prefix a timestamp. At `-v` and above the emitting thread is
/// shown too, which tells the walker, fingerprint and detector workers apart.
fn configure_format(builder: &mut Builder, verbose: u8) {
    builder.format(move |buf, record| {
        let level = record.level();
        let style = buf.default_level_style(level);

        if cfg!(debug_assertions) {
            write!(buf, "{} ", buf.timestamp_seconds())?;
        }
        write!(buf, "{style}{level:<5}{style:#} ")?;
        if verbose >= 1 {
            let thread = std::thread::current();
            write!(buf, "[{}] ", thread.name().unwrap_or("main"))?;
        }
        if verbose >= 2 {
            write!(buf, "{}: ", record.module_path().unwrap_or("unknown"))?;
        }
        writeln!(buf, "{}", record.args())
    });
}

/// Get the current log level as a string.
pub fn current_level_name() -> &'static str {
    match log::max_level() {
        LevelFilter::Off => "off",
        LevelFilter::Error => "error",
        LevelFilter::Warn => "warn",
        LevelFilter::Info => "info",
        LevelFilter::Debug => "debug",
        LevelFilter::Trace => "trace",
    }
}
