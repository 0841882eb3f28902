//! Progress reporting utilities using indicatif.
//!
//! The three pipeline stages run at the same time, so progress is shown as
//! one spinner per stage rather than sequential bars. Totals are unknown
//! while the walk is still running.

use std::path::Path;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Pipeline stage a progress event belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Files discovered by the walkers
    Walking,
    /// Files fingerprinted by the fingerprint pool
    Fingerprinting,
    /// Records resolved by the duplicate detector
    Detecting,
}

impl Phase {
    /// All phases, in pipeline order.
    pub const ALL: [Phase; 3] = [Phase::Walking, Phase::Fingerprinting, Phase::Detecting];

    /// Short label used in progress output.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Phase::Walking => "walking",
            Phase::Fingerprinting => "fingerprinting",
            Phase::Detecting => "detecting",
        }
    }

    fn index(self) -> usize {
        match self {
            Phase::Walking => 0,
            Phase::Fingerprinting => 1,
            Phase::Detecting => 2,
        }
    }
}

/// Progress callback for pipeline stages.
///
/// Implementations are shared across worker threads.
pub trait ProgressCallback: Send + Sync {
    /// Called when a stage starts.
    fn on_phase_start(&self, phase: Phase);

    /// Called for each item a stage processes.
    fn on_progress(&self, phase: Phase, path: &Path);

    /// Called after a file has been fingerprinted, with its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a confirmed duplicate pair is emitted.
    fn on_pair_found(&self) {}

    /// Called when a stage completes.
    fn on_phase_end(&self, phase: Phase);
}

/// Progress reporter drawing one spinner per stage on stderr.
///
/// The three spinners are created up front and never replaced, so workers
/// update them without any shared lock.
pub struct Progress {
    _multi: MultiProgress,
    bars: [ProgressBar; 3],
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, no spinners will be displayed.
    ///
    /// ```
    /// use dupepair::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let multi = if quiet {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };
        let bars = Phase::ALL.map(|phase| {
            let pb = multi.add(ProgressBar::new_spinner());
            pb.set_style(Self::spinner_style());
            pb.set_prefix(phase.label());
            pb
        });

        Self {
            _multi: multi,
            bars,
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {prefix:>14} [{elapsed_precise}] {pos} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn bar(&self, phase: Phase) -> &ProgressBar {
        &self.bars[phase.index()]
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: Phase) {
        if self.quiet {
            return;
        }

        self.bar(phase).enable_steady_tick(Duration::from_millis(100));
    }

    fn on_progress(&self, phase: Phase, path: &Path) {
        let pb = self.bar(phase);
        pb.inc(1);
        if !self.quiet {
            pb.set_message(truncate_path(&path.to_string_lossy(), 40));
        }
    }

    fn on_pair_found(&self) {
        if self.quiet {
            return;
        }

        self.bar(Phase::Detecting).set_message("duplicate found");
    }

    fn on_phase_end(&self, phase: Phase) {
        self.bar(phase).finish_with_message("done");
    }
}

/// Truncate a path for display in the progress line.
fn truncate_path(path: &str, max_len: usize) -> String {
    if path.chars().count() <= max_len {
        return path.to_string();
    }

    let file_name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let name_len = file_name.chars().count();
    if name_len + 4 > max_len {
        let tail: String = file_name.chars().skip(name_len + 3 - max_len).collect();
        return format!("...{tail}");
    }

    format!(".../{file_name}")
}
