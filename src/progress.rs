//! Progress reporting utilities using indicatif.
//!
//! This module provides the [`Progress`] struct which implements [`ProgressCallback`]
//! to show a line counter while a snapshot is read and a spinner per index
//! build phase.
//!
//! Progress goes to stderr, so it never mixes with query results on stdout.

use std::sync::Mutex;
use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Progress callback for snapshot loading and index building.
///
/// Phases reported by the library are `read`, `catalog`, `tables`, `tree`
/// and `hash`, in that order.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase
    /// * `total` - Number of items to process, or 0 when unknown
    fn on_phase_start(&self, phase: &str, total: usize);

    /// Called periodically while a phase runs.
    ///
    /// # Arguments
    ///
    /// * `current` - Items processed so far
    /// * `detail` - Optional detail text (may be empty)
    fn on_progress(&self, current: usize, detail: &str);

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Progress reporter using indicatif.
pub struct Progress {
    multi: MultiProgress,
    active: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use snapdex::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        let multi = if quiet {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::stderr())
        };
        Self {
            multi,
            active: Mutex::new(None),
            quiet,
        }
    }

    fn read_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}] {pos} lines")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn phase_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed_precise}] {len} entries")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }
}

/// Human label for a phase name.
fn phase_label(phase: &str) -> &str {
    match phase {
        "read" => "Reading snapshot",
        "catalog" => "Sorting catalog",
        "tables" => "Building lookup tables",
        "tree" => "Building tree",
        "hash" => "Hashing subtrees",
        other => other,
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, total: usize) {
        if self.quiet {
            return;
        }

        let pb = if phase == "read" {
            let pb = self.multi.add(ProgressBar::new_spinner());
            pb.set_style(Self::read_style());
            pb
        } else {
            let pb = self.multi.add(ProgressBar::new(total as u64));
            pb.set_style(Self::phase_style());
            pb
        };
        pb.set_message(phase_label(phase).to_string());
        pb.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut active) = self.active.lock() {
            *active = Some(pb);
        }
    }

    fn on_progress(&self, current: usize, detail: &str) {
        if self.quiet {
            return;
        }
        if let Ok(active) = self.active.lock() {
            if let Some(ref pb) = *active {
                pb.set_position(current as u64);
                if !detail.is_empty() {
                    pb.set_message(detail.to_string());
                }
            }
        }
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        if let Ok(mut active) = self.active.lock() {
            if let Some(pb) = active.take() {
                pb.finish_and_clear();
                log::debug!("{} complete", phase_label(phase));
            }
        }
    }
}
