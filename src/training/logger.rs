//! Structured logging for training runs.
//!
//! Messages go through the [`log`] facade; the embedding application picks
//! the backend. Call sites gate on [`Verbosity`] from the trainer
//! configuration, so a `Silent` run stays silent even with a logger
//! installed.

/// How much the trainer reports while running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// No output at all.
    Silent,
    /// Warnings only (e.g. feature count reconciliation).
    #[default]
    Warning,
    /// Phase transitions, progress and results.
    Info,
    /// Everything above plus per-phase detail.
    Debug,
}

/// Logger for the learn and evaluate loops.
#[derive(Debug, Clone, Copy)]
pub struct TrainingLogger {
    verbosity: Verbosity,
}

impl TrainingLogger {
    /// Create a logger gated at `verbosity`.
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }

    /// Announce the start of a run phase ("learning", "evaluating", ...).
    pub fn phase(&self, name: &str) {
        if self.verbosity >= Verbosity::Info {
            log::info!("{name} ...");
        }
    }

    /// Report loop progress as `current/total`.
    pub fn progress(&self, current: usize, total: usize) {
        if self.verbosity >= Verbosity::Info {
            log::info!("{current}/{total}");
        }
    }

    /// Report the final evaluation result.
    pub fn result(&self, accuracy: f32, positive: usize, total: usize) {
        if self.verbosity >= Verbosity::Info {
            log::info!("result: {accuracy} ({positive}/{total})");
        }
    }

    /// Warn about a configuration reconciliation.
    pub fn warn(&self, message: &str) {
        if self.verbosity >= Verbosity::Warning {
            log::warn!("{message}");
        }
    }
}
