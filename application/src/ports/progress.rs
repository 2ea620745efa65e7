//! Progress notification port
//!
//! Defines the interface for reporting progress during a resolution round.

use ensemble_domain::{Model, Phase, ResolutionResult};

/// Callback for progress updates during a resolution
///
/// Implementations live in the presentation layer and can display
/// progress in various ways (console spinner, plain log lines, ...).
pub trait ProgressNotifier: Send + Sync {
    /// Called when a phase starts
    fn on_phase_start(&self, phase: &Phase, total_tasks: usize);

    /// Called when one provider call completes within a phase
    fn on_task_complete(&self, phase: &Phase, model: &Model, success: bool);

    /// Called when a phase completes
    fn on_phase_complete(&self, phase: &Phase);

    /// Called when the answer was served from the cache
    fn on_cache_hit(&self, _result: &ResolutionResult) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_phase_start(&self, _phase: &Phase, _total_tasks: usize) {}
    fn on_task_complete(&self, _phase: &Phase, _model: &Model, _success: bool) {}
    fn on_phase_complete(&self, _phase: &Phase) {}
}
