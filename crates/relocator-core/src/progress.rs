use crate::engine::RelocationOutcome;

/// Trait for reporting relocation progress.
///
/// The CLI implements it with an indicatif bar. All methods have default
/// no-op implementations.
pub trait RelocationReporter {
    fn on_resolve_start(&self, _requested: usize) {}
    fn on_resolve_complete(&self, _resolved: usize, _duration_secs: f64) {}
    fn on_relocate_start(&self, _total: usize) {}
    fn on_outcome(&self, _index: usize, _outcome: &RelocationOutcome) {}
    fn on_relocate_complete(&self, _duration_secs: f64) {}
}

/// No-op progress reporter for silent operation.
pub struct SilentReporter;

impl RelocationReporter for SilentReporter {}
