//! The event-handler seam: the orchestrator writes, the caller reads.
//! Replaces the source's event-emitter backbone with a plain trait object
//! so the pipeline stays synchronous and single-threaded end to end.

use super::types::{EntryErrorEvent, ProgressEvent, WarningEvent};

/// Implemented by whatever the caller wants to drive a progress bar, log
/// sink, or test probe with. All methods have no-op defaults so a caller
/// that only cares about progress doesn't have to implement the rest.
pub trait AnalysisEventHandler {
    fn on_progress(&self, _event: &ProgressEvent) {}
    fn on_warning(&self, _event: &WarningEvent) {}
    fn on_entry_error(&self, _event: &EntryErrorEvent) {}
    fn on_aborted(&self, _last_stage: &str) {}
}

/// The default handler for callers that don't care about progress at all.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullEventHandler;

impl AnalysisEventHandler for NullEventHandler {}
