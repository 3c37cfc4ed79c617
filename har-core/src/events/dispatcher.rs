//! Throttled dispatch: the parser only wants to emit progress "at most every
//! 10 entries" (§4.1); the dispatcher owns that bookkeeping so stages don't
//! each reimplement it.

use std::cell::Cell;

use super::handler::AnalysisEventHandler;
use super::types::{EntryErrorEvent, ProgressEvent, Stage, WarningEvent};

/// Wraps a `&dyn AnalysisEventHandler` with throttling for high-frequency
/// per-entry progress and pass-through for the low-frequency stage/warning events.
pub struct EventDispatcher<'a> {
    handler: &'a dyn AnalysisEventHandler,
    every_n: usize,
    count: Cell<usize>,
}

impl<'a> EventDispatcher<'a> {
    pub fn new(handler: &'a dyn AnalysisEventHandler) -> Self {
        Self {
            handler,
            every_n: 10,
            count: Cell::new(0),
        }
    }

    pub fn with_throttle(handler: &'a dyn AnalysisEventHandler, every_n: usize) -> Self {
        Self {
            handler,
            every_n: every_n.max(1),
            count: Cell::new(0),
        }
    }

    /// Emit a per-entry progress tick, throttled to `every_n` calls.
    pub fn tick_entry(&self, event: ProgressEvent) {
        let n = self.count.get() + 1;
        self.count.set(n);
        if n % self.every_n == 0 {
            self.handler.on_progress(&event);
        }
    }

    /// Emit a pipeline stage checkpoint unconditionally.
    pub fn stage(&self, stage: Stage) {
        tracing::info!(stage = stage.name(), percent = stage.percent(), "pipeline stage");
        self.handler.on_progress(&stage.into());
    }

    /// Demote a recoverable condition to a warning, mirroring the teacher's
    /// `tracing::warn!` on non-fatal scan errors (`scanner.rs::scan`).
    pub fn warning(&self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(%message, "recoverable condition");
        self.handler.on_warning(&WarningEvent { message });
    }

    pub fn entry_error(&self, index: usize, reason: impl Into<String>, phase: impl Into<String>) {
        let reason = reason.into();
        let phase = phase.into();
        tracing::warn!(index, reason = %reason, phase = %phase, "entry skipped");
        self.handler.on_entry_error(&EntryErrorEvent { index, reason, phase });
    }

    pub fn aborted(&self, last_stage: &str) {
        tracing::warn!(stage = last_stage, "analysis aborted");
        self.handler.on_aborted(last_stage);
    }
}
