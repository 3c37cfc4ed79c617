//! Cooperative cancellation for the streaming parser and pipeline stages.

use std::sync::atomic::{AtomicBool, Ordering};

/// A cheap, clonable-by-reference cancellation flag. Checked between
/// entries and between pipeline stages; never interrupts in-flight work.
#[derive(Debug, Default)]
pub struct Cancellation {
    flag: AtomicBool,
}

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&self) {
        self.flag.store(false, Ordering::Relaxed);
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }

    pub fn as_atomic(&self) -> &AtomicBool {
        &self.flag
    }
}
