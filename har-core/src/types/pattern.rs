//! Authentication-flow pattern matches produced by the pattern matcher (C6).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A pattern matched against a run of consecutive critical-path entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern_id: String,
    pub confidence: f64,
    /// Entry indices consumed by the match, in step order.
    pub steps: Vec<usize>,
    /// Named captures pulled out by the pattern's step extractors.
    pub extracted: BTreeMap<String, serde_json::Value>,
}

impl PatternMatch {
    pub fn start(&self) -> usize {
        self.steps.first().copied().unwrap_or(usize::MAX)
    }
}
