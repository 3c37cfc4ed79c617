//! Per-entry scoring output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::har::HarEntry;
use super::resource::{EndpointCharacteristics, ResourceType};

/// The five independently-computed sub-scores, each clamped to `[0, 100]`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct SubScores {
    pub relevance: f64,
    pub security: f64,
    pub business: f64,
    pub temporal: f64,
    pub contextual: f64,
}

impl SubScores {
    pub fn mean(&self) -> f64 {
        (self.relevance + self.security + self.business + self.temporal + self.contextual) / 5.0
    }

    /// Population variance of the five sub-scores.
    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        let vals = [
            self.relevance,
            self.security,
            self.business,
            self.temporal,
            self.contextual,
        ];
        vals.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / vals.len() as f64
    }
}

/// A HAR entry after classification and scoring. Owns no data the parser
/// didn't already own — `entry` is the validated `HarEntry` it was scored
/// from, carried by value since the orchestrator hands ownership downstream
/// by index rather than by reference once entries are filtered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredEntry {
    pub entry: HarEntry,
    pub resource_types: BTreeSet<ResourceType>,
    pub characteristics: EndpointCharacteristics,
    pub sub_scores: SubScores,
    pub final_score: f64,
    pub confidence: f64,
}

impl ScoredEntry {
    pub fn index(&self) -> usize {
        self.entry.index
    }

    pub fn has_type(&self, t: ResourceType) -> bool {
        self.resource_types.contains(&t)
    }
}
