//! Top-level pipeline output.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::block::BlockIR;
use super::har::HarEntry;
use super::pattern::PatternMatch;
use super::token::DetectedToken;
use super::transition::StateTransition;

/// Counters surfaced for QA/reporting alongside the emitted script.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisMetrics {
    pub entries_parsed: usize,
    pub entries_skipped: usize,
    pub entries_scored: usize,
    pub entries_filtered: usize,
    pub critical_path_len: usize,
    pub redundant_count: usize,
    pub tokens_detected: usize,
    pub flow_completeness: f64,
    pub parse_ms: u64,
    pub score_ms: u64,
    pub correlation_ms: u64,
    pub pattern_ms: u64,
    pub token_ms: u64,
    pub codegen_ms: u64,
}

/// A non-fatal condition surfaced alongside a successful result (§7).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Warning {
    UnsupportedHarVersion { version: String },
    EntrySkipped { index: usize, reason: String },
    LargeResponseTruncated { index: usize },
}

/// The composite result of a single `analyze()` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub blocks: Vec<BlockIR>,
    pub script: String,
    pub critical_path: Vec<HarEntry>,
    pub matched_patterns: Vec<PatternMatch>,
    pub detected_tokens_by_name: BTreeMap<String, Vec<DetectedToken>>,
    pub transitions: Vec<StateTransition>,
    pub metrics: AnalysisMetrics,
    pub warnings: Vec<Warning>,
}
