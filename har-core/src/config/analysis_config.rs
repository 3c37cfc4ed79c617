//! Filtering, token-detection, code-generation and parser configuration.
//!
//! Follows the scan-config pattern: every field is `Option`/has a serde
//! default so a config loaded from a partial JSON/TOML document still
//! produces sane behaviour, with `effective_*()` accessors applying defaults.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::types::ResourceType;

/// A regex pattern paired with a weight, used by `priority_patterns`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriorityPattern {
    pub regex: String,
    pub weight: f64,
}

/// Include/exclude/priority URL-matching rules for the scoring engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointPatterns {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
    pub priority: Vec<PriorityPattern>,
}

/// A named contextual predicate plus the weight it contributes when it fires.
/// `condition_id` selects one of the library-provided predicates (see
/// `har_analysis::scoring::contextual`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextualRule {
    pub condition_id: String,
    pub weight: f64,
}

/// Minimum/optimal score thresholds (§4.3).
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreThresholds {
    pub minimum: f64,
    pub optimal: f64,
}

impl Default for ScoreThresholds {
    fn default() -> Self {
        Self {
            minimum: 30.0,
            optimal: 80.0,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FilteringConfig {
    pub endpoint_patterns: EndpointPatterns,
    pub resource_type_weights: BTreeMap<ResourceType, i32>,
    pub contextual_rules: Vec<ContextualRule>,
    pub score_thresholds: ScoreThresholds,
}

/// Scope of the token-detection pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenDetectionScope {
    /// Run all seven extraction layers over every critical-path entry.
    ComprehensiveScan,
    /// Run only the cheap layers (header/cookie/regex); skip HTML/JSON parsing.
    TargetedAnalysis,
}

impl Default for TokenDetectionScope {
    fn default() -> Self {
        Self::ComprehensiveScan
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenDetectionConfig {
    pub scope: TokenDetectionScope,
    pub custom_patterns: Vec<String>,
}

/// Script template strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeGenTemplate {
    SingleRequest,
    MultiStepFlow,
}

impl Default for CodeGenTemplate {
    fn default() -> Self {
        Self::MultiStepFlow
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CodeGenConfig {
    pub template: CodeGenTemplate,
    pub include_comments: bool,
    pub error_handling: bool,
}

impl Default for CodeGenConfig {
    fn default() -> Self {
        Self {
            template: CodeGenTemplate::default(),
            include_comments: true,
            error_handling: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub batch_size: Option<usize>,
    pub max_entry_size: Option<u64>,
    pub large_response_threshold: Option<u64>,
    pub skip_large_responses: bool,
    pub parse_timeout_secs: Option<u64>,
    pub include_timing: bool,
    pub include_cache: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            batch_size: None,
            max_entry_size: None,
            large_response_threshold: None,
            skip_large_responses: false,
            parse_timeout_secs: None,
            include_timing: true,
            include_cache: false,
        }
    }
}

impl ParserConfig {
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.unwrap_or(100)
    }

    pub fn effective_max_entry_size(&self) -> u64 {
        self.max_entry_size.unwrap_or(10 * 1024 * 1024)
    }

    pub fn effective_large_response_threshold(&self) -> u64 {
        self.large_response_threshold.unwrap_or(1024 * 1024)
    }

    pub fn effective_parse_timeout_secs(&self) -> u64 {
        self.parse_timeout_secs.unwrap_or(60)
    }
}
