//! Analysis configuration: filtering, token detection, code generation and parser options.

mod analysis_config;
mod mode;

pub use analysis_config::{
    CodeGenConfig, CodeGenTemplate, ContextualRule, EndpointPatterns, FilteringConfig,
    ParserConfig, PriorityPattern, ScoreThresholds, TokenDetectionConfig, TokenDetectionScope,
};
pub use mode::AnalysisMode;

use serde::{Deserialize, Serialize};

/// Top-level configuration for a single `analyze()` invocation.
///
/// `mode` selects a preset; any field set explicitly in `filtering`,
/// `token_detection`, `code_generation` or `parser` overrides the preset's
/// default for that field (the `Custom` mode starts from library defaults
/// with no preset bias at all).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub mode: AnalysisMode,
    pub filtering: FilteringConfig,
    pub token_detection: TokenDetectionConfig,
    pub code_generation: CodeGenConfig,
    pub parser: ParserConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisMode::Automatic.preset()
    }
}

impl AnalysisConfig {
    /// Build the configuration a given mode implies, before any field overrides.
    pub fn for_mode(mode: AnalysisMode) -> Self {
        mode.preset()
    }
}
