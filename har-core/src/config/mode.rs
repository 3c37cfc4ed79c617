//! `AnalysisMode` unifies the source's two incompatible mode shapes (a fixed
//! enum of presets vs. a fully parameterised bag of knobs) into one enum
//! whose variants each resolve to a concrete `AnalysisConfig`. `Custom`
//! carries no bias of its own — callers who chose it are expected to set
//! every field on the `AnalysisConfig` they build explicitly.

use serde::{Deserialize, Serialize};

use super::analysis_config::{
    CodeGenConfig, CodeGenTemplate, EndpointPatterns, FilteringConfig, ParserConfig,
    ScoreThresholds, TokenDetectionConfig, TokenDetectionScope,
};
use super::AnalysisConfig;
use crate::types::ResourceType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisMode {
    /// Conservative defaults, no auto-detected include patterns — the
    /// caller is expected to have picked the interesting requests already.
    Manual,
    /// Broad scan biased toward auth/session/api traffic, widest token scope.
    Automatic,
    /// A middle ground: automatic filtering, but human-readable scripts
    /// (comments on, no aggressive error-handling scaffolding).
    Assisted,
    /// No preset bias; every field defaults to the library baseline.
    Custom,
}

impl Default for AnalysisMode {
    fn default() -> Self {
        Self::Automatic
    }
}

impl AnalysisMode {
    pub fn preset(self) -> AnalysisConfig {
        match self {
            Self::Manual => AnalysisConfig {
                mode: self,
                filtering: FilteringConfig {
                    endpoint_patterns: EndpointPatterns::default(),
                    resource_type_weights: Default::default(),
                    contextual_rules: Vec::new(),
                    score_thresholds: ScoreThresholds {
                        minimum: 40.0,
                        optimal: 85.0,
                    },
                },
                token_detection: TokenDetectionConfig {
                    scope: TokenDetectionScope::TargetedAnalysis,
                    custom_patterns: Vec::new(),
                },
                code_generation: CodeGenConfig {
                    template: CodeGenTemplate::SingleRequest,
                    include_comments: true,
                    error_handling: false,
                },
                parser: ParserConfig::default(),
            },
            Self::Automatic => AnalysisConfig {
                mode: self,
                filtering: FilteringConfig {
                    endpoint_patterns: EndpointPatterns::default(),
                    resource_type_weights: default_resource_weights(),
                    contextual_rules: default_contextual_rules(),
                    score_thresholds: ScoreThresholds::default(),
                },
                token_detection: TokenDetectionConfig {
                    scope: TokenDetectionScope::ComprehensiveScan,
                    custom_patterns: Vec::new(),
                },
                code_generation: CodeGenConfig {
                    template: CodeGenTemplate::MultiStepFlow,
                    include_comments: true,
                    error_handling: true,
                },
                parser: ParserConfig::default(),
            },
            Self::Assisted => AnalysisConfig {
                mode: self,
                filtering: FilteringConfig {
                    endpoint_patterns: EndpointPatterns::default(),
                    resource_type_weights: default_resource_weights(),
                    contextual_rules: default_contextual_rules(),
                    score_thresholds: ScoreThresholds {
                        minimum: 25.0,
                        optimal: 75.0,
                    },
                },
                token_detection: TokenDetectionConfig {
                    scope: TokenDetectionScope::ComprehensiveScan,
                    custom_patterns: Vec::new(),
                },
                code_generation: CodeGenConfig {
                    template: CodeGenTemplate::MultiStepFlow,
                    include_comments: true,
                    error_handling: false,
                },
                parser: ParserConfig::default(),
            },
            Self::Custom => AnalysisConfig {
                mode: self,
                filtering: FilteringConfig::default(),
                token_detection: TokenDetectionConfig::default(),
                code_generation: CodeGenConfig::default(),
                parser: ParserConfig::default(),
            },
        }
    }
}

fn default_resource_weights() -> std::collections::BTreeMap<ResourceType, i32> {
    use ResourceType::*;
    [
        (Authentication, 40),
        (ApiEndpoint, 20),
        (FormSubmission, 25),
        (SessionManagement, 30),
        (Graphql, 15),
        (FileUpload, 5),
        (HtmlDocument, 0),
        (StaticAsset, -40),
        (Tracking, -35),
        (ThirdParty, -20),
        (Websocket, -10),
        (Unknown, -5),
    ]
    .into_iter()
    .collect()
}

fn default_contextual_rules() -> Vec<super::analysis_config::ContextualRule> {
    vec![
        super::analysis_config::ContextualRule {
            condition_id: "follows_auth_request".to_string(),
            weight: 0.15,
        },
        super::analysis_config::ContextualRule {
            condition_id: "shares_session_cookie".to_string(),
            weight: 0.10,
        },
    ]
}
