//! Progress/warning/error events the orchestrator publishes during `analyze()`.

use serde::{Deserialize, Serialize};

/// The eight fixed checkpoints the orchestrator walks through in order.
/// Names follow the source pipeline's stage vocabulary even where they
/// don't map 1:1 onto a single component (e.g. `Dependency` covers both
/// correlation-matrix construction and critical-path selection).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    Scoring,
    Behavioral,
    Dependency,
    Optimization,
    Mfa,
    Tokens,
    Codegen,
    Complete,
}

impl Stage {
    pub fn percent(&self) -> u8 {
        match self {
            Self::Scoring => 0,
            Self::Behavioral => 15,
            Self::Dependency => 30,
            Self::Optimization => 45,
            Self::Mfa => 60,
            Self::Tokens => 75,
            Self::Codegen => 90,
            Self::Complete => 100,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Scoring => "scoring",
            Self::Behavioral => "behavioral",
            Self::Dependency => "dependency",
            Self::Optimization => "optimization",
            Self::Mfa => "mfa",
            Self::Tokens => "tokens",
            Self::Codegen => "codegen",
            Self::Complete => "complete",
        }
    }
}

/// A single progress checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub percent: u8,
    pub stage: String,
}

impl From<Stage> for ProgressEvent {
    fn from(stage: Stage) -> Self {
        Self {
            percent: stage.percent(),
            stage: stage.name().to_string(),
        }
    }
}

/// A recoverable condition surfaced mid-run but not fatal to the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarningEvent {
    pub message: String,
}

/// Per-entry rejection, reported on the error channel rather than aborting the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryErrorEvent {
    pub index: usize,
    pub reason: String,
    pub phase: String,
}
