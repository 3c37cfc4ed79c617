//! The closed error taxonomy (§7). Only these variants can abort a pipeline
//! run; everything else is demoted to a `Warning` on the result.

use super::error_code::{self, HarErrorCode};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("input is empty or whitespace-only")]
    EmptyInput,

    #[error("invalid HAR document: {message}")]
    InvalidFormat { message: String },

    #[error("HAR log.entries is empty")]
    NoRequests,

    #[error("filtering removed every candidate entry")]
    NoRelevantRequests,

    #[error("parser exceeded its {timeout_secs}s deadline")]
    ParseTimeout { timeout_secs: u64 },

    #[error("analysis was cancelled during stage '{stage}'")]
    Aborted { stage: String },

    #[error("internal invariant violated: {detail}")]
    InternalInvariantViolation { detail: String },
}

impl HarErrorCode for PipelineError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyInput => error_code::EMPTY_INPUT,
            Self::InvalidFormat { .. } => error_code::INVALID_FORMAT,
            Self::NoRequests => error_code::NO_REQUESTS,
            Self::NoRelevantRequests => error_code::NO_RELEVANT_REQUESTS,
            Self::ParseTimeout { .. } => error_code::PARSE_TIMEOUT,
            Self::Aborted { .. } => error_code::ABORTED,
            Self::InternalInvariantViolation { .. } => error_code::INTERNAL_INVARIANT_VIOLATION,
        }
    }
}
