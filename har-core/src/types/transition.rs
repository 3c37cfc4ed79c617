//! State-transition model (C7).

use serde::{Deserialize, Serialize};

/// Flow states an entry can be judged to occupy, either read off a matched
/// pattern's step semantics or inferred per-entry when no pattern matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FlowState {
    LoginPage,
    AuthSubmission,
    Redirect,
    SessionEstablished,
    Authenticated,
    /// A second factor challenge (OTP/TOTP/SMS code) between submission and
    /// session establishment. Annotated only — never solved or retried.
    MfaChallenge,
    General,
    /// A named state taken verbatim from a matched pattern's step labels,
    /// e.g. `AuthorizationGrant` from `oauth2_auth_code`.
    Named(String),
}

impl FlowState {
    pub fn label(&self) -> String {
        match self {
            Self::LoginPage => "LoginPage".to_string(),
            Self::AuthSubmission => "AuthSubmission".to_string(),
            Self::Redirect => "Redirect".to_string(),
            Self::SessionEstablished => "SessionEstablished".to_string(),
            Self::Authenticated => "Authenticated".to_string(),
            Self::MfaChallenge => "MfaChallenge".to_string(),
            Self::General => "General".to_string(),
            Self::Named(s) => s.clone(),
        }
    }
}

/// A single state change observed between two consecutive critical-path entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateTransition {
    pub from_state: FlowState,
    pub to_state: FlowState,
    pub trigger_entry_index: usize,
    pub confidence: f64,
}
