//! Resource-type tagging and endpoint characteristics produced by the classifier.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Tags a request can carry. A single entry may carry more than one —
/// a login form POST is typically `Authentication ∧ FormSubmission`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ResourceType {
    Authentication,
    ApiEndpoint,
    FormSubmission,
    HtmlDocument,
    StaticAsset,
    Tracking,
    ThirdParty,
    Websocket,
    FileUpload,
    Graphql,
    SessionManagement,
    Unknown,
}

impl ResourceType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Authentication => "authentication",
            Self::ApiEndpoint => "api_endpoint",
            Self::FormSubmission => "form_submission",
            Self::HtmlDocument => "html_document",
            Self::StaticAsset => "static_asset",
            Self::Tracking => "tracking",
            Self::ThirdParty => "third_party",
            Self::Websocket => "websocket",
            Self::FileUpload => "file_upload",
            Self::Graphql => "graphql",
            Self::SessionManagement => "session_management",
            Self::Unknown => "unknown",
        }
    }
}

/// A parameter's inferred purpose, used to decide `EndpointCharacteristics`
/// and later to steer credential/token placeholder substitution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ParameterType {
    Jwt,
    ApiKey,
    OAuthState,
    Credential,
    Csrf,
    SessionId,
    Other,
}

/// Derived properties of an endpoint, used by the scoring engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EndpointCharacteristics {
    pub has_authentication: bool,
    pub has_state_change: bool,
    pub has_data_submission: bool,
    pub has_sensitive_data: bool,
    pub is_idempotent: bool,
    pub parameter_types: BTreeSet<ParameterType>,
}
