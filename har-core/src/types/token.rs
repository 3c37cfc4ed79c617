//! Detected dynamic token model (C8).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// The closed classification set from the glossary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TokenClassification {
    CsrfToken,
    SessionToken,
    JwtAccess,
    JwtRefresh,
    OAuthState,
    OAuthCodeVerifier,
    OAuthCodeChallenge,
    Nonce,
    ViewState,
    EventValidation,
    CaptchaToken,
    ApiKey,
    BearerToken,
    CustomHeaderToken,
    FormBuildId,
    DrupalFormToken,
    LaravelToken,
    DjangoCsrf,
    RailsAuthenticity,
}

impl TokenClassification {
    /// Specificity rank used by cross-reference consolidation (§4.7): lower
    /// rank wins when two layers classify the same value differently.
    pub fn specificity_rank(&self) -> u8 {
        match self {
            Self::CsrfToken
            | Self::DjangoCsrf
            | Self::RailsAuthenticity
            | Self::DrupalFormToken
            | Self::LaravelToken
            | Self::FormBuildId => 0,
            Self::JwtAccess | Self::JwtRefresh => 1,
            Self::SessionToken => 2,
            Self::ApiKey => 3,
            Self::BearerToken => 4,
            Self::OAuthState => 5,
            Self::Nonce => 6,
            Self::ViewState | Self::EventValidation | Self::CaptchaToken => 7,
            Self::OAuthCodeVerifier | Self::OAuthCodeChallenge => 7,
            Self::CustomHeaderToken => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::CsrfToken => "CSRF_TOKEN",
            Self::SessionToken => "SESSION_TOKEN",
            Self::JwtAccess => "JWT_ACCESS",
            Self::JwtRefresh => "JWT_REFRESH",
            Self::OAuthState => "OAUTH_STATE",
            Self::OAuthCodeVerifier => "OAUTH_CODE_VERIFIER",
            Self::OAuthCodeChallenge => "OAUTH_CODE_CHALLENGE",
            Self::Nonce => "NONCE",
            Self::ViewState => "VIEWSTATE",
            Self::EventValidation => "EVENT_VALIDATION",
            Self::CaptchaToken => "CAPTCHA_TOKEN",
            Self::ApiKey => "API_KEY",
            Self::BearerToken => "BEARER_TOKEN",
            Self::CustomHeaderToken => "CUSTOM_HEADER_TOKEN",
            Self::FormBuildId => "FORM_BUILD_ID",
            Self::DrupalFormToken => "DRUPAL_FORM_TOKEN",
            Self::LaravelToken => "LARAVEL_TOKEN",
            Self::DjangoCsrf => "DJANGO_CSRF",
            Self::RailsAuthenticity => "RAILS_AUTHENTICITY",
        }
    }
}

/// Where on the entry a token value was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TokenLocation {
    Header,
    Body,
    Cookie,
    Url,
    Response,
}

/// Which extraction strategy produced a token, and that strategy's base confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExtractionLayer {
    HtmlForm,
    JsonResponse,
    Header,
    Cookie,
    ScriptVariable,
    MetaTag,
    Regex,
}

impl ExtractionLayer {
    pub fn base_confidence(&self) -> f64 {
        match self {
            Self::HtmlForm => 0.9,
            Self::JsonResponse => 0.85,
            Self::Cookie => 0.8,
            Self::Header => 0.75,
            Self::ScriptVariable => 0.7,
            Self::MetaTag => 0.65,
            Self::Regex => 0.5,
        }
    }
}

/// A dynamic value extracted from the recorded session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectedToken {
    pub name: String,
    pub value: String,
    pub classification: TokenClassification,
    pub location: TokenLocation,
    pub confidence: f64,
    pub extraction_layer: ExtractionLayer,
    /// Index of the entry this token was extracted from.
    pub source_entry: usize,
    pub meta: BTreeMap<String, serde_json::Value>,
}

impl DetectedToken {
    pub fn clamp_confidence(&mut self) {
        self.confidence = self.confidence.clamp(0.3, 1.0);
    }
}
