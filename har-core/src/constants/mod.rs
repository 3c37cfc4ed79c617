//! Shared regex source strings and literal constants referenced by more than
//! one analysis stage. Kept as plain `&str` here (not precompiled `Regex`)
//! since `regex::Regex` isn't a har-core dependency — each consumer compiles
//! and caches its own copy.

/// Matches an auth-flow-shaped URL (§4.4 auth_relevance, §4.6 state inference).
pub const AUTH_URL_REGEX: &str = r"(?i)(login|signin|auth|token|session)";

/// Matches an auth-flow-shaped response body (§4.4 auth_relevance).
pub const AUTH_RESPONSE_REGEX: &str = r"(?i)(session|auth|token)";

/// KeyCheck success keywords (§4.8).
pub const SUCCESS_KEYWORDS: &[&str] = &["welcome", "dashboard", "logout", "profile", "account", "home"];

/// KeyCheck failure keywords (§4.8).
pub const FAILURE_KEYWORDS: &[&str] = &["invalid", "incorrect", "error", "failed", "denied", "wrong"];

/// Headers always preserved on emitted `Request` blocks, plus any `x-*` header (§4.8).
pub const PRESERVED_HEADERS: &[&str] = &[
    "user-agent",
    "referer",
    "origin",
    "content-type",
    "accept",
    "accept-language",
];

/// Sentinel substituted for a truncated oversize response body (§4.1).
pub const TRUNCATED_BODY_SENTINEL: &str = "[Content truncated]";

/// HAR versions accepted without a warning.
pub const SUPPORTED_HAR_VERSIONS: &[&str] = &["1.1", "1.2"];

pub fn is_credential_field(name: &str) -> bool {
    let lower = name.to_lowercase();
    matches!(
        lower.as_str(),
        "user" | "username" | "email" | "pass" | "password" | "pwd"
    )
}
