//! Typed HAR (HTTP Archive) data model.
//!
//! Mirrors the HAR 1.1/1.2 `log.entries[]` shape closely enough to round-trip
//! the fields the pipeline cares about, while normalising the parts that
//! downstream stages actually query (header/cookie lookup is case-insensitive,
//! `started_at` is a real timestamp instead of an RFC3339 string).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single name/value pair, used for headers, cookies and query/post params.
/// Ordering as recorded by the browser is preserved; name comparisons are
/// case-insensitive per HTTP semantics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameValue {
    pub name: String,
    pub value: String,
}

impl NameValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Look up the first value whose name matches case-insensitively.
pub fn find_ci<'a>(pairs: &'a [NameValue], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|p| p.name.eq_ignore_ascii_case(name))
        .map(|p| p.value.as_str())
}

/// All values whose name matches case-insensitively, in recorded order.
pub fn find_all_ci<'a>(pairs: &'a [NameValue], name: &str) -> Vec<&'a str> {
    pairs
        .iter()
        .filter(|p| p.name.eq_ignore_ascii_case(name))
        .map(|p| p.value.as_str())
        .collect()
}

/// A parsed `postData` body: raw MIME, raw text (when present) and derived
/// name/value parameters (either transcribed from the HAR's own `params`
/// array, or derived by the parser from urlencoded/JSON text).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostData {
    pub mime: String,
    pub text: Option<String>,
    #[serde(default)]
    pub params: Vec<NameValue>,
}

/// The `request` side of an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarRequest {
    pub method: String,
    pub url: String,
    pub http_version: String,
    #[serde(default)]
    pub headers: Vec<NameValue>,
    #[serde(default)]
    pub query: Vec<NameValue>,
    #[serde(default)]
    pub cookies: Vec<NameValue>,
    pub body: Option<PostData>,
}

impl HarRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_ci(&self.headers, name)
    }

    pub fn cookie(&self, name: &str) -> Option<&str> {
        find_ci(&self.cookies, name)
    }
}

/// The response `content` block: size, MIME, optional decoded text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseContent {
    pub size: i64,
    pub mime: String,
    pub text: Option<String>,
    pub encoding: Option<String>,
}

/// The `response` side of an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarResponse {
    pub status: u16,
    pub http_version: String,
    #[serde(default)]
    pub headers: Vec<NameValue>,
    #[serde(default)]
    pub cookies: Vec<NameValue>,
    pub content: ResponseContent,
    pub redirect_url: Option<String>,
}

impl HarResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_ci(&self.headers, name)
    }

    /// Every `Set-Cookie` name this response sets, lower-cased.
    pub fn set_cookie_names(&self) -> Vec<String> {
        self.cookies.iter().map(|c| c.name.to_lowercase()).collect()
    }
}

/// One validated, immutable HAR entry as produced by the streaming parser.
///
/// `index` is the entry's position in the original `log.entries` array and
/// is the stable identity every later stage (scoring, correlation, critical
/// path, tokens) refers back to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HarEntry {
    pub index: usize,
    pub started_at: DateTime<Utc>,
    pub elapsed_ms: f64,
    pub request: HarRequest,
    pub response: HarResponse,
}

impl HarEntry {
    /// Milliseconds between this entry's start and another's, always >= 0.
    pub fn delta_ms(&self, other: &HarEntry) -> f64 {
        (other.started_at - self.started_at).num_milliseconds().unsigned_abs() as f64
    }
}
