//! Library-provided contextual predicates, selected by `condition_id` from
//! `FilteringConfig::contextual_rules` (§4.3, §6).

use har_core::constants::AUTH_URL_REGEX;
use har_core::types::HarEntry;
use regex::Regex;
use std::sync::OnceLock;

/// The slice of state a contextual predicate is evaluated against.
pub struct ScoringContext<'a> {
    pub previous_requests: &'a [HarEntry],
    pub all_entries: &'a [HarEntry],
    pub current_index: usize,
}

fn auth_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(AUTH_URL_REGEX).unwrap())
}

/// True iff any earlier entry in this run hit an auth-shaped URL.
fn follows_auth_request(ctx: &ScoringContext) -> bool {
    ctx.previous_requests.iter().any(|e| auth_url_re().is_match(&e.request.url))
}

/// True iff this entry sends a cookie that some earlier entry set.
fn shares_session_cookie(ctx: &ScoringContext) -> bool {
    let Some(current) = ctx.all_entries.get(ctx.current_index) else {
        return false;
    };
    let sent: std::collections::HashSet<&str> = current.request.cookies.iter().map(|c| c.name.as_str()).collect();
    ctx.previous_requests
        .iter()
        .any(|e| e.response.cookies.iter().any(|c| sent.contains(c.name.as_str())))
}

/// Dispatch a `condition_id` to its predicate. Unknown ids never fire,
/// rather than erroring — a config referencing a removed predicate degrades
/// to "rule contributes nothing" instead of aborting the run.
pub fn evaluate(condition_id: &str, ctx: &ScoringContext) -> bool {
    match condition_id {
        "follows_auth_request" => follows_auth_request(ctx),
        "shares_session_cookie" => shares_session_cookie(ctx),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use har_core::types::{HarRequest, HarResponse, NameValue, ResponseContent};

    fn entry(url: &str, resp_cookies: Vec<NameValue>, req_cookies: Vec<NameValue>) -> HarEntry {
        HarEntry {
            index: 0,
            started_at: Utc.timestamp_opt(0, 0).unwrap(),
            elapsed_ms: 0.0,
            request: HarRequest {
                method: "GET".to_string(),
                url: url.to_string(),
                http_version: "HTTP/1.1".to_string(),
                headers: Vec::new(),
                query: Vec::new(),
                cookies: req_cookies,
                body: None,
            },
            response: HarResponse {
                status: 200,
                http_version: "HTTP/1.1".to_string(),
                headers: Vec::new(),
                cookies: resp_cookies,
                content: ResponseContent::default(),
                redirect_url: None,
            },
        }
    }

    #[test]
    fn detects_follows_auth_request() {
        let entries = vec![entry("https://app.test/login", Vec::new(), Vec::new()), entry("https://app.test/next", Vec::new(), Vec::new())];
        let ctx = ScoringContext {
            previous_requests: &entries[..1],
            all_entries: &entries,
            current_index: 1,
        };
        assert!(follows_auth_request(&ctx));
    }

    #[test]
    fn detects_shared_session_cookie() {
        let entries = vec![
            entry("https://app.test/login", vec![NameValue::new("session", "abc")], Vec::new()),
            entry("https://app.test/next", Vec::new(), vec![NameValue::new("session", "abc")]),
        ];
        let ctx = ScoringContext {
            previous_requests: &entries[..1],
            all_entries: &entries,
            current_index: 1,
        };
        assert!(shares_session_cookie(&ctx));
    }
}
