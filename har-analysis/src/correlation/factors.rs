//! The five weighted correlation factors (§4.4) and `auth_relevance`.

use std::collections::BTreeMap;

use har_core::constants::{AUTH_RESPONSE_REGEX, AUTH_URL_REGEX};
use har_core::types::{CorrelationCell, FxHashSet, HarEntry};
use percent_encoding::percent_decode_str;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn auth_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(AUTH_URL_REGEX).unwrap())
}

fn auth_response_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(AUTH_RESPONSE_REGEX).unwrap())
}

fn token_name_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?i)"([a-z_]*token[a-z_]*|csrf|session[a-z_]*)"\s*:\s*"([^"\\]{4,})""#).unwrap())
}

/// Parsed `Url` falls back to bare string splitting for the malformed or
/// relative URLs HAR producers sometimes record.
fn parsed(url: &str) -> Option<Url> {
    Url::parse(url).ok()
}

fn host_of(url: &str) -> String {
    parsed(url)
        .and_then(|u| u.host_str().map(|h| h.to_lowercase()))
        .unwrap_or_else(|| url.split("//").nth(1).and_then(|rest| rest.split('/').next()).unwrap_or("").to_lowercase())
}

fn path_of(url: &str) -> String {
    parsed(url).map(|u| u.path().to_string()).unwrap_or_else(|| {
        url.split("//")
            .nth(1)
            .and_then(|rest| rest.split_once('/'))
            .map(|(_, path)| path)
            .unwrap_or("")
            .split(['?', '#'])
            .next()
            .unwrap_or("")
            .to_string()
    })
}

/// Decoded, non-empty path segments, so `%2F`-encoded separators and case
/// differences in percent-escapes don't defeat prefix comparison.
fn path_segments(url: &str) -> Vec<String> {
    let path = path_of(url);
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect()
}

fn referer_factor(i: &HarEntry, j: &HarEntry) -> f64 {
    let Some(referer) = j.request.header("referer") else {
        return 0.0;
    };
    if referer == i.request.url {
        return 1.0;
    }
    if host_of(referer) == host_of(&i.request.url) && !host_of(referer).is_empty() {
        return 0.7 + 0.3 * path_similarity(&i.request.url, referer);
    }
    0.0
}

fn path_similarity(a: &str, b: &str) -> f64 {
    let sa = path_segments(a);
    let sb = path_segments(b);
    let common = sa.iter().zip(sb.iter()).take_while(|(x, y)| x == y).count();
    let denom = sa.len().max(sb.len()).max(1);
    common as f64 / denom as f64
}

fn cookie_factor(i: &HarEntry, j: &HarEntry) -> f64 {
    let set_by_i: Vec<String> = i.response.set_cookie_names();
    if set_by_i.is_empty() {
        return 0.0;
    }
    let sent_by_j: FxHashSet<String> = j.request.cookies.iter().map(|c| c.name.to_lowercase()).collect();
    let overlap = set_by_i.iter().filter(|n| sent_by_j.contains(*n)).count();
    overlap as f64 / set_by_i.len().max(1) as f64
}

fn token_factor(i: &HarEntry, j: &HarEntry) -> f64 {
    let body = i.response.content.text.as_deref().unwrap_or("");
    let values: Vec<String> = token_name_re().captures_iter(body).map(|c| c[2].to_string()).collect();
    if values.is_empty() {
        return 0.0;
    }

    let mut haystack = j.request.url.clone();
    haystack.push(' ');
    if let Some(body) = j.request.body.as_ref().and_then(|b| b.text.as_ref()) {
        haystack.push_str(body);
        haystack.push(' ');
    }
    for h in &j.request.headers {
        haystack.push_str(&h.value);
        haystack.push(' ');
    }

    let reappearing = values.iter().filter(|v| haystack.contains(v.as_str())).count();
    reappearing as f64 / values.len() as f64
}

fn temporal_factor(i: &HarEntry, j: &HarEntry) -> f64 {
    let delta_s = i.delta_ms(j) / 1000.0;
    if delta_s < 1.0 {
        1.0
    } else if delta_s < 10.0 {
        1.0 - 0.9 * ((delta_s - 1.0) / 9.0)
    } else {
        0.1
    }
}

fn url_path_factor(i: &HarEntry, j: &HarEntry) -> f64 {
    let sa = path_segments(&i.request.url);
    let sb = path_segments(&j.request.url);
    let common = sa.iter().zip(sb.iter()).take_while(|(x, y)| x == y).count();
    let denom = sa.len().max(sb.len()).max(1);
    common as f64 / denom as f64
}

/// Compute the combined correlation cell between two entries (§4.4).
pub fn correlate(i: &HarEntry, j: &HarEntry) -> CorrelationCell {
    let mut factors = BTreeMap::new();
    factors.insert("referer".to_string(), referer_factor(i, j));
    factors.insert("cookie".to_string(), cookie_factor(i, j));
    factors.insert("token".to_string(), token_factor(i, j));
    factors.insert("temporal".to_string(), temporal_factor(i, j));
    factors.insert("url_path".to_string(), url_path_factor(i, j));

    let score = factors["referer"] * 0.25 + factors["cookie"] * 0.20 + factors["token"] * 0.20 + factors["temporal"] * 0.20 + factors["url_path"] * 0.15;

    CorrelationCell { score, factors }
}

/// `auth_relevance` seeds the critical-path walk (§4.4 step 1).
pub fn auth_relevance(entry: &HarEntry) -> f64 {
    let url_match = auth_url_re().is_match(&entry.request.url);
    let mut score: f64 = 0.0;
    if url_match {
        score += 0.4;
    }
    if url_match && entry.request.method.eq_ignore_ascii_case("POST") {
        score += 0.3;
    }
    let body_match = entry
        .response
        .content
        .text
        .as_deref()
        .map(|t| auth_response_re().is_match(t))
        .unwrap_or(false);
    if entry.response.status == 200 && body_match {
        score += 0.3;
    }
    score.min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use har_core::types::{HarRequest, HarResponse, NameValue, ResponseContent};

    fn make(url: &str, method: &str, secs: i64, headers: Vec<NameValue>, cookies: Vec<NameValue>, resp_text: Option<&str>, resp_cookies: Vec<NameValue>) -> HarEntry {
        HarEntry {
            index: 0,
            started_at: Utc.timestamp_opt(secs, 0).unwrap(),
            elapsed_ms: 0.0,
            request: HarRequest {
                method: method.to_string(),
                url: url.to_string(),
                http_version: "HTTP/1.1".to_string(),
                headers,
                query: Vec::new(),
                cookies,
                body: None,
            },
            response: HarResponse {
                status: 200,
                http_version: "HTTP/1.1".to_string(),
                headers: Vec::new(),
                cookies: resp_cookies,
                content: ResponseContent { size: 0, mime: "text/html".to_string(), text: resp_text.map(|s| s.to_string()), encoding: None },
                redirect_url: None,
            },
        }
    }

    #[test]
    fn unrelated_entries_far_apart_score_low() {
        let i = make("https://app.test/a", "GET", 0, Vec::new(), Vec::new(), None, Vec::new());
        let j = make("https://other.test/b", "GET", 30, Vec::new(), Vec::new(), None, Vec::new());
        let cell = correlate(&i, &j);
        assert!(cell.score <= 0.03);
    }

    #[test]
    fn exact_referer_match_scores_full_factor() {
        let i = make("https://app.test/login", "GET", 0, Vec::new(), Vec::new(), None, Vec::new());
        let j = make("https://app.test/submit", "POST", 0, vec![NameValue::new("Referer", "https://app.test/login")], Vec::new(), None, Vec::new());
        assert_eq!(referer_factor(&i, &j), 1.0);
    }

    #[test]
    fn auth_relevance_rewards_post_to_login_with_session_response() {
        let entry = make("https://app.test/login", "POST", 0, Vec::new(), Vec::new(), Some("session established"), Vec::new());
        assert!(auth_relevance(&entry) >= 0.9);
    }
}
