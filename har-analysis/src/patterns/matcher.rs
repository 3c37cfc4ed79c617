//! Greedy prefix matching of the pattern library over the critical path (§4.5).

use std::collections::BTreeMap;

use har_core::types::{DetectedToken, HarEntry, PatternMatch};
use statrs::statistics::Statistics;

use super::library::built_in_patterns;
use super::types::{AuthenticationPattern, PatternStep};

/// Match every built-in pattern against every starting position in
/// `path`, returning successful matches sorted by confidence descending
/// (ties broken by earliest start, per §4.5).
#[tracing::instrument(skip_all, fields(path_len = path.len()))]
pub fn match_patterns(path: &[HarEntry], tokens_by_entry: &BTreeMap<usize, Vec<DetectedToken>>) -> Vec<PatternMatch> {
    let patterns = built_in_patterns();
    let mut matches = Vec::new();

    for pattern in &patterns {
        for start in 0..path.len() {
            if let Some(m) = try_match_at(pattern, path, start, tokens_by_entry) {
                matches.push(m);
            }
        }
    }

    matches.sort_by(|a, b| b.confidence.partial_cmp(&a.confidence).unwrap().then(a.start().cmp(&b.start())));
    matches
}

fn try_match_at(
    pattern: &AuthenticationPattern,
    path: &[HarEntry],
    start: usize,
    tokens_by_entry: &BTreeMap<usize, Vec<DetectedToken>>,
) -> Option<PatternMatch> {
    if start + pattern.steps.len() > path.len() {
        return None;
    }

    let mut steps = Vec::with_capacity(pattern.steps.len());
    let mut delays_ms = Vec::new();
    let mut any_tokens = false;

    for (offset, step) in pattern.steps.iter().enumerate() {
        let entry = &path[start + offset];
        if !step_matches(step, entry) {
            return None;
        }
        if let Some(timing) = &step.timing {
            if offset > 0 {
                let prev = &path[start + offset - 1];
                let delay = prev.delta_ms(entry);
                if delay < timing.min_delay_ms as f64 || delay > timing.max_delay_ms as f64 {
                    return None;
                }
                delays_ms.push(delay);
            }
        }
        if tokens_by_entry.get(&entry.index).is_some_and(|v| !v.is_empty()) {
            any_tokens = true;
        }
        steps.push(entry.index);
    }

    let mut confidence = pattern.base_confidence;
    if delays_ms.len() >= 2 {
        let mean = delays_ms.clone().mean();
        let std_dev = delays_ms.population_std_dev();
        if std_dev > mean / 2.0 {
            confidence *= 0.8;
        }
    }
    if any_tokens {
        confidence = (confidence * 1.1).min(1.0);
    }

    Some(PatternMatch {
        pattern_id: pattern.id.to_string(),
        confidence,
        steps,
        extracted: BTreeMap::new(),
    })
}

fn step_matches(step: &PatternStep, entry: &HarEntry) -> bool {
    if let Some(re) = &step.url_regex {
        if !re.is_match(&entry.request.url) {
            return false;
        }
    }
    if !step.methods.is_empty() && !step.methods.iter().any(|m| entry.request.method.eq_ignore_ascii_case(m)) {
        return false;
    }
    if !step.statuses.is_empty() && !step.statuses.contains(&entry.response.status) {
        return false;
    }
    for (name, re) in &step.header_regex {
        let header_value = entry.request.header(name).or_else(|| entry.response.header(name));
        match header_value {
            Some(v) if re.is_match(v) => {}
            _ => return false,
        }
    }
    if let Some(re) = &step.body_regex {
        let body = entry.request.body.as_ref().and_then(|b| b.text.as_deref()).unwrap_or("");
        let response_body = entry.response.content.text.as_deref().unwrap_or("");
        if !re.is_match(body) && !re.is_match(response_body) {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use har_core::types::{HarRequest, HarResponse, NameValue, PostData, ResponseContent};

    fn entry(index: usize, method: &str, url: &str, status: u16, secs: i64) -> HarEntry {
        HarEntry {
            index,
            started_at: Utc.timestamp_opt(secs, 0).unwrap(),
            elapsed_ms: 0.0,
            request: HarRequest {
                method: method.to_string(),
                url: url.to_string(),
                http_version: "HTTP/1.1".to_string(),
                headers: Vec::new(),
                query: Vec::new(),
                cookies: Vec::new(),
                body: None,
            },
            response: HarResponse {
                status,
                http_version: "HTTP/1.1".to_string(),
                headers: Vec::new(),
                cookies: Vec::new(),
                content: ResponseContent::default(),
                redirect_url: None,
            },
        }
    }

    #[test]
    fn matches_form_auth_csrf_sequence() {
        let mut login_page = entry(0, "GET", "https://app.test/login", 200, 0);
        login_page.response.content = ResponseContent {
            size: 0,
            mime: "text/html".to_string(),
            text: Some(r#"<input type="hidden" name="_token" value="abc123"/>"#.to_string()),
            encoding: None,
        };
        let mut submit = entry(1, "POST", "https://app.test/login", 302, 2);
        submit.request.body = Some(PostData {
            mime: "application/x-www-form-urlencoded".to_string(),
            text: Some("_token=abc123&username=u&password=p".to_string()),
            params: vec![NameValue::new("_token", "abc123")],
        });

        let path = vec![login_page, submit];
        let matches = match_patterns(&path, &BTreeMap::new());
        let found = matches.iter().find(|m| m.pattern_id == "form_auth_csrf");
        assert!(found.is_some());
        assert!(found.unwrap().confidence >= 0.8);
    }

    #[test]
    fn matches_oauth2_auth_code_sequence() {
        let authorize = entry(0, "GET", "https://idp.test/oauth/authorize?client_id=c&state=S1", 200, 0);
        let token = entry(1, "POST", "https://idp.test/oauth/token", 200, 1);
        let path = vec![authorize, token];
        let matches = match_patterns(&path, &BTreeMap::new());
        let found = matches.iter().find(|m| m.pattern_id == "oauth2_auth_code");
        assert!(found.is_some());
        assert!(found.unwrap().confidence >= 0.9);
    }

    #[test]
    fn no_match_when_sequence_absent() {
        let path = vec![entry(0, "GET", "https://app.test/dashboard", 200, 0)];
        let matches = match_patterns(&path, &BTreeMap::new());
        assert!(matches.is_empty());
    }
}
