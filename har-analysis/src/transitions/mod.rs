//! State-Transition Modeler (C7): reads transitions off the best pattern
//! match when one exists, otherwise infers per-entry state (§4.6).

use std::sync::OnceLock;

use har_core::types::{FlowState, FxHashSet, HarEntry, PatternMatch, StateTransition};
use regex::Regex;

const MFA_PATTERN: &str = r"(?i)(mfa|2fa|otp|verification.?code|totp)";

fn auth_url_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(har_core::constants::AUTH_URL_REGEX).unwrap())
}

fn mfa_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(MFA_PATTERN).unwrap())
}

/// Step names from the pattern library that map onto a named flow state;
/// anything else keeps its literal step name via `FlowState::Named`.
fn state_for_step_name(step_name: &str) -> FlowState {
    match step_name {
        "login_page" => FlowState::LoginPage,
        "form_submit" | "credential_exchange" => FlowState::AuthSubmission,
        "authorize" => FlowState::LoginPage,
        "token_exchange" | "authorized_call" => FlowState::Authenticated,
        other => FlowState::Named(other.to_string()),
    }
}

/// Infer a single entry's flow state from URL/method/response (§4.6).
pub fn infer_state(entry: &HarEntry) -> FlowState {
    let is_auth_url = auth_url_re().is_match(&entry.request.url);
    let is_mfa = mfa_re().is_match(&entry.request.url)
        || entry.request.body.as_ref().and_then(|b| b.text.as_deref()).map(|t| mfa_re().is_match(t)).unwrap_or(false);

    if is_mfa {
        return FlowState::MfaChallenge;
    }
    if (300..400).contains(&entry.response.status) {
        return FlowState::Redirect;
    }
    if entry
        .response
        .cookies
        .iter()
        .any(|c| c.name.to_lowercase().contains("session") || c.name.to_lowercase().contains("auth"))
    {
        return FlowState::SessionEstablished;
    }
    if is_auth_url && entry.request.method.eq_ignore_ascii_case("GET") {
        return FlowState::LoginPage;
    }
    if is_auth_url && entry.request.method.eq_ignore_ascii_case("POST") {
        return FlowState::AuthSubmission;
    }
    if is_auth_url && (200..300).contains(&entry.response.status) {
        return FlowState::Authenticated;
    }
    FlowState::General
}

fn transition_confidence(prev: &HarEntry, next: &HarEntry) -> f64 {
    let mut confidence: f64 = 0.7;
    if next.request.header("referer").map(|r| r.contains(&prev.request.url)).unwrap_or(false) {
        confidence += 0.2;
    }
    let set_by_prev: Vec<String> = prev.response.set_cookie_names();
    let sent_by_next: FxHashSet<String> = next.request.cookies.iter().map(|c| c.name.to_lowercase()).collect();
    if set_by_prev.iter().any(|n| sent_by_next.contains(n)) {
        confidence += 0.1;
    }
    confidence.min(1.0)
}

/// Per-entry flow state for `path`: where the best pattern match covers an
/// entry, its step name wins (`state_for_step_name`); every other entry falls
/// back to per-entry inference (§4.6). Shared by `model_transitions` and the
/// block builder so both label an entry with the same state.
pub fn label_states(path: &[HarEntry], best_match: Option<&PatternMatch>) -> Vec<FlowState> {
    match best_match {
        Some(pattern_match) if !pattern_match.steps.is_empty() => {
            let patterns = crate::patterns::built_in_patterns();
            let pattern = patterns.iter().find(|p| p.id == pattern_match.pattern_id);
            path.iter()
                .map(|entry| {
                    pattern
                        .and_then(|p| {
                            pattern_match
                                .steps
                                .iter()
                                .position(|&idx| idx == entry.index)
                                .and_then(|pos| p.steps.get(pos))
                                .map(|step| state_for_step_name(step.name))
                        })
                        .unwrap_or_else(|| infer_state(entry))
                })
                .collect()
        }
        _ => path.iter().map(infer_state).collect(),
    }
}

/// Build transitions for `path`, preferring the best pattern match's step
/// semantics when one exists, otherwise falling back to per-entry inference.
#[tracing::instrument(skip_all, fields(path_len = path.len()))]
pub fn model_transitions(path: &[HarEntry], best_match: Option<&PatternMatch>) -> Vec<StateTransition> {
    let states = label_states(path, best_match);

    let mut transitions = Vec::new();
    for i in 0..path.len().saturating_sub(1) {
        if states[i] != states[i + 1] {
            transitions.push(StateTransition {
                from_state: states[i].clone(),
                to_state: states[i + 1].clone(),
                trigger_entry_index: path[i + 1].index,
                confidence: transition_confidence(&path[i], &path[i + 1]),
            });
        }
    }
    transitions
}

/// Flow-completeness score for QA/reporting (§4.6).
pub fn flow_completeness(
    primary_pattern_confidence: Option<f64>,
    path: &[HarEntry],
    transitions: &[StateTransition],
) -> f64 {
    let states: Vec<FlowState> = path.iter().map(infer_state).collect();
    let has = |want: &FlowState| states.iter().any(|s| s == want);
    let critical_present = [has(&FlowState::LoginPage), has(&FlowState::AuthSubmission), has(&FlowState::SessionEstablished)]
        .iter()
        .filter(|b| **b)
        .count() as f64
        / 3.0;

    let transition_coverage = if path.len() <= 1 {
        0.0
    } else {
        transitions.len() as f64 / (path.len() - 1) as f64
    };

    let a = primary_pattern_confidence.unwrap_or(0.0) * 0.7;
    let b = critical_present * 0.6;
    let c = transition_coverage * 0.8;
    a.max(b).max(c)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use har_core::types::{HarRequest, HarResponse, NameValue, ResponseContent};

    fn entry(index: usize, method: &str, url: &str, status: u16, set_cookie: Option<&str>) -> HarEntry {
        HarEntry {
            index,
            started_at: Utc.timestamp_opt(index as i64, 0).unwrap(),
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
                cookies: set_cookie.map(|n| vec![NameValue::new(n, "x")]).unwrap_or_default(),
                content: ResponseContent::default(),
                redirect_url: None,
            },
        }
    }

    #[test]
    fn infers_login_page_and_submission_and_session() {
        let login = entry(0, "GET", "https://app.test/login", 200, None);
        let submit = entry(1, "POST", "https://app.test/login", 200, Some("session_id"));
        assert_eq!(infer_state(&login), FlowState::LoginPage);
        assert_eq!(infer_state(&submit), FlowState::SessionEstablished);
    }

    #[test]
    fn mfa_url_is_detected() {
        let otp = entry(0, "GET", "https://app.test/mfa/verify", 200, None);
        assert_eq!(infer_state(&otp), FlowState::MfaChallenge);
    }

    #[test]
    fn emits_transition_for_each_state_change() {
        let path = vec![
            entry(0, "GET", "https://app.test/login", 200, None),
            entry(1, "POST", "https://app.test/login", 200, Some("session")),
        ];
        let transitions = model_transitions(&path, None);
        assert_eq!(transitions.len(), 1);
        assert_eq!(transitions[0].from_state, FlowState::LoginPage);
        assert_eq!(transitions[0].to_state, FlowState::SessionEstablished);
    }
}
