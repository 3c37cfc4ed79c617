//! The built-in pattern library (§4.5): `oauth2_auth_code`, `form_auth_csrf`,
//! `jwt_api_auth`.

use regex::Regex;

use super::types::{AuthenticationPattern, PatternStep, TimingConstraint};

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern library regex must compile")
}

fn oauth2_auth_code() -> AuthenticationPattern {
    let authorize = PatternStep {
        url_regex: Some(re(r"(?i)/oauth/?authorize")),
        methods: vec!["GET"],
        statuses: vec![200, 302],
        ..PatternStep::new("authorize")
    };
    let token = PatternStep {
        url_regex: Some(re(r"(?i)/oauth/?token")),
        methods: vec!["POST"],
        statuses: vec![200],
        timing: Some(TimingConstraint { min_delay_ms: 0, max_delay_ms: 60_000 }),
        ..PatternStep::new("token_exchange")
    };

    AuthenticationPattern {
        id: "oauth2_auth_code",
        steps: vec![authorize, token],
        base_confidence: 0.92,
        token_hint_patterns: vec![r"(?i)^state$", r"(?i)^(access|refresh)_token$", r"(?i)^code$"],
    }
}

fn form_auth_csrf() -> AuthenticationPattern {
    let login_page = PatternStep {
        url_regex: Some(re(r"(?i)/login|/signin")),
        methods: vec!["GET"],
        statuses: vec![200],
        ..PatternStep::new("login_page")
    };
    let submit = PatternStep {
        url_regex: Some(re(r"(?i)/login|/signin")),
        methods: vec!["POST"],
        statuses: vec![200, 302],
        timing: Some(TimingConstraint { min_delay_ms: 0, max_delay_ms: 300_000 }),
        ..PatternStep::new("form_submit")
    };

    AuthenticationPattern {
        id: "form_auth_csrf",
        steps: vec![login_page, submit],
        base_confidence: 0.85,
        token_hint_patterns: vec![r"(?i)_token$", r"(?i)^csrf"],
    }
}

fn jwt_api_auth() -> AuthenticationPattern {
    let login = PatternStep {
        url_regex: Some(re(r"(?i)/(api/)?(login|auth|token)")),
        methods: vec!["POST"],
        statuses: vec![200],
        ..PatternStep::new("credential_exchange")
    };
    let authed_call = PatternStep {
        header_regex: {
            let mut m = std::collections::BTreeMap::new();
            m.insert("authorization", re(r"(?i)^bearer\s+\S+"));
            m
        },
        statuses: vec![200],
        timing: Some(TimingConstraint { min_delay_ms: 0, max_delay_ms: 120_000 }),
        ..PatternStep::new("authorized_call")
    };

    AuthenticationPattern {
        id: "jwt_api_auth",
        steps: vec![login, authed_call],
        base_confidence: 0.88,
        token_hint_patterns: vec![r"(?i)^(access_token|id_token|jwt)$"],
    }
}

/// All built-in patterns, in the order they're attempted at each start index.
pub fn built_in_patterns() -> Vec<AuthenticationPattern> {
    vec![oauth2_auth_code(), form_auth_csrf(), jwt_api_auth()]
}
