//! Endpoint Classifier (C3): tags each entry with `ResourceType`s by URL,
//! method and MIME inspection, and derives `EndpointCharacteristics` used
//! by the scoring engine.

mod rules;

use std::collections::BTreeSet;

use har_core::types::{EndpointCharacteristics, HarEntry, ParameterType, ResourceType};

use rules::RULES;

/// Classify a single entry against the built-in resource-type rule table.
/// A request may carry more than one tag; falls back to `Unknown` when no
/// rule matches.
pub fn classify_resource_types(entry: &HarEntry) -> BTreeSet<ResourceType> {
    let mut tags = BTreeSet::new();
    for rule in RULES {
        if (rule.matches)(entry) {
            tags.insert(rule.resource_type);
        }
    }
    if tags.is_empty() {
        tags.insert(ResourceType::Unknown);
    }
    tags
}

/// Derive `EndpointCharacteristics` from an entry and its resource tags.
pub fn characteristics(entry: &HarEntry, tags: &BTreeSet<ResourceType>) -> EndpointCharacteristics {
    let has_authentication = tags.contains(&ResourceType::Authentication);
    let is_idempotent = matches!(entry.request.method.to_uppercase().as_str(), "GET" | "HEAD" | "OPTIONS");
    let has_state_change = !is_idempotent && (200..400).contains(&entry.response.status);
    let has_data_submission = entry.request.body.as_ref().map(|b| !b.params.is_empty() || b.text.is_some()).unwrap_or(false);

    let mut parameter_types = BTreeSet::new();
    let mut has_sensitive_data = false;

    for pair in all_param_candidates(entry) {
        let pt = classify_parameter(&pair.0, &pair.1);
        if pt != ParameterType::Other {
            parameter_types.insert(pt);
        }
        if matches!(pt, ParameterType::Credential | ParameterType::SessionId | ParameterType::ApiKey) {
            has_sensitive_data = true;
        }
    }

    EndpointCharacteristics {
        has_authentication,
        has_state_change,
        has_data_submission,
        has_sensitive_data,
        is_idempotent,
        parameter_types,
    }
}

fn all_param_candidates(entry: &HarEntry) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for nv in &entry.request.query {
        out.push((nv.name.clone(), nv.value.clone()));
    }
    if let Some(body) = &entry.request.body {
        for nv in &body.params {
            out.push((nv.name.clone(), nv.value.clone()));
        }
    }
    out
}

fn classify_parameter(name: &str, value: &str) -> ParameterType {
    if har_core::constants::is_credential_field(name) {
        return ParameterType::Credential;
    }
    let lower = name.to_lowercase();
    if lower.contains("jwt") || is_jwt_shaped(value) {
        ParameterType::Jwt
    } else if lower.contains("api_key") || lower.contains("apikey") {
        ParameterType::ApiKey
    } else if lower == "state" {
        ParameterType::OAuthState
    } else if lower.contains("csrf") || lower == "_token" {
        ParameterType::Csrf
    } else if lower.contains("session") || lower == "sid" {
        ParameterType::SessionId
    } else {
        ParameterType::Other
    }
}

fn is_jwt_shaped(value: &str) -> bool {
    value.split('.').count() == 3 && value.len() > 20 && !value.contains(' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use har_core::types::{HarRequest, HarResponse, NameValue, ResponseContent};

    fn entry(method: &str, url: &str, status: u16) -> HarEntry {
        HarEntry {
            index: 0,
            started_at: Utc.timestamp_opt(0, 0).unwrap(),
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
    fn login_post_is_authentication_and_form() {
        let mut e = entry("POST", "https://app.test/login", 200);
        e.request.body = Some(har_core::types::PostData {
            mime: "application/x-www-form-urlencoded".to_string(),
            text: Some("username=u&password=p".to_string()),
            params: vec![NameValue::new("username", "u"), NameValue::new("password", "p")],
        });
        let tags = classify_resource_types(&e);
        assert!(tags.contains(&ResourceType::Authentication));
        assert!(tags.contains(&ResourceType::FormSubmission));
        let chars = characteristics(&e, &tags);
        assert!(chars.has_authentication);
        assert!(chars.has_sensitive_data);
    }

    #[test]
    fn static_css_is_static_asset() {
        let e = entry("GET", "https://app.test/assets/main.css", 200);
        let tags = classify_resource_types(&e);
        assert!(tags.contains(&ResourceType::StaticAsset));
    }

    #[test]
    fn unmatched_entry_is_unknown() {
        let e = entry("GET", "https://app.test/misc/xyz", 200);
        let tags = classify_resource_types(&e);
        assert_eq!(tags, BTreeSet::from([ResourceType::Unknown]));
    }

    #[test]
    fn graphql_endpoint_is_tagged() {
        let e = entry("POST", "https://app.test/graphql", 200);
        let tags = classify_resource_types(&e);
        assert!(tags.contains(&ResourceType::Graphql));
    }
}
