//! Request body placeholder substitution (§4.8): credential fields become
//! `<USERNAME>`/`<PASSWORD>`/`<EMAIL>`; fields whose value matches a
//! detected token become `<@token_name>`.

use std::collections::BTreeMap;

use har_core::types::{DetectedToken, PostData};

use super::variables::VariableLifecycle;

fn credential_placeholder(name: &str) -> Option<&'static str> {
    let lower = name.to_lowercase();
    match lower.as_str() {
        "username" | "user" => Some("<USERNAME>"),
        "password" | "pass" | "pwd" => Some("<PASSWORD>"),
        "email" => Some("<EMAIL>"),
        _ => None,
    }
}

fn token_owning(value: &str, tokens_by_name: &BTreeMap<String, Vec<DetectedToken>>) -> Option<String> {
    tokens_by_name
        .iter()
        .find(|(_, candidates)| candidates.iter().any(|t| t.value == value))
        .map(|(name, _)| name.clone())
}

fn substitute(name: &str, value: &str, tokens_by_name: &BTreeMap<String, Vec<DetectedToken>>, lifecycle: &mut VariableLifecycle) -> String {
    if let Some(placeholder) = credential_placeholder(name) {
        return placeholder.to_string();
    }
    if let Some(token_name) = token_owning(value, tokens_by_name) {
        if lifecycle.is_declared(&token_name) {
            lifecycle.mark_used(&token_name);
            return format!("<@{token_name}>");
        }
    }
    value.to_string()
}

/// Rewrite `body` into a script-ready template, JSON-aware for JSON bodies,
/// name=value-aware for form bodies. Returns `None` for empty/unknown bodies.
pub fn build_body_template(
    body: &PostData,
    tokens_by_name: &BTreeMap<String, Vec<DetectedToken>>,
    lifecycle: &mut VariableLifecycle,
) -> Option<String> {
    if body.mime.contains("application/json") {
        let text = body.text.as_deref()?;
        let mut value: serde_json::Value = serde_json::from_str(text).ok()?;
        rewrite_json(&mut value, tokens_by_name, lifecycle);
        return Some(value.to_string());
    }

    if !body.params.is_empty() {
        let rewritten: Vec<String> = body
            .params
            .iter()
            .map(|p| {
                let value = substitute(&p.name, &p.value, tokens_by_name, lifecycle);
                format!("{}={}", p.name, value)
            })
            .collect();
        return Some(rewritten.join("&"));
    }

    body.text.clone()
}

fn rewrite_json(value: &mut serde_json::Value, tokens_by_name: &BTreeMap<String, Vec<DetectedToken>>, lifecycle: &mut VariableLifecycle) {
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map.iter_mut() {
                if let serde_json::Value::String(s) = v {
                    *s = substitute(k, s, tokens_by_name, lifecycle);
                } else {
                    rewrite_json(v, tokens_by_name, lifecycle);
                }
            }
        }
        serde_json::Value::Array(items) => {
            for v in items.iter_mut() {
                rewrite_json(v, tokens_by_name, lifecycle);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use har_core::types::{ExtractionLayer, NameValue, TokenClassification, TokenLocation};

    fn token(name: &str, value: &str) -> DetectedToken {
        DetectedToken {
            name: name.to_string(),
            value: value.to_string(),
            classification: TokenClassification::CsrfToken,
            location: TokenLocation::Body,
            confidence: 0.9,
            extraction_layer: ExtractionLayer::HtmlForm,
            source_entry: 0,
            meta: BTreeMap::new(),
        }
    }

    #[test]
    fn form_body_substitutes_credentials_and_tokens() {
        let body = PostData {
            mime: "application/x-www-form-urlencoded".to_string(),
            text: Some("_token=abc123&username=u&password=p".to_string()),
            params: vec![NameValue::new("_token", "abc123"), NameValue::new("username", "u"), NameValue::new("password", "p")],
        };
        let mut tokens_by_name = BTreeMap::new();
        tokens_by_name.insert("_token".to_string(), vec![token("_token", "abc123")]);
        let mut lifecycle = VariableLifecycle::new();
        lifecycle.declare("_token", TokenClassification::CsrfToken);

        let rendered = build_body_template(&body, &tokens_by_name, &mut lifecycle).unwrap();
        assert!(rendered.contains("<@_token>"));
        assert!(rendered.contains("<USERNAME>"));
        assert!(rendered.contains("<PASSWORD>"));
    }
}
