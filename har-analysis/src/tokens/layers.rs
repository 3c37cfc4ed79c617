//! Seven independent extraction layers (§4.7), unioned by the caller.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use har_core::types::{DetectedToken, ExtractionLayer, HarEntry, TokenLocation};
use regex::Regex;

use super::classify::classify;

fn make_token(name: &str, value: &str, location: TokenLocation, layer: ExtractionLayer, source_entry: usize) -> Option<DetectedToken> {
    if value.is_empty() {
        return None;
    }
    let classification = classify(name, value)?;
    Some(DetectedToken {
        name: name.to_string(),
        value: value.to_string(),
        classification,
        location,
        confidence: layer.base_confidence(),
        extraction_layer: layer,
        source_entry,
        meta: BTreeMap::new(),
    })
}

fn hidden_input_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<input[^>]*type\s*=\s*["']hidden["'][^>]*>"#).unwrap()
    })
}

fn attr_re(attr: &str) -> Regex {
    Regex::new(&format!(r#"(?is){attr}\s*=\s*["']([^"']*)["']"#)).unwrap()
}

/// Layer 1: HTML hidden form inputs.
pub fn html_form(entry: &HarEntry) -> Vec<DetectedToken> {
    let Some(body) = entry.response.content.text.as_deref() else {
        return Vec::new();
    };
    let name_re = attr_re("name");
    let value_re = attr_re("value");

    hidden_input_re()
        .find_iter(body)
        .filter_map(|m| {
            let tag = m.as_str();
            let name = name_re.captures(tag)?.get(1)?.as_str();
            let value = value_re.captures(tag).and_then(|c| c.get(1)).map(|m| m.as_str()).unwrap_or("");
            make_token(name, value, TokenLocation::Body, ExtractionLayer::HtmlForm, entry.index)
        })
        .collect()
}

/// Layer 2: JSON response, flattened one level with dotted/indexed keys.
pub fn json_response(entry: &HarEntry) -> Vec<DetectedToken> {
    if !entry.response.content.mime.contains("application/json") {
        return Vec::new();
    }
    let Some(body) = entry.response.content.text.as_deref() else {
        return Vec::new();
    };
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return Vec::new();
    };

    let mut out = Vec::new();
    flatten_json("", &value, &mut out);
    out.into_iter()
        .filter_map(|(name, value)| make_token(&name, &value, TokenLocation::Response, ExtractionLayer::JsonResponse, entry.index))
        .collect()
}

fn flatten_json(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
    match value {
        serde_json::Value::Object(map) => {
            for (k, v) in map {
                let key = if prefix.is_empty() { k.clone() } else { format!("{prefix}.{k}") };
                match v {
                    serde_json::Value::String(s) => out.push((key, s.clone())),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => flatten_json(&key, v, out),
                    _ => {}
                }
            }
        }
        serde_json::Value::Array(items) => {
            for (i, v) in items.iter().enumerate() {
                let key = format!("{prefix}.{i}");
                match v {
                    serde_json::Value::String(s) => out.push((key, s.clone())),
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => flatten_json(&key, v, out),
                    _ => {}
                }
            }
        }
        _ => {}
    }
}

/// Layer 3: request and response headers, case-insensitive name classification.
pub fn headers(entry: &HarEntry) -> Vec<DetectedToken> {
    entry
        .request
        .headers
        .iter()
        .map(|h| (h, TokenLocation::Header))
        .chain(entry.response.headers.iter().map(|h| (h, TokenLocation::Header)))
        .filter_map(|(h, loc)| make_token(&h.name, &h.value, loc, ExtractionLayer::Header, entry.index))
        .collect()
}

/// Layer 4: request and response cookies.
pub fn cookies(entry: &HarEntry) -> Vec<DetectedToken> {
    entry
        .request
        .cookies
        .iter()
        .chain(entry.response.cookies.iter())
        .filter_map(|c| make_token(&c.name, &c.value, TokenLocation::Cookie, ExtractionLayer::Cookie, entry.index))
        .collect()
}

fn script_block_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<script[^>]*>(.*?)</script>").unwrap())
}

fn script_assignment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?:const|let|var|window\.\w+\s*\.)?\s*([A-Za-z_$][A-Za-z0-9_$]*)\s*=\s*["']([^"']+)["']"#).unwrap())
}

/// Layer 5: `<script>` block variable assignments.
pub fn script_variable(entry: &HarEntry) -> Vec<DetectedToken> {
    let Some(body) = entry.response.content.text.as_deref() else {
        return Vec::new();
    };
    script_block_re()
        .captures_iter(body)
        .flat_map(|block| {
            let text = block.get(1).map(|m| m.as_str()).unwrap_or("").to_string();
            script_assignment_re()
                .captures_iter(&text)
                .filter_map(|c| {
                    let name = c.get(1)?.as_str().to_string();
                    let value = c.get(2)?.as_str().to_string();
                    Some((name, value))
                })
                .collect::<Vec<_>>()
        })
        .filter_map(|(name, value)| make_token(&name, &value, TokenLocation::Body, ExtractionLayer::ScriptVariable, entry.index))
        .collect()
}

fn meta_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"(?is)<meta[^>]*name\s*=\s*["']([^"']+)["'][^>]*content\s*=\s*["']([^"']*)["'][^>]*>"#).unwrap())
}

/// Layer 6: `<meta name=X content=V>` tags.
pub fn meta_tag(entry: &HarEntry) -> Vec<DetectedToken> {
    let Some(body) = entry.response.content.text.as_deref() else {
        return Vec::new();
    };
    meta_tag_re()
        .captures_iter(body)
        .filter_map(|c| {
            let name = c.get(1)?.as_str();
            let value = c.get(2)?.as_str();
            make_token(name, value, TokenLocation::Body, ExtractionLayer::MetaTag, entry.index)
        })
        .collect()
}

/// Layer 7: regex pass over URL, body, and headers joined, using both the
/// built-in token-name regex set and any `custom_patterns` from config.
pub fn regex_pass(entry: &HarEntry, custom_patterns: &[Regex]) -> Vec<DetectedToken> {
    let mut haystack = entry.request.url.clone();
    haystack.push('\n');
    if let Some(text) = entry.request.body.as_ref().and_then(|b| b.text.as_ref()) {
        haystack.push_str(text);
        haystack.push('\n');
    }
    if let Some(text) = entry.response.content.text.as_deref() {
        haystack.push_str(text);
        haystack.push('\n');
    }
    for h in entry.request.headers.iter().chain(entry.response.headers.iter()) {
        haystack.push_str(&h.name);
        haystack.push('=');
        haystack.push_str(&h.value);
        haystack.push('\n');
    }

    let kv_re = Regex::new(r#"([A-Za-z_][A-Za-z0-9_]*)\s*[:=]\s*["']?([A-Za-z0-9._-]{6,})["']?"#).unwrap();
    let mut out = Vec::new();
    for c in kv_re.captures_iter(&haystack) {
        let name = &c[1];
        let value = &c[2];
        if let Some(token) = make_token(name, value, TokenLocation::Url, ExtractionLayer::Regex, entry.index) {
            out.push(token);
        }
    }
    for pattern in custom_patterns {
        for m in pattern.find_iter(&haystack) {
            if let Some(token) = make_token("custom_pattern", m.as_str(), TokenLocation::Url, ExtractionLayer::Regex, entry.index) {
                out.push(token);
            }
        }
    }
    out
}
