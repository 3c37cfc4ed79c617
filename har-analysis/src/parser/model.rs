//! HAR structural validation (C1) and entry construction.
//!
//! Works directly off `serde_json::Value` rather than a strict `#[derive(Deserialize)]`
//! struct: HAR producers disagree on which fields are optional, and a failed
//! per-field extraction needs to become a *per-entry* skip-with-reason rather
//! than aborting the whole parse.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use har_core::types::{HarEntry, HarRequest, HarResponse, NameValue, PostData, ResponseContent};

/// Why a candidate entry was rejected (§4.1).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRejection(pub String);

impl std::fmt::Display for EntryRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Result of validating the document's top level.
pub struct TopLevel<'a> {
    pub entries: &'a Vec<Value>,
    /// Some(version) when `log.version` is present but outside `{1.1, 1.2}`.
    pub unsupported_version: Option<String>,
}

/// Validates `{ "log": { "entries": [...] } }` shape. Does not look inside entries.
pub fn validate_top_level(doc: &Value) -> Result<TopLevel<'_>, String> {
    let obj = doc.as_object().ok_or("top level is not a JSON object")?;
    let log = obj.get("log").ok_or("missing `log` field")?;
    let log_obj = log.as_object().ok_or("`log` is not an object")?;
    let entries = log_obj
        .get("entries")
        .ok_or("missing `log.entries`")?
        .as_array()
        .ok_or("`log.entries` is not an array")?;

    let unsupported_version = log_obj
        .get("version")
        .and_then(Value::as_str)
        .filter(|v| !har_core::constants::SUPPORTED_HAR_VERSIONS.contains(v))
        .map(|v| v.to_string());

    Ok(TopLevel {
        entries,
        unsupported_version,
    })
}

/// Validate and construct a single `HarEntry` from its raw JSON object.
///
/// Per §4.1: `request.url` (non-empty string), `request.method` (string),
/// `request.headers` (array), `response.status` (number), `response.headers`
/// (array) must all be present and well-typed, or the entry is rejected.
pub fn build_entry(
    index: usize,
    raw: &Value,
    large_response_threshold: u64,
    skip_large_responses: bool,
) -> Result<HarEntry, EntryRejection> {
    let obj = raw.as_object().ok_or_else(|| reject("entry is not an object"))?;

    let request_raw = obj.get("request").ok_or_else(|| reject("missing request"))?;
    let response_raw = obj.get("response").ok_or_else(|| reject("missing response"))?;

    let req_obj = request_raw
        .as_object()
        .ok_or_else(|| reject("request is not an object"))?;
    let url = req_obj
        .get("url")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| reject("missing or empty request.url"))?
        .to_string();
    let method = req_obj
        .get("method")
        .and_then(Value::as_str)
        .ok_or_else(|| reject("missing request.method"))?
        .to_string();
    let req_headers = parse_name_values(req_obj.get("headers"))
        .ok_or_else(|| reject("request.headers is not an array"))?;

    let resp_obj = response_raw
        .as_object()
        .ok_or_else(|| reject("response is not an object"))?;
    let status = resp_obj
        .get("status")
        .and_then(Value::as_u64)
        .ok_or_else(|| reject("missing response.status"))?;
    let resp_headers = parse_name_values(resp_obj.get("headers"))
        .ok_or_else(|| reject("response.headers is not an array"))?;

    let started_at = req_obj_started_at(obj);
    let elapsed_ms = obj.get("time").and_then(Value::as_f64).unwrap_or(0.0);

    let query = parse_name_values(req_obj.get("queryString")).unwrap_or_default();
    let cookies = parse_name_values(req_obj.get("cookies")).unwrap_or_default();
    let body = req_obj.get("postData").map(|pd| parse_post_data(pd, &query));

    let resp_cookies = parse_name_values(resp_obj.get("cookies")).unwrap_or_default();
    let content = parse_content(
        resp_obj.get("content"),
        large_response_threshold,
        skip_large_responses,
    );
    let redirect_url = resp_obj
        .get("redirectURL")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string());

    Ok(HarEntry {
        index,
        started_at,
        elapsed_ms,
        request: HarRequest {
            method,
            url,
            http_version: req_obj
                .get("httpVersion")
                .and_then(Value::as_str)
                .unwrap_or("HTTP/1.1")
                .to_string(),
            headers: req_headers,
            query,
            cookies,
            body,
        },
        response: HarResponse {
            status: status as u16,
            http_version: resp_obj
                .get("httpVersion")
                .and_then(Value::as_str)
                .unwrap_or("HTTP/1.1")
                .to_string(),
            headers: resp_headers,
            cookies: resp_cookies,
            content,
            redirect_url,
        },
    })
}

fn reject(msg: &str) -> EntryRejection {
    EntryRejection(msg.to_string())
}

fn req_obj_started_at(entry_obj: &serde_json::Map<String, Value>) -> DateTime<Utc> {
    entry_obj
        .get("startedDateTime")
        .and_then(Value::as_str)
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|dt| dt.to_utc())
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap())
}

fn parse_name_values(value: Option<&Value>) -> Option<Vec<NameValue>> {
    let arr = value?.as_array()?;
    let mut out = Vec::with_capacity(arr.len());
    for item in arr {
        let o = item.as_object()?;
        let name = o.get("name").and_then(Value::as_str)?.to_string();
        let value = o
            .get("value")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        out.push(NameValue::new(name, value));
    }
    Some(out)
}

/// Derives `postData.params` when the HAR producer didn't record them (§4.1).
fn parse_post_data(pd: &Value, query: &[NameValue]) -> PostData {
    let obj = pd.as_object();
    let mime = obj
        .and_then(|o| o.get("mimeType"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let text = obj
        .and_then(|o| o.get("text"))
        .and_then(Value::as_str)
        .map(|s| s.to_string());

    let mut params = parse_name_values(obj.and_then(|o| o.get("params"))).unwrap_or_default();

    if params.is_empty() {
        if let Some(text) = &text {
            if mime.contains("x-www-form-urlencoded") {
                params = parse_urlencoded(text);
            } else if mime.contains("application/json") {
                params = parse_json_flat(text);
            }
        }
    }

    let _ = query; // query params are tagged by the classifier, not re-derived here
    PostData { mime, text, params }
}

fn parse_urlencoded(text: &str) -> Vec<NameValue> {
    url::form_urlencoded::parse(text.as_bytes())
        .map(|(k, v)| NameValue::new(k.into_owned(), v.into_owned()))
        .collect()
}

/// Flattens one level of JSON object/array nesting into dotted/indexed keys;
/// nested structures are stringified into the value (§4.1).
fn parse_json_flat(text: &str) -> Vec<NameValue> {
    let Ok(value) = serde_json::from_str::<Value>(text) else {
        return Vec::new();
    };
    let Some(obj) = value.as_object() else {
        return Vec::new();
    };
    obj.iter()
        .map(|(k, v)| {
            let value_str = match v {
                Value::String(s) => s.clone(),
                Value::Null => String::new(),
                other => other.to_string(),
            };
            NameValue::new(k.clone(), value_str)
        })
        .collect()
}

fn parse_content(
    value: Option<&Value>,
    large_response_threshold: u64,
    skip_large_responses: bool,
) -> ResponseContent {
    let Some(obj) = value.and_then(Value::as_object) else {
        return ResponseContent::default();
    };
    let size = obj.get("size").and_then(Value::as_i64).unwrap_or(0);
    let mime = obj
        .get("mimeType")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let encoding = obj
        .get("encoding")
        .and_then(Value::as_str)
        .map(|s| s.to_string());
    let mut text = obj.get("text").and_then(Value::as_str).map(|s| s.to_string());

    if skip_large_responses && size >= 0 && size as u64 > large_response_threshold {
        text = Some(har_core::constants::TRUNCATED_BODY_SENTINEL.to_string());
    }

    ResponseContent {
        size,
        mime,
        text,
        encoding,
    }
}
