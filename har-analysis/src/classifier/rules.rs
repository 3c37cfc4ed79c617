//! Resource-type rule table. Each rule is a cheap URL/method/MIME predicate;
//! an entry may satisfy more than one (§4.2).

use std::sync::OnceLock;

use aho_corasick::AhoCorasick;
use har_core::types::{HarEntry, ResourceType};

pub struct ResourceRule {
    pub resource_type: ResourceType,
    pub matches: fn(&HarEntry) -> bool,
}

fn url_lower(entry: &HarEntry) -> String {
    entry.request.url.to_lowercase()
}

fn build_automaton(patterns: &[&str]) -> AhoCorasick {
    AhoCorasick::builder()
        .ascii_case_insensitive(true)
        .build(patterns)
        .expect("static keyword list compiles")
}

fn tracking_automaton() -> &'static AhoCorasick {
    static AC: OnceLock<AhoCorasick> = OnceLock::new();
    AC.get_or_init(|| {
        build_automaton(&[
            "analytics",
            "doubleclick",
            "googletagmanager",
            "google-analytics",
            "segment.io",
            "mixpanel",
            "hotjar",
            "/collect",
            "/pixel",
            "/beacon",
        ])
    })
}

fn third_party_host_automaton() -> &'static AhoCorasick {
    static AC: OnceLock<AhoCorasick> = OnceLock::new();
    AC.get_or_init(|| {
        build_automaton(&[
            "cdn.",
            "googleapis.com",
            "gstatic.com",
            "cloudflare.com",
            "fontawesome",
            "facebook.",
            "twitter.",
            "stripe.com",
        ])
    })
}

fn is_auth(entry: &HarEntry) -> bool {
    let url = url_lower(entry);
    ["login", "signin", "sign-in", "auth", "oauth", "token", "session"]
        .iter()
        .any(|kw| url.contains(kw))
}

fn is_form_submission(entry: &HarEntry) -> bool {
    if !matches!(entry.request.method.to_uppercase().as_str(), "POST" | "PUT" | "PATCH") {
        return false;
    }
    entry
        .request
        .body
        .as_ref()
        .map(|b| {
            b.mime.contains("x-www-form-urlencoded")
                || b.mime.contains("multipart/form-data")
                || !b.params.is_empty()
        })
        .unwrap_or(false)
}

fn is_api_endpoint(entry: &HarEntry) -> bool {
    let url = url_lower(entry);
    let json_request = entry
        .request
        .body
        .as_ref()
        .map(|b| b.mime.contains("application/json"))
        .unwrap_or(false);
    let json_response = entry.response.content.mime.contains("application/json");
    url.contains("/api/") || url.contains("/v1/") || url.contains("/v2/") || json_request || json_response
}

fn is_graphql(entry: &HarEntry) -> bool {
    url_lower(entry).contains("graphql")
}

fn is_html_document(entry: &HarEntry) -> bool {
    entry.response.content.mime.contains("text/html")
}

fn is_static_asset(entry: &HarEntry) -> bool {
    const EXTENSIONS: &[&str] = &[
        ".css", ".js", ".png", ".jpg", ".jpeg", ".gif", ".svg", ".woff", ".woff2", ".ttf", ".ico", ".map",
    ];
    let url = url_lower(entry);
    let path = url.split(['?', '#']).next().unwrap_or(&url);
    EXTENSIONS.iter().any(|ext| path.ends_with(ext))
        || entry.response.content.mime.starts_with("text/css")
        || entry.response.content.mime.starts_with("application/javascript")
        || entry.response.content.mime.starts_with("image/")
        || entry.response.content.mime.starts_with("font/")
}

fn is_tracking(entry: &HarEntry) -> bool {
    tracking_automaton().is_match(&url_lower(entry))
}

fn is_third_party(entry: &HarEntry) -> bool {
    let url = url_lower(entry);
    let host = url
        .split("//")
        .nth(1)
        .and_then(|rest| rest.split('/').next())
        .unwrap_or("");
    !host.is_empty() && third_party_host_automaton().is_match(host)
}

fn is_websocket(entry: &HarEntry) -> bool {
    let url = url_lower(entry);
    url.starts_with("ws://")
        || url.starts_with("wss://")
        || entry.request.header("upgrade").map(|v| v.eq_ignore_ascii_case("websocket")).unwrap_or(false)
}

fn is_file_upload(entry: &HarEntry) -> bool {
    entry
        .request
        .body
        .as_ref()
        .map(|b| b.mime.contains("multipart/form-data"))
        .unwrap_or(false)
        && entry
            .request
            .body
            .as_ref()
            .and_then(|b| b.text.as_ref())
            .map(|t| t.contains("filename="))
            .unwrap_or(false)
}

fn is_session_management(entry: &HarEntry) -> bool {
    let sets_session_cookie = entry
        .response
        .cookies
        .iter()
        .any(|c| c.name.to_lowercase().contains("session") || c.name.to_lowercase().contains("sid"));
    let sends_session_cookie = entry
        .request
        .cookies
        .iter()
        .any(|c| c.name.to_lowercase().contains("session") || c.name.to_lowercase().contains("sid"));
    sets_session_cookie || (sends_session_cookie && is_auth(entry))
}

pub static RULES: &[ResourceRule] = &[
    ResourceRule { resource_type: ResourceType::Authentication, matches: is_auth },
    ResourceRule { resource_type: ResourceType::FormSubmission, matches: is_form_submission },
    ResourceRule { resource_type: ResourceType::Graphql, matches: is_graphql },
    ResourceRule { resource_type: ResourceType::Websocket, matches: is_websocket },
    ResourceRule { resource_type: ResourceType::FileUpload, matches: is_file_upload },
    ResourceRule { resource_type: ResourceType::Tracking, matches: is_tracking },
    ResourceRule { resource_type: ResourceType::ThirdParty, matches: is_third_party },
    ResourceRule { resource_type: ResourceType::StaticAsset, matches: is_static_asset },
    ResourceRule { resource_type: ResourceType::SessionManagement, matches: is_session_management },
    ResourceRule { resource_type: ResourceType::ApiEndpoint, matches: is_api_endpoint },
    ResourceRule { resource_type: ResourceType::HtmlDocument, matches: is_html_document },
];
