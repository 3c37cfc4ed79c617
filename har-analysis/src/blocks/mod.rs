//! Script Block Builder (C9): renders critical-path entries, detected
//! tokens, and MFA annotations into ordered `BlockIR` (§4.8).

mod body;
mod variables;

use std::collections::BTreeMap;

use har_core::config::CodeGenConfig;
use har_core::constants::{FAILURE_KEYWORDS, PRESERVED_HEADERS, SUCCESS_KEYWORDS};
use har_core::types::{
    BlockIR, CatchBranch, CookieSpec, DetectedToken, FlowState, HarEntry, HeaderSpec, MarkStatus, ParseMethod, ParseSource,
};

pub use variables::VariableLifecycle;

/// Build the ordered block sequence for one critical-path run.
#[tracing::instrument(skip_all, fields(path_len = path.len()))]
pub fn build_blocks(
    path: &[HarEntry],
    tokens_by_name: &BTreeMap<String, Vec<DetectedToken>>,
    states: &[FlowState],
    config: &CodeGenConfig,
) -> (Vec<BlockIR>, VariableLifecycle) {
    let mut lifecycle = VariableLifecycle::new();
    let mut blocks = Vec::new();

    // A token is parsed once, immediately after the response that first
    // emits it (§4.8). Index tokens by the earliest entry they were seen on.
    let mut parse_at: BTreeMap<usize, Vec<(&str, &DetectedToken)>> = BTreeMap::new();
    for (name, candidates) in tokens_by_name {
        if let Some(token) = candidates.iter().min_by_key(|t| t.source_entry) {
            parse_at.entry(token.source_entry).or_default().push((name.as_str(), token));
        }
    }

    for (i, entry) in path.iter().enumerate() {
        if config.include_comments {
            let state_label = states.get(i).map(|s| s.label()).unwrap_or_else(|| "General".to_string());
            blocks.push(BlockIR::Log { msg: format!("-- {state_label} ({} {})", entry.request.method, entry.request.url) });
        }

        if matches!(states.get(i), Some(FlowState::MfaChallenge)) {
            blocks.push(BlockIR::Log { msg: "MFA challenge detected; not automated".to_string() });
        }

        blocks.push(build_request_block(entry, tokens_by_name, &mut lifecycle));

        if let Some(tokens) = parse_at.get(&entry.index) {
            for (name, token) in tokens {
                lifecycle.declare(name, token.classification);
                blocks.push(build_parse_block(token, name));
            }
        }
    }

    if let Some(last) = path.last() {
        blocks.push(build_key_check(last));
    }

    if config.error_handling {
        blocks = vec![wrap_with_error_handling(blocks)];
    }

    (blocks, lifecycle)
}

fn build_request_block(
    entry: &HarEntry,
    tokens_by_name: &BTreeMap<String, Vec<DetectedToken>>,
    lifecycle: &mut VariableLifecycle,
) -> BlockIR {
    let headers = entry
        .request
        .headers
        .iter()
        .filter(|h| {
            let lower = h.name.to_lowercase();
            PRESERVED_HEADERS.contains(&lower.as_str()) || lower.starts_with("x-")
        })
        .map(|h| HeaderSpec { name: h.name.clone(), value: h.value.clone() })
        .collect();

    let cookies = entry
        .request
        .cookies
        .iter()
        .map(|c| CookieSpec { name: c.name.clone(), value: c.value.clone(), domain: String::new(), path: "/".to_string() })
        .collect();

    let content_type = entry.request.body.as_ref().map(|b| b.mime.clone());
    let body_template = entry.request.body.as_ref().and_then(|b| body::build_body_template(b, tokens_by_name, lifecycle));

    BlockIR::Request {
        method: entry.request.method.clone(),
        url: entry.request.url.clone(),
        headers,
        cookies,
        content_type,
        body_template,
    }
}

fn build_parse_block(token: &DetectedToken, name: &str) -> BlockIR {
    use har_core::types::{ExtractionLayer, TokenLocation};

    let source = match token.location {
        TokenLocation::Header => ParseSource::Header,
        TokenLocation::Cookie => ParseSource::Cookie,
        _ => ParseSource::Body,
    };

    let method = match token.extraction_layer {
        ExtractionLayer::HtmlForm => ParseMethod::CssAttr {
            selector: format!("input[name=\"{name}\"]"),
            attribute: "value".to_string(),
        },
        ExtractionLayer::JsonResponse => ParseMethod::JsonPath { path: name.to_string() },
        _ => ParseMethod::Regex { pattern: format!("{name}=([^&\"'\\s]+)") },
    };

    BlockIR::Parse {
        source,
        method,
        output_var: name.to_string(),
    }
}

fn build_key_check(last: &HarEntry) -> BlockIR {
    let success_cond = SUCCESS_KEYWORDS.join("|");
    let failure_cond = FAILURE_KEYWORDS.join("|");

    BlockIR::If {
        cond: "RESPONSE.STATUS == 429".to_string(),
        then_ir: vec![BlockIR::Mark { status: MarkStatus::Ban, msg: Some("rate limited".to_string()) }],
        else_ir: vec![BlockIR::If {
            cond: format!("RESPONSE.BODY CONTAINS_ANY ({success_cond})"),
            then_ir: vec![BlockIR::Mark { status: MarkStatus::Success, msg: None }],
            else_ir: vec![BlockIR::If {
                cond: format!("RESPONSE.BODY CONTAINS_ANY ({failure_cond})"),
                then_ir: vec![BlockIR::Mark { status: MarkStatus::Failure, msg: None }],
                else_ir: vec![BlockIR::Mark {
                    status: MarkStatus::Error,
                    msg: Some(format!("unrecognised response from {}", last.request.url)),
                }],
            }],
        }],
    }
}

fn wrap_with_error_handling(ir: Vec<BlockIR>) -> BlockIR {
    BlockIR::Try {
        try_ir: ir,
        catches: vec![
            CatchBranch {
                cond: "RESPONSE.STATUS == 429".to_string(),
                ir: vec![retry_block(3, 1000, true)],
            },
            CatchBranch {
                cond: "RESPONSE.STATUS == 401 OR RESPONSE.STATUS == 403".to_string(),
                ir: vec![retry_block(2, 500, false)],
            },
            CatchBranch {
                cond: "RESPONSE.BODY CONTAINS \"captcha\"".to_string(),
                ir: vec![BlockIR::Log { msg: "captcha challenge encountered; no solver configured".to_string() }],
            },
            CatchBranch {
                cond: "RESPONSE.STATUS >= 500".to_string(),
                ir: vec![retry_block(3, 2000, true)],
            },
            CatchBranch {
                cond: "true".to_string(),
                ir: vec![BlockIR::Mark { status: MarkStatus::Failure, msg: None }],
            },
        ],
        finally_ir: Vec::new(),
    }
}

fn retry_block(attempts: u32, base_ms: u64, exponential: bool) -> BlockIR {
    let delay_for = |attempt: u32| if exponential { base_ms * 2u64.pow(attempt) } else { base_ms };
    let body: Vec<BlockIR> = (0..attempts).map(|attempt| BlockIR::Delay { ms: delay_for(attempt) }).collect();
    BlockIR::While {
        cond: format!("ATTEMPT < {attempts}"),
        body_ir: body,
    }
}
