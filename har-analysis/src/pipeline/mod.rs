//! Orchestrator (C11): wires the parser through the emitter behind a single
//! `analyze()` call, publishing the eight fixed stage checkpoints and
//! converting stage failures into the closed error taxonomy (§5, §7).

use std::collections::BTreeMap;
use std::time::Instant;

use har_core::config::AnalysisConfig;
use har_core::errors::PipelineError;
use har_core::events::{AnalysisEventHandler, EventDispatcher, Stage};
use har_core::types::{
    AnalysisMetrics, AnalysisResult, DetectedToken, FlowState, FxHashSet, HarEntry, Warning,
};

use crate::parser::{self, Cancellation};
use crate::{blocks, correlation, emit, patterns, scoring, transitions};

/// Run the full pipeline over a materialised HAR document and return the
/// emitted script alongside the intermediate artefacts and metrics.
pub fn analyze(
    har_text: &str,
    config: &AnalysisConfig,
    handler: &dyn AnalysisEventHandler,
) -> Result<AnalysisResult, PipelineError> {
    let cancellation = Cancellation::new();
    analyze_with_cancellation(har_text, config, handler, &cancellation)
}

/// Same as [`analyze`] but lets the caller hold on to the cancellation flag
/// (e.g. to cancel from another thread while `analyze` runs synchronously
/// on this one, checked between stages and between parser entries).
#[tracing::instrument(skip_all, fields(bytes = har_text.len()))]
pub fn analyze_with_cancellation(
    har_text: &str,
    config: &AnalysisConfig,
    handler: &dyn AnalysisEventHandler,
    cancellation: &Cancellation,
) -> Result<AnalysisResult, PipelineError> {
    let dispatcher = EventDispatcher::new(handler);
    let mut metrics = AnalysisMetrics::default();
    let mut warnings = Vec::new();

    dispatcher.stage(Stage::Scoring);
    let parse_start = Instant::now();
    let outcome = parser::parse(har_text, &config.parser, &dispatcher, cancellation)?;
    metrics.parse_ms = parse_start.elapsed().as_millis() as u64;

    if outcome.aborted {
        dispatcher.aborted(Stage::Scoring.name());
        return Err(PipelineError::Aborted { stage: Stage::Scoring.name().to_string() });
    }

    metrics.entries_parsed = outcome.entries.len();
    metrics.entries_skipped = outcome.skipped.len();
    if let Some(version) = &outcome.unsupported_har_version {
        warnings.push(Warning::UnsupportedHarVersion { version: version.clone() });
    }
    for (index, reason) in &outcome.skipped {
        warnings.push(Warning::EntrySkipped { index: *index, reason: reason.clone() });
    }

    let score_start = Instant::now();
    let scored = scoring::score_entries(&outcome.entries, &config.filtering);
    metrics.score_ms = score_start.elapsed().as_millis() as u64;
    metrics.entries_scored = scored.len();
    metrics.entries_filtered = outcome.entries.len().saturating_sub(scored.len());

    if scored.is_empty() {
        return Err(PipelineError::NoRelevantRequests);
    }

    dispatcher.stage(Stage::Behavioral);
    if cancellation.is_cancelled() {
        dispatcher.aborted(Stage::Behavioral.name());
        return Err(PipelineError::Aborted { stage: Stage::Behavioral.name().to_string() });
    }

    dispatcher.stage(Stage::Dependency);
    let correlation_start = Instant::now();
    let matrix = correlation::build_matrix(&scored);
    if !matrix.is_valid() {
        return Err(PipelineError::InternalInvariantViolation { detail: "correlation matrix is not symmetric with a zero diagonal".to_string() });
    }
    let path_result = correlation::select_critical_path(&scored, &matrix);
    metrics.correlation_ms = correlation_start.elapsed().as_millis() as u64;

    let mut seen: FxHashSet<usize> = FxHashSet::default();
    if !path_result.path.iter().all(|i| seen.insert(*i)) {
        return Err(PipelineError::InternalInvariantViolation { detail: "critical path contains duplicate indices".to_string() });
    }

    let critical_path: Vec<HarEntry> = path_result.path.iter().map(|&i| scored[i].entry.clone()).collect();
    metrics.critical_path_len = critical_path.len();
    metrics.redundant_count = path_result.redundant.len();

    dispatcher.stage(Stage::Optimization);
    if cancellation.is_cancelled() {
        dispatcher.aborted(Stage::Optimization.name());
        return Err(PipelineError::Aborted { stage: Stage::Optimization.name().to_string() });
    }

    dispatcher.stage(Stage::Tokens);
    let token_start = Instant::now();
    let detected_tokens_by_name = crate::tokens::detect_tokens(&critical_path, &config.token_detection);
    metrics.token_ms = token_start.elapsed().as_millis() as u64;
    metrics.tokens_detected = detected_tokens_by_name.values().map(|v| v.len()).sum();

    for tokens in detected_tokens_by_name.values().flatten() {
        if !(0.0..=1.0).contains(&tokens.confidence) {
            return Err(PipelineError::InternalInvariantViolation {
                detail: format!("token '{}' confidence {} out of bounds", tokens.name, tokens.confidence),
            });
        }
    }

    let tokens_by_entry = tokens_by_entry_index(&detected_tokens_by_name);

    dispatcher.stage(Stage::Mfa);
    let pattern_start = Instant::now();
    let matched_patterns = patterns::match_patterns(&critical_path, &tokens_by_entry);
    metrics.pattern_ms = pattern_start.elapsed().as_millis() as u64;

    for pattern_match in &matched_patterns {
        if pattern_match.steps.iter().any(|&idx| !critical_path.iter().any(|e| e.index == idx)) {
            return Err(PipelineError::InternalInvariantViolation {
                detail: format!("pattern '{}' references an entry outside the critical path", pattern_match.pattern_id),
            });
        }
    }

    let best_match = matched_patterns.first();
    let transitions = transitions::model_transitions(&critical_path, best_match);
    let flow_completeness = transitions::flow_completeness(best_match.map(|m| m.confidence), &critical_path, &transitions);
    metrics.flow_completeness = flow_completeness;

    let states: Vec<FlowState> = transitions::label_states(&critical_path, best_match);

    dispatcher.stage(Stage::Codegen);
    let codegen_start = Instant::now();
    let (block_ir, lifecycle) = blocks::build_blocks(&critical_path, &detected_tokens_by_name, &states, &config.code_generation);
    let script = emit::emit(&block_ir);
    metrics.codegen_ms = codegen_start.elapsed().as_millis() as u64;

    for unused in lifecycle.unused() {
        dispatcher.warning(format!("variable '{unused}' declared but never used"));
    }

    dispatcher.stage(Stage::Complete);

    Ok(AnalysisResult {
        blocks: block_ir,
        script,
        critical_path,
        matched_patterns,
        detected_tokens_by_name,
        transitions,
        metrics,
        warnings,
    })
}

fn tokens_by_entry_index(by_name: &BTreeMap<String, Vec<DetectedToken>>) -> BTreeMap<usize, Vec<DetectedToken>> {
    let mut by_entry: BTreeMap<usize, Vec<DetectedToken>> = BTreeMap::new();
    for tokens in by_name.values() {
        for token in tokens {
            by_entry.entry(token.source_entry).or_default().push(token.clone());
        }
    }
    by_entry
}

#[cfg(test)]
mod tests {
    use super::*;
    use har_core::config::AnalysisMode;
    use har_core::events::NullEventHandler;

    fn sample_har() -> String {
        r#"{
            "log": {
                "version": "1.2",
                "entries": [
                    {
                        "startedDateTime": "2024-01-01T00:00:00.000Z",
                        "time": 50,
                        "request": {
                            "method": "GET",
                            "url": "https://app.test/login",
                            "httpVersion": "HTTP/1.1",
                            "headers": [],
                            "queryString": [],
                            "cookies": []
                        },
                        "response": {
                            "status": 200,
                            "httpVersion": "HTTP/1.1",
                            "headers": [],
                            "cookies": [],
                            "content": {"size": 10, "mimeType": "text/html", "text": "<input type=\"hidden\" name=\"_token\" value=\"abc123\"/>"}
                        }
                    },
                    {
                        "startedDateTime": "2024-01-01T00:00:02.000Z",
                        "time": 50,
                        "request": {
                            "method": "POST",
                            "url": "https://app.test/login",
                            "httpVersion": "HTTP/1.1",
                            "headers": [],
                            "queryString": [],
                            "cookies": [],
                            "postData": {"mimeType": "application/x-www-form-urlencoded", "text": "_token=abc123&username=u&password=p", "params": [{"name": "_token", "value": "abc123"}, {"name": "username", "value": "u"}, {"name": "password", "value": "p"}]}
                        },
                        "response": {
                            "status": 302,
                            "httpVersion": "HTTP/1.1",
                            "headers": [],
                            "cookies": [{"name": "session_id", "value": "xyz"}],
                            "content": {"size": 0, "mimeType": "text/html"}
                        }
                    }
                ]
            }
        }"#
        .to_string()
    }

    #[test]
    fn end_to_end_run_produces_a_script() {
        let config = AnalysisConfig::for_mode(AnalysisMode::Automatic);
        let handler = NullEventHandler;
        let result = analyze(&sample_har(), &config, &handler).expect("pipeline succeeds");
        assert!(!result.script.is_empty());
        assert!(result.script.contains("BLOCK:Request"));
        assert_eq!(result.metrics.entries_parsed, 2);
    }

    #[test]
    fn empty_document_is_rejected() {
        let config = AnalysisConfig::for_mode(AnalysisMode::Automatic);
        let handler = NullEventHandler;
        let err = analyze("", &config, &handler).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput));
    }

    #[test]
    fn everything_filtered_out_yields_no_relevant_requests() {
        let har = r#"{"log":{"version":"1.2","entries":[{"startedDateTime":"2024-01-01T00:00:00.000Z","time":1,"request":{"method":"GET","url":"https://cdn.test/app.css","httpVersion":"HTTP/1.1","headers":[],"queryString":[],"cookies":[]},"response":{"status":200,"httpVersion":"HTTP/1.1","headers":[],"cookies":[],"content":{"size":1,"mimeType":"text/css"}}}]}}"#;
        let config = AnalysisConfig::for_mode(AnalysisMode::Automatic);
        let handler = NullEventHandler;
        let err = analyze(har, &config, &handler).unwrap_err();
        assert!(matches!(err, PipelineError::NoRelevantRequests));
    }
}
