//! Streaming parser (C2): validates the document, builds entries in
//! bounded-memory batches, and reports per-entry rejections and progress
//! without aborting the run.

use std::time::Instant;

use serde_json::Value;

use har_core::config::ParserConfig;
use har_core::events::{EventDispatcher, Stage};
use har_core::errors::PipelineError;
use har_core::types::HarEntry;

use super::model::{build_entry, validate_top_level};

/// One batch of validated entries, bounded by `parser.batch_size`.
pub struct Batch<'a> {
    pub entries: &'a [HarEntry],
}

/// Everything the streaming parser produced from one document.
#[derive(Debug)]
pub struct ParseOutcome {
    pub entries: Vec<HarEntry>,
    pub skipped: Vec<(usize, String)>,
    pub unsupported_har_version: Option<String>,
    pub bytes_processed: usize,
    /// Set when a cancellation signal fired; the orchestrator, not this
    /// function, is responsible for turning that into `PipelineError::Aborted`
    /// (§5: "the orchestrator emits `Aborted`, reporting the last completed
    /// stage and partial metrics").
    pub aborted: bool,
}

/// Parse a full HAR document already materialised as a UTF-8 string.
///
/// Structural failures (`EmptyInput`, `InvalidFormat`, `NoRequests`,
/// `ParseTimeout`) abort immediately; everything else is collected into
/// `ParseOutcome` and reported as warnings/entry errors via `dispatcher`.
#[tracing::instrument(skip_all, fields(bytes = har_text.len()))]
pub fn parse(
    har_text: &str,
    config: &ParserConfig,
    dispatcher: &EventDispatcher,
    cancellation: &crate::parser::cancellation::Cancellation,
) -> Result<ParseOutcome, PipelineError> {
    if har_text.trim().is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let doc: Value = serde_json::from_str(har_text)
        .map_err(|e| PipelineError::InvalidFormat { message: e.to_string() })?;

    let top = validate_top_level(&doc).map_err(|message| PipelineError::InvalidFormat { message })?;

    if top.entries.is_empty() {
        return Err(PipelineError::NoRequests);
    }

    if let Some(v) = &top.unsupported_version {
        dispatcher.warning(format!("unsupported HAR version '{v}', continuing anyway"));
    }

    let timeout_secs = config.effective_parse_timeout_secs();
    let max_entry_size = config.effective_max_entry_size();
    let large_response_threshold = config.effective_large_response_threshold();
    let skip_large_responses = config.skip_large_responses;

    let start = Instant::now();
    let mut entries = Vec::with_capacity(top.entries.len());
    let mut skipped = Vec::new();
    let mut bytes_processed = 0usize;

    for (index, raw) in top.entries.iter().enumerate() {
        if cancellation.is_cancelled() {
            return Ok(ParseOutcome {
                entries,
                skipped,
                unsupported_har_version: top.unsupported_version,
                bytes_processed,
                aborted: true,
            });
        }

        if start.elapsed().as_secs() > timeout_secs {
            return Err(PipelineError::ParseTimeout { timeout_secs });
        }

        let serialized_size = raw.to_string().len();
        bytes_processed += serialized_size;

        if serialized_size as u64 > max_entry_size {
            let reason = format!("entry size {serialized_size}B exceeds max_entry_size");
            dispatcher.entry_error(index, reason.clone(), "parsing");
            skipped.push((index, reason));
            continue;
        }

        match build_entry(index, raw, large_response_threshold, skip_large_responses) {
            Ok(entry) => entries.push(entry),
            Err(rejection) => {
                dispatcher.entry_error(index, rejection.0.clone(), "parsing");
                skipped.push((index, rejection.0));
            }
        }

        dispatcher.tick_entry(har_core::events::ProgressEvent {
            percent: Stage::Scoring.percent(),
            stage: "parsing".to_string(),
        });
    }

    Ok(ParseOutcome {
        entries,
        skipped,
        unsupported_har_version: top.unsupported_version,
        bytes_processed,
        aborted: false,
    })
}

/// Split already-parsed entries into `batch_size`-bounded chunks — the
/// bounded-memory-batch view callers can pull from instead of consuming
/// `entries` all at once.
///
/// [`parse`] already holds the full document (and every entry it builds) in
/// memory before this can run, so batching here only bounds what a caller
/// does *with* the parsed entries, not the parse itself — memory-bounded
/// parsing is [`parse_chunked`]'s job. Callers that need both (stream a
/// large capture, process it in fixed-size batches) want `parse_chunked` and
/// `ChunkedEntryScanner` directly, not this plus `parse`.
pub fn into_batches(entries: &[HarEntry], batch_size: usize) -> impl Iterator<Item = Batch<'_>> {
    entries.chunks(batch_size.max(1)).map(|chunk| Batch { entries: chunk })
}

#[cfg(test)]
mod tests {
    use super::*;
    use har_core::events::NullEventHandler;

    fn cfg() -> ParserConfig {
        ParserConfig::default()
    }

    #[test]
    fn empty_input_is_rejected() {
        let handler = NullEventHandler;
        let dispatcher = EventDispatcher::new(&handler);
        let cancellation = crate::parser::cancellation::Cancellation::new();
        let err = parse("   ", &cfg(), &dispatcher, &cancellation).unwrap_err();
        assert!(matches!(err, PipelineError::EmptyInput));
    }

    #[test]
    fn empty_entries_is_no_requests() {
        let handler = NullEventHandler;
        let dispatcher = EventDispatcher::new(&handler);
        let cancellation = crate::parser::cancellation::Cancellation::new();
        let err = parse(
            r#"{"log":{"version":"1.2","entries":[]}}"#,
            &cfg(),
            &dispatcher,
            &cancellation,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::NoRequests));
    }

    #[test]
    fn invalid_json_is_invalid_format() {
        let handler = NullEventHandler;
        let dispatcher = EventDispatcher::new(&handler);
        let cancellation = crate::parser::cancellation::Cancellation::new();
        let err = parse("{not json", &cfg(), &dispatcher, &cancellation).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidFormat { .. }));
    }

    #[test]
    fn preserves_source_order() {
        let doc = r#"{"log":{"version":"1.2","entries":[
            {"startedDateTime":"2024-01-01T00:00:00Z","time":1,"request":{"method":"GET","url":"https://a/1","httpVersion":"HTTP/1.1","headers":[]},"response":{"status":200,"httpVersion":"HTTP/1.1","headers":[],"content":{"size":0,"mimeType":"text/html"}}},
            {"startedDateTime":"2024-01-01T00:00:01Z","time":1,"request":{"method":"GET","url":"https://a/2","httpVersion":"HTTP/1.1","headers":[]},"response":{"status":200,"httpVersion":"HTTP/1.1","headers":[],"content":{"size":0,"mimeType":"text/html"}}}
        ]}}"#;
        let handler = NullEventHandler;
        let dispatcher = EventDispatcher::new(&handler);
        let cancellation = crate::parser::cancellation::Cancellation::new();
        let outcome = parse(doc, &cfg(), &dispatcher, &cancellation).unwrap();
        assert_eq!(outcome.entries.len(), 2);
        assert!(outcome.entries[0].started_at <= outcome.entries[1].started_at);
        assert_eq!(outcome.entries[0].request.url, "https://a/1");
    }
}
