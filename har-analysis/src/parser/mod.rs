//! C1 (HAR Model & Validator) + C2 (Streaming Parser).

pub mod cancellation;
pub mod chunked;
pub mod model;
pub mod stream;

pub use cancellation::Cancellation;
pub use chunked::ChunkedEntryScanner;
pub use model::{build_entry, validate_top_level, EntryRejection, TopLevel};
pub use stream::{into_batches, parse, Batch, ParseOutcome};

/// Parse a HAR document delivered as a sequence of byte chunks (§4.1 large-file
/// mode), bypassing the need to hold the whole document in memory at once.
///
/// Each completed entry is validated the same way [`parse`] validates entries
/// from a fully materialised document; malformed entries are collected into
/// `skipped` rather than aborting the scan.
pub fn parse_chunked<I>(
    chunks: I,
    config: &har_core::config::ParserConfig,
    dispatcher: &har_core::events::EventDispatcher,
    cancellation: &Cancellation,
) -> Result<ParseOutcome, har_core::errors::PipelineError>
where
    I: IntoIterator<Item = Vec<u8>>,
{
    use har_core::errors::PipelineError;

    let mut scanner = ChunkedEntryScanner::new();
    let mut entries = Vec::new();
    let mut skipped = Vec::new();
    let mut bytes_processed = 0usize;
    let mut index = 0usize;
    let mut saw_any_chunk = false;

    let max_entry_size = config.effective_max_entry_size();
    let large_response_threshold = config.effective_large_response_threshold();
    let skip_large_responses = config.skip_large_responses;

    for chunk in chunks {
        saw_any_chunk = true;
        bytes_processed += chunk.len();

        if cancellation.is_cancelled() {
            return Ok(ParseOutcome {
                entries,
                skipped,
                unsupported_har_version: None,
                bytes_processed,
                aborted: true,
            });
        }

        for result in scanner.feed(&chunk) {
            let this_index = index;
            index += 1;

            match result {
                Err(reason) => {
                    dispatcher.entry_error(this_index, reason.clone(), "parsing");
                    skipped.push((this_index, reason));
                    continue;
                }
                Ok(raw) => {
                    let serialized_size = raw.to_string().len();
                    if serialized_size as u64 > max_entry_size {
                        let reason = format!("entry size {serialized_size}B exceeds max_entry_size");
                        dispatcher.entry_error(this_index, reason.clone(), "parsing");
                        skipped.push((this_index, reason));
                        continue;
                    }
                    match build_entry(this_index, &raw, large_response_threshold, skip_large_responses) {
                        Ok(entry) => entries.push(entry),
                        Err(rejection) => {
                            dispatcher.entry_error(this_index, rejection.0.clone(), "parsing");
                            skipped.push((this_index, rejection.0));
                        }
                    }
                    dispatcher.tick_entry(har_core::events::ProgressEvent {
                        percent: har_core::events::Stage::Scoring.percent(),
                        stage: "parsing".to_string(),
                    });
                }
            }
        }
    }

    if !saw_any_chunk {
        return Err(PipelineError::EmptyInput);
    }
    if scanner.has_incomplete_trailing_entry() {
        dispatcher.warning("input ended mid-entry; trailing partial entry discarded".to_string());
    }
    if entries.is_empty() && skipped.is_empty() {
        return Err(PipelineError::NoRequests);
    }

    Ok(ParseOutcome {
        entries,
        skipped,
        unsupported_har_version: None,
        bytes_processed,
        aborted: false,
    })
}
