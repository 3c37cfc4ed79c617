//! Large-file mode (§4.1): incrementally locate complete entry objects
//! inside `log.entries` by balanced-brace scanning outside strings, so a
//! multi-hundred-MB capture never needs to be held as one `String`/`Value`.
//!
//! Feed bytes as they arrive with [`ChunkedEntryScanner::feed`]; each call
//! returns every entry object that became complete during that chunk.
//! Partial trailing bytes are buffered until the rest of the object arrives.

use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Haven't yet located `"entries"` followed by `:` and `[`.
    SeekingEntriesArray,
    /// Inside the `entries` array, between objects.
    BetweenEntries,
    /// Inside an entry object, at the given brace depth (>= 1).
    InEntry { depth: u32 },
}

/// Byte-at-a-time scanner that reassembles complete JSON objects from
/// `log.entries` out of an arbitrarily-chunked byte stream.
pub struct ChunkedEntryScanner {
    state: ScanState,
    /// Raw bytes of the "entries" / ":" / "[" lookahead not yet consumed.
    seek_buf: Vec<u8>,
    /// Bytes of the entry object currently being assembled.
    entry_buf: Vec<u8>,
    in_string: bool,
    escaped: bool,
}

impl Default for ChunkedEntryScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkedEntryScanner {
    pub fn new() -> Self {
        Self {
            state: ScanState::SeekingEntriesArray,
            seek_buf: Vec::new(),
            entry_buf: Vec::new(),
            in_string: false,
            escaped: false,
        }
    }

    /// Feed the next chunk of bytes, returning every entry object that
    /// completed during this call (as raw JSON text, parse failures are
    /// surfaced by the caller exactly like any other malformed entry).
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Result<Value, String>> {
        let mut completed = Vec::new();

        for &byte in chunk {
            match self.state {
                ScanState::SeekingEntriesArray => {
                    self.seek_buf.push(byte);
                    if let Some(array_start) = find_entries_array_start(&self.seek_buf) {
                        // Discard everything up to and including the '['.
                        self.seek_buf.drain(..array_start);
                        self.state = ScanState::BetweenEntries;
                    } else if self.seek_buf.len() > 64 * 1024 {
                        // Keep only a bounded tail — "entries" can't span further than this.
                        let keep_from = self.seek_buf.len() - 4096;
                        self.seek_buf.drain(..keep_from);
                    }
                }
                ScanState::BetweenEntries => {
                    if byte == b'{' {
                        self.entry_buf.clear();
                        self.entry_buf.push(byte);
                        self.in_string = false;
                        self.escaped = false;
                        self.state = ScanState::InEntry { depth: 1 };
                    }
                    // ',', whitespace, ']' (end of array) are all ignored here.
                }
                ScanState::InEntry { depth } => {
                    self.entry_buf.push(byte);
                    let mut new_depth = depth;

                    if self.in_string {
                        if self.escaped {
                            self.escaped = false;
                        } else if byte == b'\\' {
                            self.escaped = true;
                        } else if byte == b'"' {
                            self.in_string = false;
                        }
                    } else {
                        match byte {
                            b'"' => self.in_string = true,
                            b'{' => new_depth += 1,
                            b'}' => new_depth -= 1,
                            _ => {}
                        }
                    }

                    if new_depth == 0 {
                        let text = String::from_utf8_lossy(&self.entry_buf).into_owned();
                        completed.push(
                            serde_json::from_str::<Value>(&text)
                                .map_err(|e| format!("malformed entry object: {e}")),
                        );
                        self.entry_buf.clear();
                        self.state = ScanState::BetweenEntries;
                    } else {
                        self.state = ScanState::InEntry { depth: new_depth };
                    }
                }
            }
        }

        completed
    }

    /// True if scanning ended mid-object (truncated input).
    pub fn has_incomplete_trailing_entry(&self) -> bool {
        matches!(self.state, ScanState::InEntry { .. })
    }
}

/// Finds the byte index just past the `[` that opens the `entries` array,
/// given a buffer ending right after `"entries"<ws>:<ws>[`. Returns `None`
/// until enough of the buffer has arrived to make that determination.
fn find_entries_array_start(buf: &[u8]) -> Option<usize> {
    let needle = b"\"entries\"";
    let pos = find_subslice(buf, needle)?;
    let mut i = pos + needle.len();
    while i < buf.len() && buf[i].is_ascii_whitespace() {
        i += 1;
    }
    if i >= buf.len() || buf[i] != b':' {
        return None;
    }
    i += 1;
    while i < buf.len() && buf[i].is_ascii_whitespace() {
        i += 1;
    }
    if i >= buf.len() {
        return None;
    }
    if buf[i] != b'[' {
        // Not actually the entries array's colon (e.g. nested field named
        // "entries" elsewhere) — caller keeps scanning past it.
        return None;
    }
    Some(i + 1)
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scans_entries_split_across_chunks() {
        let doc = r#"{"log":{"version":"1.2","entries":[{"a":1},{"b":{"nested":"}"}},{"c":"\"quoted\""}]}}"#;
        let mut scanner = ChunkedEntryScanner::new();
        let mut all = Vec::new();
        for chunk in doc.as_bytes().chunks(7) {
            all.extend(scanner.feed(chunk));
        }
        assert_eq!(all.len(), 3);
        assert!(all.iter().all(|r| r.is_ok()));
        assert!(!scanner.has_incomplete_trailing_entry());
    }

    #[test]
    fn flags_truncated_trailing_entry() {
        let doc = r#"{"log":{"entries":[{"a":1},{"b":2"#;
        let mut scanner = ChunkedEntryScanner::new();
        scanner.feed(doc.as_bytes());
        assert!(scanner.has_incomplete_trailing_entry());
    }
}
