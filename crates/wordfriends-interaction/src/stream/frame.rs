//! Line framing of the event stream.
//!
//! The body is newline-delimited text. Only lines starting with `data: ` are
//! significant, and a payload of exactly `[DONE]` marks the end of the stream
//! at the framing level.

use super::utf8::Utf8Decoder;

pub const DATA_PREFIX: &str = "data: ";
pub const DONE_SENTINEL: &str = "[DONE]";

/// Splits raw body chunks into data payloads.
///
/// Holds the UTF-8 carry-over and the partial line left by the previous chunk,
/// so a frame may be split at any byte offset.
#[derive(Debug, Default)]
pub struct FrameSplitter {
    decoder: Utf8Decoder,
    remainder: String,
    saw_done: bool,
}

impl FrameSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one chunk and returns the payloads of every line it completed.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let text = self.decoder.decode(bytes);
        self.remainder.push_str(&text);

        let mut payloads = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.remainder[start..].find('\n') {
            let end = start + offset;
            if let Some(payload) = accept(&self.remainder[start..end], &mut self.saw_done) {
                payloads.push(payload);
            }
            start = end + 1;
        }
        self.remainder.drain(..start);
        payloads
    }

    /// Flushes the final unterminated line, if any.
    pub fn finish(&mut self) -> Vec<String> {
        let tail = self.decoder.finish();
        self.remainder.push_str(&tail);

        let line = std::mem::take(&mut self.remainder);
        accept(&line, &mut self.saw_done).into_iter().collect()
    }

    /// Whether a `[DONE]` sentinel line has been seen.
    pub fn saw_done(&self) -> bool {
        self.saw_done
    }
}

/// Returns the payload of one `data: ` line, recording the sentinel in `saw_done`.
fn accept(line: &str, saw_done: &mut bool) -> Option<String> {
    let line = line.trim_end_matches(['\n', '\r']);
    let payload = line.strip_prefix(DATA_PREFIX)?;

    if payload.trim() == DONE_SENTINEL {
        *saw_done = true;
        return None;
    }
    Some(payload.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complete_lines() {
        let mut splitter = FrameSplitter::new();
        let payloads = splitter.push(b"data: {\"a\":1}\n\ndata: {\"b\":2}\n");
        assert_eq!(payloads, vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[test]
    fn test_partial_line_is_held_until_newline() {
        let mut splitter = FrameSplitter::new();
        assert!(splitter.push(b"data: {\"a\"").is_empty());
        assert_eq!(splitter.push(b":1}\r\n"), vec!["{\"a\":1}"]);
    }

    #[test]
    fn test_non_data_lines_and_sentinel_skipped() {
        let mut splitter = FrameSplitter::new();
        let payloads = splitter.push(b": keep-alive\nevent: message\ndata: [DONE]\n");
        assert!(payloads.is_empty());
        assert!(splitter.saw_done());
    }

    #[test]
    fn test_sentinel_text_inside_content_is_kept() {
        let mut splitter = FrameSplitter::new();
        let payloads = splitter.push(b"data: {\"c\":\"[DONE] is a word\"}\n");
        assert_eq!(payloads.len(), 1);
        assert!(!splitter.saw_done());
    }

    #[test]
    fn test_finish_flushes_unterminated_line() {
        let mut splitter = FrameSplitter::new();
        assert!(splitter.push(b"data: {\"x\":true}").is_empty());
        assert_eq!(splitter.finish(), vec!["{\"x\":true}"]);
        assert!(splitter.finish().is_empty());
    }

    #[test]
    fn test_prefix_split_across_chunks() {
        let mut splitter = FrameSplitter::new();
        assert!(splitter.push(b"da").is_empty());
        assert!(splitter.push(b"ta: 1").is_empty());
        assert_eq!(splitter.push(b"\n"), vec!["1"]);
    }

    #[test]
    fn test_consecutive_data_lines_are_separate_frames() {
        // No blank line between the two events; each line still stands alone.
        let mut splitter = FrameSplitter::new();
        let payloads = splitter.push(b"data: {\"a\":1}\ndata: {\"b\":2}\n");
        assert_eq!(payloads, vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[test]
    fn test_many_lines_in_one_chunk_keep_trailing_partial() {
        let mut body = String::new();
        for i in 0..500 {
            body.push_str(&format!("data: {i}\n"));
        }
        body.push_str("data: tail");

        let mut splitter = FrameSplitter::new();
        let payloads = splitter.push(body.as_bytes());
        assert_eq!(payloads.len(), 500);
        assert_eq!(payloads[0], "0");
        assert_eq!(payloads[499], "499");
        assert_eq!(splitter.finish(), vec!["tail"]);
    }
}
