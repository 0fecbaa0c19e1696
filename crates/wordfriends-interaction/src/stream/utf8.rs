//! Stateful UTF-8 decoding across chunk boundaries.

const REPLACEMENT: char = '\u{FFFD}';

/// Decodes a byte stream chunk by chunk.
///
/// A multi-byte sequence split across two chunks is carried over and completed
/// by the next call. Invalid sequences become U+FFFD. One decoder belongs to
/// one stream session and is never reset mid-session.
#[derive(Debug, Default)]
pub struct Utf8Decoder {
    pending: Vec<u8>,
}

impl Utf8Decoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes as much of `pending + bytes` as forms complete characters.
    pub fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);

        let mut out = String::with_capacity(self.pending.len());
        let mut consumed = 0;

        loop {
            let rest = &self.pending[consumed..];
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    consumed = self.pending.len();
                    break;
                }
                Err(e) => {
                    let valid_up_to = e.valid_up_to();
                    if let Ok(prefix) = std::str::from_utf8(&rest[..valid_up_to]) {
                        out.push_str(prefix);
                    }
                    match e.error_len() {
                        Some(invalid) => {
                            out.push(REPLACEMENT);
                            consumed += valid_up_to + invalid;
                        }
                        None => {
                            // Incomplete trailing sequence; wait for more bytes.
                            consumed += valid_up_to;
                            break;
                        }
                    }
                }
            }
        }

        self.pending.drain(..consumed);
        out
    }

    /// Flushes whatever is still pending at end of stream.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        tail
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }
}
