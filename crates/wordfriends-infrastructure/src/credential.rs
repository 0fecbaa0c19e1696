//! Reversible credential obfuscation.
//!
//! Stored credentials are base64 encoded so they do not sit in config files in
//! clear text. This deters casual inspection only; it is not encryption.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;

/// Encodes a plaintext credential for storage. Empty input yields empty output.
pub fn encode(plaintext: &str) -> String {
    if plaintext.is_empty() {
        return String::new();
    }
    BASE64_STANDARD.encode(plaintext.as_bytes())
}

/// Decodes a stored credential.
///
/// Input that is not valid base64 (or does not decode to UTF-8) is treated as
/// already-plaintext and returned unchanged.
pub fn decode(stored: &str) -> String {
    if stored.is_empty() {
        return String::new();
    }

    match BASE64_STANDARD
        .decode(stored.as_bytes())
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
    {
        Some(plaintext) => plaintext,
        None => {
            tracing::warn!("[Credential] Stored credential is not encoded; using it verbatim");
            stored.to_string()
        }
    }
}
