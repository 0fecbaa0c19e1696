//! Sentence-grouped logging of the reasoning channel.
//!
//! Purely observational: nothing here feeds back into the sink contract.

pub const SENTENCE_TERMINATOR: char = '。';
pub const REASONING_TARGET: &str = "wordfriends::reasoning";

#[derive(Debug, Default)]
pub struct ReasoningLog {
    pending: String,
}

impl ReasoningLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a fragment and returns (and logs) every sentence it completed.
    pub fn push(&mut self, fragment: &str) -> Vec<String> {
        self.pending.push_str(fragment);
        if !fragment.contains(SENTENCE_TERMINATOR) {
            return Vec::new();
        }

        let mut parts: Vec<&str> = self.pending.split(SENTENCE_TERMINATOR).collect();
        let tail = parts.pop().unwrap_or_default().to_string();

        let sentences: Vec<String> = parts
            .into_iter()
            .filter_map(|part| normalize(&format!("{part}{SENTENCE_TERMINATOR}")))
            .collect();
        self.pending = tail;

        for sentence in &sentences {
            tracing::info!(target: REASONING_TARGET, "{}", sentence);
        }
        sentences
    }

    /// Emits the trailing incomplete fragment, if any.
    pub fn flush(&mut self) -> Option<String> {
        let pending = std::mem::take(&mut self.pending);
        let sentence = normalize(&pending)?;
        tracing::info!(target: REASONING_TARGET, "{}", sentence);
        Some(sentence)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.trim().is_empty()
    }
}

fn normalize(text: &str) -> Option<String> {
    let collapsed = text
        .trim()
        .split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    if collapsed.is_empty() || collapsed == SENTENCE_TERMINATOR.to_string() {
        None
    } else {
        Some(collapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentence_completed_across_fragments() {
        let mut log = ReasoningLog::new();
        assert!(log.push("Think").is_empty());
        assert_eq!(log.push("ing。Next"), vec!["Thinking。"]);
        assert!(log.has_pending());
        assert_eq!(log.flush().as_deref(), Some("Next"));
        assert_eq!(log.flush(), None);
    }

    #[test]
    fn test_multiple_sentences_and_newlines() {
        let mut log = ReasoningLog::new();
        let sentences = log.push("first\nline。second。");
        assert_eq!(sentences, vec!["first line。", "second。"]);
        assert!(!log.has_pending());
    }

    #[test]
    fn test_bare_terminators_are_not_sentences() {
        let mut log = ReasoningLog::new();
        assert!(log.push("。。").is_empty());
    }
}
