//! Per-request stream state and the read loop.

use super::error::{FrameError, StreamError};
use super::frame::FrameSplitter;
use super::payload::{ContentDelta, parse_frame};
use super::reasoning::ReasoningLog;
use super::sink::StreamSink;
use futures::{Stream, StreamExt};
use std::fmt::Display;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamStatus {
    Completed,
    Cancelled,
}

/// Accumulated buffers handed back to the caller when a session ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamOutcome {
    pub answer: String,
    pub reasoning: String,
    pub status: StreamStatus,
}

impl StreamOutcome {
    pub fn is_cancelled(&self) -> bool {
        self.status == StreamStatus::Cancelled
    }

    pub(crate) fn cancelled_before_stream() -> Self {
        Self {
            answer: String::new(),
            reasoning: String::new(),
            status: StreamStatus::Cancelled,
        }
    }
}

/// State for one in-flight stream.
///
/// Owns the decoder carry-over and line remainder, so it must never be shared
/// between requests. Both accumulators are append-only.
#[derive(Debug, Default)]
pub struct StreamSession {
    splitter: FrameSplitter,
    answer: String,
    reasoning: String,
    answer_started: bool,
    reasoning_log: ReasoningLog,
    frames: usize,
    dropped: usize,
}

impl StreamSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn reasoning(&self) -> &str {
        &self.reasoning
    }

    /// Feeds raw body bytes, delivering answer deltas to `sink` in frame order.
    pub fn apply_chunk<K: StreamSink + ?Sized>(&mut self, bytes: &[u8], sink: &mut K) {
        for payload in self.splitter.push(bytes) {
            self.apply_frame(&payload, sink);
        }
    }

    fn apply_frame<K: StreamSink + ?Sized>(&mut self, payload: &str, sink: &mut K) {
        self.frames += 1;
        match parse_frame(payload) {
            Ok(delta) => self.apply_delta(delta, sink),
            Err(FrameError::Upstream(message)) => {
                self.dropped += 1;
                tracing::warn!("[Stream] Upstream error in stream, frame skipped: {}", message);
            }
            Err(e) => {
                self.dropped += 1;
                tracing::warn!("[Stream] Dropping frame ({}): {}", e, payload);
            }
        }
    }

    fn apply_delta<K: StreamSink + ?Sized>(&mut self, delta: ContentDelta, sink: &mut K) {
        tracing::trace!("[Stream] delta {:?}", delta);

        if let Some(reasoning) = delta.reasoning {
            self.reasoning.push_str(&reasoning);
            self.reasoning_log.push(&reasoning);
        }

        if let Some(answer) = delta.answer {
            if !self.answer_started {
                self.answer_started = true;
                self.reasoning_log.flush();
            }
            self.answer.push_str(&answer);
            sink.on_delta(&self.answer, &self.reasoning, false);
        }
    }

    /// Ends the session on natural end-of-stream.
    ///
    /// Processes any unterminated final line, flushes the reasoning log, and
    /// calls `on_delta(.., done = true)` exactly once.
    pub fn finish<K: StreamSink + ?Sized>(mut self, sink: &mut K) -> StreamOutcome {
        for payload in self.splitter.finish() {
            self.apply_frame(&payload, sink);
        }
        self.reasoning_log.flush();

        tracing::debug!(
            "[Stream] Completed: {} frames ({} dropped), sentinel seen: {}, answer {} chars",
            self.frames,
            self.dropped,
            self.splitter.saw_done(),
            self.answer.chars().count()
        );
        sink.on_delta(&self.answer, &self.reasoning, true);

        StreamOutcome {
            answer: self.answer,
            reasoning: self.reasoning,
            status: StreamStatus::Completed,
        }
    }

    /// Ends the session on cancellation, returning what was accumulated.
    pub fn cancelled(self) -> StreamOutcome {
        tracing::debug!(
            "[Stream] Cancelled after {} frames, answer {} chars",
            self.frames,
            self.answer.chars().count()
        );
        StreamOutcome {
            answer: self.answer,
            reasoning: self.reasoning,
            status: StreamStatus::Cancelled,
        }
    }
}

/// Drives a fresh session over a body stream until it ends, fails, or
/// `reader` is cancelled.
///
/// Cancellation is checked before every read, and the task yields between
/// chunks. `on_error` is left to the caller.
pub async fn pump<St, B, E, K>(
    mut body: St,
    reader: &CancellationToken,
    sink: &mut K,
) -> Result<StreamOutcome, StreamError>
where
    St: Stream<Item = Result<B, E>> + Unpin,
    B: AsRef<[u8]>,
    E: Display,
    K: StreamSink + ?Sized,
{
    let mut session = StreamSession::new();

    loop {
        tokio::select! {
            biased;

            _ = reader.cancelled() => {
                return Ok(session.cancelled());
            }

            next = body.next() => match next {
                Some(Ok(chunk)) => session.apply_chunk(chunk.as_ref(), sink),
                Some(Err(e)) => {
                    return Err(StreamError::Transport(format!(
                        "stream interrupted after {} chars: {}",
                        session.answer().chars().count(),
                        e
                    )));
                }
                None => return Ok(session.finish(sink)),
            }
        }

        tokio::task::yield_now().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::sink::RecordingSink;
    use futures::stream;

    const HEL: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"Hel\"}}]}\n";
    const LO: &str = "data: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n";

    fn ok_chunks(chunks: Vec<Vec<u8>>) -> impl Stream<Item = Result<Vec<u8>, String>> + Unpin {
        stream::iter(chunks.into_iter().map(Ok))
    }

    fn delta(answer: &str, reasoning: &str, done: bool) -> (String, String, bool) {
        (answer.to_string(), reasoning.to_string(), done)
    }

    #[tokio::test]
    async fn test_happy_path() {
        let mut sink = RecordingSink::new();
        let token = CancellationToken::new();
        let body = ok_chunks(vec![HEL.into(), LO.into()]);

        let outcome = pump(body, &token, &mut sink).await.unwrap();

        assert_eq!(outcome.status, StreamStatus::Completed);
        assert_eq!(outcome.answer, "Hello");
        assert_eq!(
            sink.deltas,
            vec![
                delta("Hel", "", false),
                delta("Hello", "", false),
                delta("Hello", "", true),
            ]
        );
        assert!(sink.errors.is_empty());
    }

    #[tokio::test]
    async fn test_empty_stream_reports_done_once() {
        let mut sink = RecordingSink::new();
        let token = CancellationToken::new();

        let outcome = pump(ok_chunks(vec![]), &token, &mut sink).await.unwrap();

        assert_eq!(outcome.answer, "");
        assert_eq!(sink.deltas, vec![delta("", "", true)]);
    }

    #[tokio::test]
    async fn test_sentinel_only_stream() {
        let mut sink = RecordingSink::new();
        let token = CancellationToken::new();
        let body = ok_chunks(vec![b"data: [DONE]\n\n".to_vec()]);

        pump(body, &token, &mut sink).await.unwrap();
        assert_eq!(sink.deltas, vec![delta("", "", true)]);
    }

    #[tokio::test]
    async fn test_reasoning_before_answer() {
        let mut sink = RecordingSink::new();
        let token = CancellationToken::new();
        let body = ok_chunks(vec![
            "data: {\"choices\":[{\"delta\":{\"reasoning_content\":\"Thinking。\"}}]}\n".into(),
            "data: {\"choices\":[{\"delta\":{\"content\":\"Answer\"}}]}\n".into(),
        ]);

        let outcome = pump(body, &token, &mut sink).await.unwrap();

        assert_eq!(outcome.reasoning, "Thinking。");
        assert_eq!(
            sink.deltas,
            vec![
                delta("Answer", "Thinking。", false),
                delta("Answer", "Thinking。", true),
            ]
        );
    }

    #[tokio::test]
    async fn test_malformed_frames_are_skipped() {
        let mut sink = RecordingSink::new();
        let token = CancellationToken::new();
        let body = ok_chunks(vec![
            HEL.into(),
            b"data: {broken\n".to_vec(),
            b"data: {\"choices\":[]}\n".to_vec(),
            b"data: {\"error\":{\"message\":\"hiccup\"}}\n".to_vec(),
            LO.into(),
        ]);

        let outcome = pump(body, &token, &mut sink).await.unwrap();

        assert_eq!(outcome.answer, "Hello");
        assert_eq!(sink.deltas.len(), 3);
    }

    #[tokio::test]
    async fn test_every_chunk_split_gives_same_deltas() {
        let body = format!(
            "{}data: {{\"choices\":[{{\"delta\":{{\"reasoning_content\":\"想一想。\"}}}}]}}\n\
             data: {{\"choices\":[{{\"delta\":{{\"content\":\"朋友\"}}}}]}}\r\n{}data: [DONE]\n",
            HEL, LO
        );
        let bytes = body.as_bytes();

        let token = CancellationToken::new();
        let mut expected = RecordingSink::new();
        pump(ok_chunks(vec![bytes.to_vec()]), &token, &mut expected)
            .await
            .unwrap();
        assert_eq!(expected.deltas.last(), Some(&delta("Hel朋友lo", "想一想。", true)));

        for split in 1..bytes.len() {
            let mut sink = RecordingSink::new();
            let chunks = vec![bytes[..split].to_vec(), bytes[split..].to_vec()];
            pump(ok_chunks(chunks), &token, &mut sink).await.unwrap();
            assert_eq!(sink.deltas, expected.deltas, "split at {split}");
        }

        let mut sink = RecordingSink::new();
        let singles = bytes.iter().map(|b| vec![*b]).collect();
        pump(ok_chunks(singles), &token, &mut sink).await.unwrap();
        assert_eq!(sink.deltas, expected.deltas);
    }

    #[tokio::test]
    async fn test_unterminated_final_frame_is_processed() {
        let mut sink = RecordingSink::new();
        let token = CancellationToken::new();
        let body = ok_chunks(vec![HEL.into(), LO.trim_end().into()]);

        let outcome = pump(body, &token, &mut sink).await.unwrap();
        assert_eq!(outcome.answer, "Hello");
        assert_eq!(sink.done_count(), 1);
    }

    #[tokio::test]
    async fn test_transport_error_mid_stream() {
        let mut sink = RecordingSink::new();
        let token = CancellationToken::new();
        let body = stream::iter(vec![
            Ok(HEL.as_bytes().to_vec()),
            Err("connection reset".to_string()),
        ]);

        let err = pump(body, &token, &mut sink).await.unwrap_err();

        assert!(matches!(err, StreamError::Transport(ref m) if m.contains("connection reset")));
        assert_eq!(sink.done_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_token_wins_over_pending_data() {
        let mut sink = RecordingSink::new();
        let token = CancellationToken::new();
        token.cancel();

        let outcome = pump(ok_chunks(vec![HEL.into()]), &token, &mut sink)
            .await
            .unwrap();

        assert!(outcome.is_cancelled());
        assert!(sink.deltas.is_empty());
    }

    #[tokio::test]
    async fn test_cancel_mid_stream_keeps_partial_buffers() {
        let token = CancellationToken::new();
        let cancel_on_first = token.clone();
        let mut sink = crate::stream::sink::CallbackSink::new(
            move |_answer: &str, _reasoning: &str, _done: bool| cancel_on_first.cancel(),
            |_err: &StreamError| {},
        );
        let body = ok_chunks(vec![HEL.into(), LO.into()]);

        let outcome = pump(body, &token, &mut sink).await.unwrap();

        assert!(outcome.is_cancelled());
        assert_eq!(outcome.answer, "Hel");
    }
}
