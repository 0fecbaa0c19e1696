use super::error::StreamError;

/// Receiver of streaming progress.
///
/// `on_delta` always gets the full text accumulated so far, never a diff, and
/// is called exactly once with `done == true` when the stream ends naturally.
/// `on_error` is called once when a request or transport failure ends the
/// session.
pub trait StreamSink: Send {
    fn on_delta(&mut self, answer: &str, reasoning: &str, done: bool);

    fn on_error(&mut self, _error: &StreamError) {}
}

/// Adapts a pair of closures to [`StreamSink`].
pub struct CallbackSink<D, E> {
    on_delta: D,
    on_error: E,
}

impl<D, E> CallbackSink<D, E>
where
    D: FnMut(&str, &str, bool) + Send,
    E: FnMut(&StreamError) + Send,
{
    pub fn new(on_delta: D, on_error: E) -> Self {
        Self { on_delta, on_error }
    }
}

impl<D, E> StreamSink for CallbackSink<D, E>
where
    D: FnMut(&str, &str, bool) + Send,
    E: FnMut(&StreamError) + Send,
{
    fn on_delta(&mut self, answer: &str, reasoning: &str, done: bool) {
        (self.on_delta)(answer, reasoning, done)
    }

    fn on_error(&mut self, error: &StreamError) {
        (self.on_error)(error)
    }
}

/// Records every callback. Used by tests across the workspace.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RecordingSink {
    pub deltas: Vec<(String, String, bool)>,
    pub errors: Vec<StreamError>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn done_count(&self) -> usize {
        self.deltas.iter().filter(|(_, _, done)| *done).count()
    }
}

impl StreamSink for RecordingSink {
    fn on_delta(&mut self, answer: &str, reasoning: &str, done: bool) {
        self.deltas
            .push((answer.to_string(), reasoning.to_string(), done));
    }

    fn on_error(&mut self, error: &StreamError) {
        self.errors.push(error.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_callback_sink_forwards() {
        let mut seen = Vec::new();
        let mut failures = 0;
        {
            let mut sink = CallbackSink::new(
                |answer: &str, _reasoning: &str, done: bool| seen.push((answer.to_string(), done)),
                |_err: &StreamError| failures += 1,
            );
            sink.on_delta("Hel", "", false);
            sink.on_error(&StreamError::Transport("reset".into()));
        }
        assert_eq!(seen, vec![("Hel".to_string(), false)]);
        assert_eq!(failures, 1);
    }
}
