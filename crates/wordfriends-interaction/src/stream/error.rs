use thiserror::Error;

/// Request-level failures surfaced by [`StreamingClient::call`](super::StreamingClient::call).
///
/// Cancellation is not an error; it is reported through
/// [`StreamStatus::Cancelled`](super::StreamStatus::Cancelled).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StreamError {
    /// A request was submitted while another one was in flight.
    #[error("A request is already in progress")]
    Busy,

    /// The endpoint answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Api { message: String, status: u16 },

    /// The connection failed before or during streaming.
    #[error("Transport error: {0}")]
    Transport(String),
}

impl StreamError {
    pub fn api(message: impl Into<String>, status: u16) -> Self {
        Self::Api {
            message: message.into(),
            status,
        }
    }

    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Busy)
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Reasons a single frame is dropped. Logged, never escalated.
#[derive(Error, Debug)]
pub enum FrameError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload has no choices[0].delta")]
    MissingDelta,

    #[error("upstream error: {0}")]
    Upstream(String),
}
