//! Streaming protocol client.
//!
//! Body bytes flow through [`Utf8Decoder`] and [`FrameSplitter`], each data
//! payload is parsed by [`parse_frame`], and a [`StreamSession`] accumulates
//! the answer and reasoning channels and reports progress to a
//! [`StreamSink`]. [`StreamingClient`] owns the HTTP call and the
//! single-flight slot.

mod client;
mod error;
mod frame;
mod payload;
mod reasoning;
mod session;
mod sink;
mod utf8;

pub use client::{ChatRequest, ClientState, StreamingClient};
pub use error::{FrameError, StreamError};
pub use frame::{DATA_PREFIX, DONE_SENTINEL, FrameSplitter};
pub use payload::{ContentDelta, parse_frame};
pub use reasoning::{REASONING_TARGET, ReasoningLog, SENTENCE_TERMINATOR};
pub use session::{StreamOutcome, StreamSession, StreamStatus, pump};
pub use sink::{CallbackSink, RecordingSink, StreamSink};
pub use utf8::Utf8Decoder;
