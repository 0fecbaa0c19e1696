pub mod prompt;
pub mod render;
pub mod stream;

pub use crate::prompt::{PromptKind, PromptLibrary};
pub use crate::render::{MarkdownSink, ResultView};
pub use crate::stream::{
    ChatRequest, ClientState, StreamError, StreamOutcome, StreamSink, StreamStatus,
    StreamingClient,
};
