//! JSON payload of a single `data: ` frame.

use super::error::FrameError;
use serde::Deserialize;
use serde_json::Value;

/// One parsed unit extracted from a frame.
///
/// A frame may carry reasoning, answer text, both, or neither (a role-only
/// opening frame, for instance).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDelta {
    pub reasoning: Option<String>,
    pub answer: Option<String>,
}

impl ContentDelta {
    pub fn is_empty(&self) -> bool {
        self.reasoning.is_none() && self.answer.is_none()
    }
}

#[derive(Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    delta: Option<Delta>,
}

#[derive(Deserialize)]
struct Delta {
    content: Option<String>,
    reasoning_content: Option<String>,
}

/// Parses `{ choices: [ { delta: { content?, reasoning_content? } } ] }`.
pub fn parse_frame(payload: &str) -> Result<ContentDelta, FrameError> {
    let value: Value = serde_json::from_str(payload)?;

    if let Some(message) = extract_upstream_error(&value) {
        return Err(FrameError::Upstream(message));
    }

    let chunk: ChunkPayload = serde_json::from_value(value)?;
    let delta = chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta)
        .ok_or(FrameError::MissingDelta)?;

    Ok(ContentDelta {
        reasoning: non_empty(delta.reasoning_content),
        answer: non_empty(delta.content),
    })
}

fn extract_upstream_error(value: &Value) -> Option<String> {
    let error = value.get("error")?;
    if error.is_null() {
        return None;
    }
    if let Some(message) = error.get("message").and_then(Value::as_str) {
        return Some(message.to_string());
    }
    if let Some(message) = error.as_str() {
        return Some(message.to_string());
    }
    Some("An error occurred during streaming".to_string())
}

fn non_empty(text: Option<String>) -> Option<String> {
    text.filter(|t| !t.is_empty())
}
