//! Single-flight HTTP client for streamed chat completions.

use super::error::StreamError;
use super::session::{StreamOutcome, pump};
use super::sink::StreamSink;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio_util::sync::CancellationToken;
use wordfriends_core::profile::EndpointProfile;
use wordfriends_infrastructure::credential;

const ERROR_BODY_PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Idle,
    Requesting,
    Streaming,
}

/// Prompt and sampling parameters for one call.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    pub system_prompt: String,
    pub user_input: String,
    pub temperature: f32,
}

#[derive(Debug)]
struct ActiveFlight {
    generation: u64,
    phase: ClientState,
    transport: CancellationToken,
    reader: CancellationToken,
}

#[derive(Debug, Default)]
struct FlightSlot {
    generation: u64,
    active: Option<ActiveFlight>,
}

/// Streams chat completions with at most one request in flight.
///
/// Clones share the same flight slot, so a clone held by a signal handler can
/// cancel a call awaited elsewhere.
#[derive(Clone)]
pub struct StreamingClient {
    http: Client,
    slot: Arc<Mutex<FlightSlot>>,
}

impl Default for StreamingClient {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingClient {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(http: Client) -> Self {
        Self {
            http,
            slot: Arc::new(Mutex::new(FlightSlot::default())),
        }
    }

    pub fn state(&self) -> ClientState {
        self.lock()
            .active
            .as_ref()
            .map(|flight| flight.phase)
            .unwrap_or(ClientState::Idle)
    }

    pub fn is_busy(&self) -> bool {
        self.lock().active.is_some()
    }

    /// Aborts the in-flight request, if any.
    ///
    /// The slot is released before returning, so a new call can start even if
    /// the aborted one has not unwound yet. Safe to call in any state.
    pub fn cancel(&self) {
        let Some(flight) = self.lock().active.take() else {
            tracing::debug!("[Stream] cancel: no request in flight");
            return;
        };

        flight.transport.cancel();
        flight.reader.cancel();
        tracing::info!(
            "[Stream] Cancelled request #{} while {:?}",
            flight.generation,
            flight.phase
        );
    }

    /// Sends `request` to `profile` and streams the answer into `sink`.
    ///
    /// Fails with [`StreamError::Busy`] without touching the network or the
    /// sink when another call is in flight. Any other failure is also passed
    /// to `sink.on_error` once. A cancelled call resolves to `Ok` with
    /// [`StreamStatus::Cancelled`](super::StreamStatus::Cancelled).
    pub async fn call<K: StreamSink + ?Sized>(
        &self,
        profile: &EndpointProfile,
        request: &ChatRequest,
        sink: &mut K,
    ) -> Result<StreamOutcome, StreamError> {
        let guard = self.acquire()?;

        let result = self.run(&guard, profile, request, sink).await;
        if let Err(err) = &result {
            tracing::error!("[Stream] Request #{} failed: {}", guard.generation, err);
            sink.on_error(err);
        }
        result
    }

    async fn run<K: StreamSink + ?Sized>(
        &self,
        guard: &FlightGuard,
        profile: &EndpointProfile,
        request: &ChatRequest,
        sink: &mut K,
    ) -> Result<StreamOutcome, StreamError> {
        let body = ChatCompletionRequest::new(&profile.model, request);
        let api_key = credential::decode(&profile.credential);

        tracing::info!(
            "[Stream] Request #{} to '{}' (model={}, temperature={}, credential={})",
            guard.generation,
            profile.name,
            profile.model,
            request.temperature,
            if api_key.is_empty() { "missing" } else { "set" }
        );

        let send = self
            .http
            .post(&profile.base_url)
            .header("Authorization", format!("Bearer {}", api_key))
            .header("content-type", "application/json")
            .json(&body)
            .send();

        let response = tokio::select! {
            biased;
            _ = guard.transport.cancelled() => {
                return Ok(StreamOutcome::cancelled_before_stream());
            }
            response = send => response.map_err(|err| {
                StreamError::Transport(format!("request failed: {err}"))
            })?,
        };

        if !response.status().is_success() {
            let status = response.status();
            let body_text = tokio::select! {
                biased;
                _ = guard.transport.cancelled() => {
                    return Ok(StreamOutcome::cancelled_before_stream());
                }
                text = response.text() => text.unwrap_or_default(),
            };
            return Err(map_http_error(status, &body_text));
        }

        guard.enter(ClientState::Streaming);
        tracing::debug!("[Stream] Request #{} streaming", guard.generation);

        let body = response.bytes_stream();
        tokio::pin!(body);
        pump(body, &guard.reader, sink).await
    }

    fn acquire(&self) -> Result<FlightGuard, StreamError> {
        let mut slot = self.lock();
        if slot.active.is_some() {
            tracing::warn!("[Stream] Rejected: a request is already in flight");
            return Err(StreamError::Busy);
        }

        slot.generation += 1;
        let generation = slot.generation;
        let transport = CancellationToken::new();
        let reader = CancellationToken::new();
        slot.active = Some(ActiveFlight {
            generation,
            phase: ClientState::Requesting,
            transport: transport.clone(),
            reader: reader.clone(),
        });

        Ok(FlightGuard {
            slot: Arc::clone(&self.slot),
            generation,
            transport,
            reader,
        })
    }

    fn lock(&self) -> MutexGuard<'_, FlightSlot> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Releases the flight slot on every exit path.
///
/// Only clears the slot if it still belongs to this call; after `cancel()`
/// a newer call may already own it.
#[derive(Debug)]
struct FlightGuard {
    slot: Arc<Mutex<FlightSlot>>,
    generation: u64,
    transport: CancellationToken,
    reader: CancellationToken,
}

impl FlightGuard {
    fn enter(&self, phase: ClientState) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(flight) = slot.active.as_mut() {
            if flight.generation == self.generation {
                flight.phase = phase;
            }
        }
    }
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        let owned = slot
            .active
            .as_ref()
            .is_some_and(|flight| flight.generation == self.generation);
        if owned {
            slot.active = None;
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    stream: bool,
    temperature: f32,
    messages: [ChatMessage<'a>; 2],
}

impl<'a> ChatCompletionRequest<'a> {
    fn new(model: &'a str, request: &'a ChatRequest) -> Self {
        Self {
            model,
            stream: true,
            temperature: request.temperature,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_input,
                },
            ],
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

fn map_http_error(status: StatusCode, body: &str) -> StreamError {
    let code = status.as_u16();
    let message = match serde_json::from_str::<ErrorResponse>(body) {
        Ok(wrapper) => wrapper
            .error
            .and_then(|error| error.message)
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("API error ({code})")),
        Err(_) => {
            let preview: String = body.chars().take(ERROR_BODY_PREVIEW_CHARS).collect();
            format!("Request failed ({code}): {preview}")
        }
    };
    StreamError::api(message, code)
}
