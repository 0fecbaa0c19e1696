//! Lookup use case.
//!
//! `LookupService` turns a raw query into one streamed completion:
//!
//! 1. reject while another lookup is in flight
//! 2. apply the submission rate gate
//! 3. sanitise the input
//! 4. resolve the current profile and build the system prompt
//! 5. stream the answer through [`StreamingClient`]

use std::sync::Arc;
use thiserror::Error;
use wordfriends_core::WordError;
use wordfriends_core::profile::ProfileRepository;
use wordfriends_core::query::{QueryError, RateGate, sanitize_input};
use wordfriends_core::settings::SettingsRepository;
use wordfriends_interaction::prompt::{PromptKind, PromptLibrary};
use wordfriends_interaction::stream::{
    ChatRequest, StreamError, StreamOutcome, StreamSink, StreamingClient,
};

/// Sampling temperature for the greeting prompt.
pub const EMPTY_INPUT_TEMPERATURE: f32 = 0.9;
/// Sampling temperature for word lookups.
pub const WORD_TEMPERATURE: f32 = 0.6;
/// User message sent when the query is empty.
pub const EMPTY_INPUT_MARKER: &str = "(empty input)";

#[derive(Error, Debug)]
pub enum LookupError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error(transparent)]
    Config(#[from] WordError),
}

impl LookupError {
    pub fn is_busy(&self) -> bool {
        matches!(self, LookupError::Stream(e) if e.is_busy())
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LookupError::Query(QueryError::RateLimited { .. }))
    }
}

pub struct LookupService {
    profiles: Arc<dyn ProfileRepository>,
    settings: Arc<dyn SettingsRepository>,
    prompts: PromptLibrary,
    client: StreamingClient,
    gate: RateGate,
}

impl LookupService {
    pub fn new(
        profiles: Arc<dyn ProfileRepository>,
        settings: Arc<dyn SettingsRepository>,
        prompts: PromptLibrary,
    ) -> Self {
        Self {
            profiles,
            settings,
            prompts,
            client: StreamingClient::new(),
            gate: RateGate::default(),
        }
    }

    pub fn with_client(mut self, client: StreamingClient) -> Self {
        self.client = client;
        self
    }

    pub fn with_rate_gate(mut self, gate: RateGate) -> Self {
        self.gate = gate;
        self
    }

    /// Handle for cancelling from another task.
    pub fn client(&self) -> &StreamingClient {
        &self.client
    }

    pub fn is_busy(&self) -> bool {
        self.client.is_busy()
    }

    pub fn cancel(&self) {
        self.client.cancel();
    }

    /// Builds the request for `raw` without sending it.
    ///
    /// Runs every admission step except the busy check.
    pub fn prepare(&self, raw: &str) -> Result<PreparedLookup, LookupError> {
        self.gate.try_acquire()?;

        let word = sanitize_input(raw);
        if word.is_empty() && !raw.trim().is_empty() {
            return Err(QueryError::InvalidInput(format!(
                "'{}' has no letters, CJK characters or hyphens",
                raw.trim()
            ))
            .into());
        }

        let profile = self.profiles.get_current()?;
        let settings = self.settings.load();
        let is_empty = word.is_empty();
        let kind = PromptKind::select(is_empty, settings.format);

        tracing::info!(
            "[Lookup] word={:?} profile={} model={} prompt={} friends={} phonetic={} difficulty={}",
            word,
            profile.id,
            profile.model,
            kind.as_str(),
            settings.friend_number,
            settings.phonetic.as_str(),
            settings.difficulty
        );

        let request = ChatRequest {
            system_prompt: self.prompts.system_prompt(kind, &settings),
            user_input: if is_empty {
                EMPTY_INPUT_MARKER.to_string()
            } else {
                word.clone()
            },
            temperature: if is_empty {
                EMPTY_INPUT_TEMPERATURE
            } else {
                WORD_TEMPERATURE
            },
        };

        Ok(PreparedLookup {
            word,
            kind,
            profile,
            request,
        })
    }

    /// Runs one lookup, streaming progress into `sink`.
    pub async fn lookup<K: StreamSink + ?Sized>(
        &self,
        raw: &str,
        sink: &mut K,
    ) -> Result<StreamOutcome, LookupError> {
        if self.client.is_busy() {
            return Err(StreamError::Busy.into());
        }

        let prepared = self.prepare(raw)?;
        let outcome = self
            .client
            .call(&prepared.profile, &prepared.request, sink)
            .await?;

        tracing::info!(
            "[Lookup] {:?} finished ({:?}, {} chars)",
            prepared.word,
            outcome.status,
            outcome.answer.chars().count()
        );
        Ok(outcome)
    }
}

/// An admitted lookup, ready to send.
#[derive(Debug, Clone)]
pub struct PreparedLookup {
    /// Sanitised query; empty for the greeting prompt.
    pub word: String,
    pub kind: PromptKind,
    pub profile: wordfriends_core::profile::EndpointProfile,
    pub request: ChatRequest,
}
