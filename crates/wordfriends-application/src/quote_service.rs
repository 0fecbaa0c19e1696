//! Daily quote.
//!
//! Asks the current profile for a short bilingual "quote of the day" and
//! caches the result for the lifetime of the service. Every failure degrades
//! to [`Quote::default_quote`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use wordfriends_core::profile::ProfileRepository;
use wordfriends_interaction::stream::{CallbackSink, ChatRequest, StreamError, StreamingClient};

/// Sampling temperature for the quote request.
pub const QUOTE_TEMPERATURE: f32 = 0.8;
/// User message sent with the quote prompt.
pub const QUOTE_REQUEST: &str = "请给我今天的每日一句";

const QUOTE_SYSTEM_PROMPT: &str = r#"你的名字是"Word'n'Friends"，请你模仿英语学习网站的风格，返回一句英文"每日一句"。文风有诗意，友好而具有启发性。内容来源可以是原创，也可以是英文名著、经典台词、经典诗句。返回内容包括，英文每日一句，中文翻译，作者名。如果是原创，则作者名写"Word'n'Friends"。返回格式是json格式，示例如下：
{"english":"Here is one day one sentence.","chinese":"这里是每日一句。","source":"-- Author Name"}"#;

const DEFAULT_ENGLISH: &str = "Something worth having is worth waiting for.";
const DEFAULT_CHINESE: &str = "值得拥有的东西，值得等待。";
const DEFAULT_SOURCE: &str = "—— Word'n'Friends";

static JSON_OBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{[\s\S]*\}").expect("static pattern is valid"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub english: String,
    pub chinese: String,
    pub source: String,
}

impl Quote {
    pub fn default_quote() -> Self {
        Self {
            english: DEFAULT_ENGLISH.to_string(),
            chinese: DEFAULT_CHINESE.to_string(),
            source: DEFAULT_SOURCE.to_string(),
        }
    }

    /// Extracts a quote from a model answer.
    ///
    /// Takes the outermost `{...}` span, so surrounding prose and code fences
    /// are ignored. Missing or empty fields fall back to the default quote.
    pub fn from_answer(answer: &str) -> Option<Self> {
        let json = JSON_OBJECT.find(answer)?.as_str();
        let raw: RawQuote = match serde_json::from_str(json) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("[Quote] Unparseable quote JSON: {}", e);
                return None;
            }
        };
        Some(Self {
            english: non_empty_or(raw.english, DEFAULT_ENGLISH),
            chinese: non_empty_or(raw.chinese, DEFAULT_CHINESE),
            source: non_empty_or(raw.source, DEFAULT_SOURCE),
        })
    }
}

#[derive(Deserialize)]
struct RawQuote {
    #[serde(default)]
    english: Option<String>,
    #[serde(default)]
    chinese: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

pub struct QuoteService {
    profiles: Arc<dyn ProfileRepository>,
    client: StreamingClient,
    cached: Mutex<Option<Quote>>,
}

impl QuoteService {
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self {
            profiles,
            client: StreamingClient::new(),
            cached: Mutex::new(None),
        }
    }

    /// Shares a client with another service so both obey one flight slot.
    pub fn with_client(mut self, client: StreamingClient) -> Self {
        self.client = client;
        self
    }

    pub fn client(&self) -> &StreamingClient {
        &self.client
    }

    /// Returns the cached quote, fetching it on first use.
    pub async fn daily(&self) -> Quote {
        if let Some(quote) = self.cached() {
            tracing::debug!("[Quote] Using cached quote");
            return quote;
        }

        let Some(quote) = self.fetch().await else {
            return Quote::default_quote();
        };
        *self.cached.lock().unwrap_or_else(PoisonError::into_inner) = Some(quote.clone());
        quote
    }

    pub fn cached(&self) -> Option<Quote> {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn clear_cache(&self) {
        self.cached
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
    }

    /// Requests a new quote. `None` means the result must not be cached.
    async fn fetch(&self) -> Option<Quote> {
        let profile = match self.profiles.get_current() {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!("[Quote] No profile available, using default: {}", e);
                return Some(Quote::default_quote());
            }
        };

        let request = ChatRequest {
            system_prompt: QUOTE_SYSTEM_PROMPT.to_string(),
            user_input: QUOTE_REQUEST.to_string(),
            temperature: QUOTE_TEMPERATURE,
        };

        tracing::info!("[Quote] Fetching daily quote from {}", profile.id);
        let mut sink = CallbackSink::new(|_: &str, _: &str, _: bool| {}, |_: &StreamError| {});
        match self.client.call(&profile, &request, &mut sink).await {
            Ok(outcome) if outcome.is_cancelled() => {
                tracing::info!("[Quote] Cancelled, using default");
                None
            }
            Ok(outcome) => Some(Quote::from_answer(&outcome.answer).unwrap_or_else(|| {
                tracing::warn!("[Quote] No quote in answer, using default");
                Quote::default_quote()
            })),
            Err(e) if e.is_busy() => {
                tracing::warn!("[Quote] Client busy, using default");
                None
            }
            Err(e) => {
                tracing::warn!("[Quote] Request failed, using default: {}", e);
                Some(Quote::default_quote())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_answer_reads_all_fields() {
        let quote = Quote::from_answer(
            r#"{"english":"Stay curious.","chinese":"保持好奇。","source":"-- Anon"}"#,
        )
        .unwrap();
        assert_eq!(quote.english, "Stay curious.");
        assert_eq!(quote.chinese, "保持好奇。");
        assert_eq!(quote.source, "-- Anon");
    }

    #[test]
    fn test_from_answer_fills_empty_fields() {
        let quote = Quote::from_answer(r#"{"english":"Go.","source":""}"#).unwrap();
        assert_eq!(quote.english, "Go.");
        assert_eq!(quote.chinese, DEFAULT_CHINESE);
        assert_eq!(quote.source, DEFAULT_SOURCE);
    }

    #[test]
    fn test_from_answer_without_object() {
        assert_eq!(Quote::from_answer("no json here"), None);
        assert_eq!(Quote::from_answer("{not json}"), None);
    }
}
