//! Query admission: input sanitising and submission rate limiting.

use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Maximum number of characters kept from a query.
pub const MAX_QUERY_CHARS: usize = 26;

/// Minimum interval between two admitted lookups.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(3000);

static DISALLOWED: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^a-zA-Z\x{4e00}-\x{9fa5}\-]").expect("static pattern is valid")
});

/// Errors raised before a lookup reaches the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Too many requests, retry in {}ms", retry_after.as_millis())]
    RateLimited { retry_after: Duration },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Trims, length-caps and filters a raw query.
///
/// Only ASCII letters, CJK unified ideographs and `-` survive.
pub fn sanitize_input(input: &str) -> String {
    let trimmed = input.trim();
    let capped: String = trimmed.chars().take(MAX_QUERY_CHARS).collect();
    let sanitized = DISALLOWED.replace_all(&capped, "").into_owned();

    if sanitized != input && !trimmed.is_empty() {
        tracing::info!("[Query] Filtered input: {:?} -> {:?}", input, sanitized);
    }

    sanitized
}

/// Rejects submissions that arrive faster than a fixed interval.
#[derive(Debug)]
pub struct RateGate {
    min_interval: Duration,
    last_admitted: Mutex<Option<Instant>>,
}

impl Default for RateGate {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

impl RateGate {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_admitted: Mutex::new(None),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Admits a submission now, recording its time.
    pub fn try_acquire(&self) -> Result<(), QueryError> {
        self.try_acquire_at(Instant::now())
    }

    /// Admits a submission at `now`, recording its time.
    pub fn try_acquire_at(&self, now: Instant) -> Result<(), QueryError> {
        let mut last = self
            .last_admitted
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = *last {
            let elapsed = now.saturating_duration_since(previous);
            if elapsed < self.min_interval {
                return Err(QueryError::RateLimited {
                    retry_after: self.min_interval - elapsed,
                });
            }
        }

        *last = Some(now);
        Ok(())
    }
}
