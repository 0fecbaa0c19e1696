//! Application layer for Word'n'Friends.
//!
//! Coordinates the configuration store, user settings and the streaming
//! client to run one vocabulary lookup, and fetches the daily quote.

pub mod lookup_service;
pub mod quote_service;

pub use lookup_service::{LookupError, LookupService, PreparedLookup};
pub use quote_service::{Quote, QuoteService};
