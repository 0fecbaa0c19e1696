pub mod error;
pub mod profile;
pub mod query;
pub mod settings;

// Re-export common error type
pub use error::WordError;
