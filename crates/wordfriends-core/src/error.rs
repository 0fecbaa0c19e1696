//! Error type shared by the configuration and storage layers.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WordError {
    /// No entity with this id exists.
    #[error("No {entity_type} with id '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    #[error("I/O failure: {message}")]
    Io { message: String },

    /// A stored document could not be decoded or encoded.
    #[error("Malformed {format} data: {message}")]
    Serialization {
        format: &'static str,
        message: String,
    },

    /// Built-in entities live in memory and cannot be edited or removed.
    #[error("Read-only {entity_type} '{id}' cannot be modified")]
    ReadOnly {
        entity_type: &'static str,
        id: String,
    },
}

impl WordError {
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    pub fn read_only(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::ReadOnly {
            entity_type,
            id: id.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::ReadOnly { .. })
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Self::Serialization { .. })
    }
}

impl From<std::io::Error> for WordError {
    fn from(err: std::io::Error) -> Self {
        Self::io(format!("{err} ({:?})", err.kind()))
    }
}

impl From<toml::de::Error> for WordError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML",
            message: err.message().to_string(),
        }
    }
}

impl From<toml::ser::Error> for WordError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML",
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, WordError>;
