//! Endpoint profile domain model.
//!
//! A profile is a named set of connection parameters for a chat-completion
//! endpoint. Built-in profiles come from the default source and live only in
//! memory; user profiles are persisted.

use serde::{Deserialize, Serialize};

/// Represents where a profile came from.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProfileSource {
    /// Loaded from the default profile source at startup
    BuiltIn,
    /// Created and edited by the user
    User,
}

impl Default for ProfileSource {
    fn default() -> Self {
        ProfileSource::User
    }
}

/// Connection parameters for one chat-completion endpoint.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct EndpointProfile {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Full URL of the chat-completion endpoint
    pub base_url: String,
    /// Model identifier sent with each request
    pub model: String,
    /// Obfuscated credential; decode before use
    #[serde(default)]
    pub credential: String,
    /// Whether this profile is a fallback candidate for "current"
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub source: ProfileSource,
}

impl EndpointProfile {
    pub fn is_user_defined(&self) -> bool {
        self.source == ProfileSource::User
    }

    pub fn has_credential(&self) -> bool {
        !self.credential.is_empty()
    }
}

/// Resolves the current profile from an ordered profile list.
///
/// Resolution order: the profile matching `current_id`, else the first profile
/// flagged default, else the first profile. Returns `None` only for an empty
/// list.
pub fn resolve_current<'a>(
    profiles: &'a [EndpointProfile],
    current_id: Option<&str>,
) -> Option<&'a EndpointProfile> {
    current_id
        .and_then(|id| profiles.iter().find(|p| p.id == id))
        .or_else(|| profiles.iter().find(|p| p.is_default))
        .or_else(|| profiles.first())
}
