//! Profile repository trait.
//!
//! Defines the interface of the configuration store that the streaming client
//! and the lookup service consume.

use super::model::EndpointProfile;
use crate::error::Result;

/// An abstract store of endpoint profiles.
///
/// Built-in profiles are listed first (declared order), followed by user
/// profiles (storage order). Exactly one profile is "current" at a time;
/// dangling references are resolved lazily on read.
pub trait ProfileRepository: Send + Sync {
    /// Returns built-in profiles followed by user profiles.
    fn list_all(&self) -> Vec<EndpointProfile>;

    /// Returns the current profile.
    ///
    /// # Errors
    ///
    /// Fails only if no profile exists at all.
    fn get_current(&self) -> Result<EndpointProfile>;

    /// Persists the chosen identifier without validating it.
    fn set_current(&self, id: &str) -> Result<()>;

    /// Inserts or replaces a user profile by identifier.
    ///
    /// When `plaintext_credential` is given it is encoded and stored in place
    /// of `profile.credential`; the plaintext is never persisted.
    fn upsert_user_profile(
        &self,
        profile: EndpointProfile,
        plaintext_credential: Option<&str>,
    ) -> Result<EndpointProfile>;

    /// Removes a user profile. Absent identifiers are a no-op.
    fn delete_user_profile(&self, id: &str) -> Result<()>;

    /// Returns the decoded credential of `profile`.
    fn decoded_credential(&self, profile: &EndpointProfile) -> String;
}
