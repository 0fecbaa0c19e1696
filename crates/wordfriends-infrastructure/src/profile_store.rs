//! TOML-backed configuration store for endpoint profiles.

use crate::credential;
use crate::default_profiles::load_default_profiles;
use crate::dto::{ProfileFileDto, UserProfileDto};
use crate::storage::AtomicTomlFile;
use std::path::PathBuf;
use wordfriends_core::error::{Result, WordError};
use wordfriends_core::profile::{
    EndpointProfile, ProfileRepository, ProfileSource, resolve_current,
};

/// Merges in-memory built-in profiles with user profiles persisted in
/// `profiles.toml`.
///
/// Responsibilities:
/// - Keep built-in profiles in memory only (never persisted)
/// - Persist user profiles and the current selection atomically
/// - Encode plaintext credentials before they reach disk
pub struct ProfileStore {
    builtin: Vec<EndpointProfile>,
    file: AtomicTomlFile<ProfileFileDto>,
}

impl ProfileStore {
    /// Creates a store from already-loaded built-in profiles.
    ///
    /// An empty `builtin` list is replaced with the placeholder profile.
    pub fn new(builtin: Vec<EndpointProfile>, profiles_file: PathBuf) -> Self {
        let builtin = if builtin.is_empty() {
            vec![crate::default_profiles::fallback_profile()]
        } else {
            builtin
                .into_iter()
                .map(|mut p| {
                    p.source = ProfileSource::BuiltIn;
                    p
                })
                .collect()
        };

        Self {
            builtin,
            file: AtomicTomlFile::new(profiles_file),
        }
    }

    /// Loads built-in profiles from `defaults_file` and opens `profiles_file`.
    pub fn open(defaults_file: PathBuf, profiles_file: PathBuf) -> Self {
        Self::new(load_default_profiles(&defaults_file), profiles_file)
    }

    pub fn builtin_profiles(&self) -> &[EndpointProfile] {
        &self.builtin
    }

    /// Creates and persists a user profile with a generated identifier.
    pub fn create_user_profile(
        &self,
        name: &str,
        base_url: &str,
        model: &str,
        plaintext_credential: &str,
    ) -> Result<EndpointProfile> {
        let profile = EndpointProfile {
            id: generate_profile_id(name),
            name: name.to_string(),
            base_url: base_url.to_string(),
            model: model.to_string(),
            credential: String::new(),
            is_default: false,
            source: ProfileSource::User,
        };
        self.upsert_user_profile(profile, Some(plaintext_credential))
    }

    /// Removes all user profiles and the current selection.
    pub fn reset_all(&self) -> Result<()> {
        self.file.remove()?;
        tracing::info!("[Profiles] User profiles reset");
        Ok(())
    }

    fn is_builtin(&self, id: &str) -> bool {
        self.builtin.iter().any(|p| p.id == id)
    }

    fn load_file(&self) -> ProfileFileDto {
        match self.file.load() {
            Ok(file) => file.unwrap_or_default(),
            Err(e) => {
                tracing::error!(
                    "[Profiles] Failed to read {}: {}; ignoring user profiles",
                    self.file.path().display(),
                    e
                );
                ProfileFileDto::default()
            }
        }
    }

    fn fallback_current_id(&self) -> Option<String> {
        self.builtin
            .iter()
            .find(|p| p.is_default)
            .or_else(|| self.builtin.first())
            .map(|p| p.id.clone())
    }
}

impl ProfileRepository for ProfileStore {
    fn list_all(&self) -> Vec<EndpointProfile> {
        let user = self.load_file().profiles.into_iter().map(EndpointProfile::from);
        self.builtin.iter().cloned().chain(user).collect()
    }

    fn get_current(&self) -> Result<EndpointProfile> {
        let current_id = self.load_file().current_profile_id;
        let all = self.list_all();

        resolve_current(&all, current_id.as_deref())
            .cloned()
            .ok_or_else(|| WordError::not_found("profile", current_id.unwrap_or_default()))
    }

    fn set_current(&self, id: &str) -> Result<()> {
        self.file.update(ProfileFileDto::default(), |file| {
            file.current_profile_id = Some(id.to_string());
        })?;
        tracing::info!("[Profiles] Current profile set to {}", id);
        Ok(())
    }

    fn upsert_user_profile(
        &self,
        mut profile: EndpointProfile,
        plaintext_credential: Option<&str>,
    ) -> Result<EndpointProfile> {
        if self.is_builtin(&profile.id) {
            return Err(WordError::read_only("profile", profile.id));
        }

        if let Some(plaintext) = plaintext_credential {
            profile.credential = credential::encode(plaintext);
        }
        profile.is_default = false;
        profile.source = ProfileSource::User;

        let dto = UserProfileDto::from(&profile);
        let replaced = self.file.update(ProfileFileDto::default(), |file| {
            match file.profiles.iter().position(|p| p.id == dto.id) {
                Some(index) => {
                    file.profiles[index] = dto;
                    true
                }
                None => {
                    file.profiles.push(dto);
                    false
                }
            }
        })?;

        tracing::info!(
            "[Profiles] {} user profile {}",
            if replaced { "Updated" } else { "Created" },
            profile.id
        );
        Ok(profile)
    }

    fn delete_user_profile(&self, id: &str) -> Result<()> {
        if self.is_builtin(id) {
            return Err(WordError::read_only("profile", id));
        }

        let snapshot = self.load_file();
        let present = snapshot.profiles.iter().any(|p| p.id == id);
        if !present {
            return Ok(());
        }

        let reassigned = self.fallback_current_id();
        self.file.update(ProfileFileDto::default(), |file| {
            if file.current_profile_id.as_deref() == Some(id) {
                file.current_profile_id = reassigned;
            }
            file.profiles.retain(|p| p.id != id);
        })?;

        tracing::info!("[Profiles] Deleted user profile {}", id);
        Ok(())
    }

    fn decoded_credential(&self, profile: &EndpointProfile) -> String {
        credential::decode(&profile.credential)
    }
}

/// Builds `user_<name>_<base36 millis>`, with whitespace runs in the
/// lowercased name replaced by `_`.
fn generate_profile_id(name: &str) -> String {
    let slug = name
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_");
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    format!("user_{}_{}", slug, to_base36(millis))
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}
