//! On-disk representations of persisted configuration.

use serde::{Deserialize, Serialize};
use wordfriends_core::profile::{EndpointProfile, ProfileSource};

/// Root of `profiles.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileFileDto {
    /// Identifier of the selected profile; may dangle.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_profile_id: Option<String>,
    #[serde(rename = "profile", default)]
    pub profiles: Vec<UserProfileDto>,
}

/// A persisted user profile. The credential is always stored encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfileDto {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub model: String,
    #[serde(default)]
    pub credential: String,
}

impl From<UserProfileDto> for EndpointProfile {
    fn from(dto: UserProfileDto) -> Self {
        EndpointProfile {
            id: dto.id,
            name: dto.name,
            base_url: dto.base_url,
            model: dto.model,
            credential: dto.credential,
            is_default: false,
            source: ProfileSource::User,
        }
    }
}

impl From<&EndpointProfile> for UserProfileDto {
    fn from(profile: &EndpointProfile) -> Self {
        UserProfileDto {
            id: profile.id.clone(),
            name: profile.name.clone(),
            base_url: profile.base_url.clone(),
            model: profile.model.clone(),
            credential: profile.credential.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_file_toml_shape() {
        let file = ProfileFileDto {
            current_profile_id: Some("user_a".to_string()),
            profiles: vec![UserProfileDto {
                id: "user_a".to_string(),
                name: "A".to_string(),
                base_url: "https://a.example.com".to_string(),
                model: "m".to_string(),
                credential: "YQ==".to_string(),
            }],
        };

        let text = toml::to_string_pretty(&file).unwrap();
        assert!(text.contains("current_profile_id = \"user_a\""));
        assert!(text.contains("[[profile]]"));

        let back: ProfileFileDto = toml::from_str(&text).unwrap();
        assert_eq!(back.profiles, file.profiles);
    }

    #[test]
    fn test_dto_becomes_user_profile() {
        let profile: EndpointProfile = UserProfileDto {
            id: "x".to_string(),
            name: "X".to_string(),
            base_url: "u".to_string(),
            model: "m".to_string(),
            credential: String::new(),
        }
        .into();
        assert!(profile.is_user_defined());
        assert!(!profile.is_default);
    }
}
