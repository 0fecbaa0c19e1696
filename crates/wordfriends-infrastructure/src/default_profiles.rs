//! Built-in profile source.
//!
//! Built-in profiles are read once at startup from an INI-like file and kept
//! in memory only. The format:
//!
//! ```text
//! ; comment
//! [siliconflow]
//! name = SiliconFlow / DeepSeek
//! baseUrl = https://api.siliconflow.cn/v1/chat/completions
//! model = deepseek-ai/DeepSeek-V3
//! magic = <base64 credential>
//! isDefault = true
//! ```

use std::fs;
use std::path::Path;
use wordfriends_core::profile::{EndpointProfile, ProfileSource};

pub const FALLBACK_PROFILE_ID: &str = "demo_config";

/// The placeholder used whenever the default source is unusable.
pub fn fallback_profile() -> EndpointProfile {
    EndpointProfile {
        id: FALLBACK_PROFILE_ID.to_string(),
        name: "Example profile (set an API key)".to_string(),
        base_url: "https://api.example.com/v1/chat/completions".to_string(),
        model: "example-model".to_string(),
        credential: String::new(),
        is_default: true,
        source: ProfileSource::BuiltIn,
    }
}

/// Parses the default-profile source text.
///
/// Unknown keys and key/value lines outside a section are ignored.
pub fn parse_default_profiles(text: &str) -> Vec<EndpointProfile> {
    let mut profiles = Vec::new();
    let mut current: Option<EndpointProfile> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();

        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') && line.len() >= 2 {
            if let Some(done) = current.take() {
                profiles.push(done);
            }
            let id = line[1..line.len() - 1].trim().to_string();
            current = Some(EndpointProfile {
                name: id.clone(),
                id,
                base_url: String::new(),
                model: String::new(),
                credential: String::new(),
                is_default: false,
                source: ProfileSource::BuiltIn,
            });
            continue;
        }

        let (Some(profile), Some((key, value))) = (current.as_mut(), line.split_once('=')) else {
            continue;
        };
        let value = value.trim();

        match key.trim().to_ascii_lowercase().as_str() {
            "name" => profile.name = value.to_string(),
            "baseurl" => profile.base_url = value.to_string(),
            "model" | "modelname" => profile.model = value.to_string(),
            "magic" => profile.credential = value.to_string(),
            "isdefault" => profile.is_default = value.eq_ignore_ascii_case("true") || value == "1",
            _ => {}
        }
    }

    if let Some(done) = current {
        profiles.push(done);
    }

    profiles
}

/// Loads built-in profiles from `path`, falling back to the placeholder.
///
/// The fallback is never written anywhere.
pub fn load_default_profiles(path: &Path) -> Vec<EndpointProfile> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(
                "[Profiles] Default profile source {} unavailable: {}; using placeholder",
                path.display(),
                e
            );
            return vec![fallback_profile()];
        }
    };

    let profiles = parse_default_profiles(&text);
    if profiles.is_empty() {
        tracing::warn!(
            "[Profiles] Default profile source {} yielded no profiles; using placeholder",
            path.display()
        );
        return vec![fallback_profile()];
    }

    tracing::info!("[Profiles] Loaded {} built-in profiles", profiles.len());
    profiles
}
