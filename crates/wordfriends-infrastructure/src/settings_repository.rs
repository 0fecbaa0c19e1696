//! TOML-backed settings repository.

use crate::storage::AtomicTomlFile;
use std::path::PathBuf;
use wordfriends_core::error::Result;
use wordfriends_core::settings::{SettingsRepository, UserSettings};

pub struct TomlSettingsRepository {
    file: AtomicTomlFile<UserSettings>,
}

impl TomlSettingsRepository {
    pub fn with_path(path: PathBuf) -> Self {
        Self {
            file: AtomicTomlFile::new(path),
        }
    }
}

impl SettingsRepository for TomlSettingsRepository {
    fn load(&self) -> UserSettings {
        match self.file.load() {
            Ok(Some(settings)) => settings.normalized(),
            Ok(None) => UserSettings::default(),
            Err(e) => {
                tracing::warn!(
                    "[Settings] Failed to read {}: {}; using defaults",
                    self.file.path().display(),
                    e
                );
                UserSettings::default()
            }
        }
    }

    fn save(&self, settings: &UserSettings) -> Result<()> {
        self.file.save(&settings.clone().normalized())?;
        Ok(())
    }
}
