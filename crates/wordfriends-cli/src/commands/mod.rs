pub mod lookup;
pub mod profiles;
pub mod quote;
pub mod settings;

use anyhow::{Context, Result};
use std::path::PathBuf;
use wordfriends_infrastructure::{ProfileStore, TomlSettingsRepository, WordPaths};
use wordfriends_interaction::PromptLibrary;

/// Resolved file locations shared by every command.
pub struct AppContext {
    paths: WordPaths,
    defaults_file: PathBuf,
    prompts_dir: PathBuf,
}

impl AppContext {
    pub fn new(
        config_dir: Option<PathBuf>,
        defaults: Option<PathBuf>,
        prompts: Option<PathBuf>,
    ) -> Result<Self> {
        let paths = WordPaths::new(config_dir.as_deref())
            .context("Failed to resolve the configuration directory")?;
        tracing::debug!("[Config] Using {}", paths.root().display());

        Ok(Self {
            defaults_file: defaults.unwrap_or_else(|| paths.defaults_file()),
            prompts_dir: prompts.unwrap_or_else(|| paths.prompts_dir()),
            paths,
        })
    }

    pub fn profile_store(&self) -> ProfileStore {
        ProfileStore::open(self.defaults_file.clone(), self.paths.profiles_file())
    }

    pub fn settings_repository(&self) -> TomlSettingsRepository {
        TomlSettingsRepository::with_path(self.paths.settings_file())
    }

    pub fn prompt_library(&self) -> PromptLibrary {
        PromptLibrary::new(self.prompts_dir.clone())
    }
}
