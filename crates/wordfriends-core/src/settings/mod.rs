//! User settings and their repository seam.

pub mod model;

pub use model::{
    AnswerFormat, DEFAULT_FRIEND_NUMBER, Difficulty, MAX_FRIEND_NUMBER, MIN_FRIEND_NUMBER,
    PhoneticType, UserSettings,
};

use crate::error::Result;

/// Repository for persisting lookup preferences.
pub trait SettingsRepository: Send + Sync {
    /// Loads settings, falling back to defaults when nothing usable is stored.
    fn load(&self) -> UserSettings;

    fn save(&self, settings: &UserSettings) -> Result<()>;
}
