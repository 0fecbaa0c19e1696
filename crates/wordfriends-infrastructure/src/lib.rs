pub mod credential;
pub mod default_profiles;
pub mod dto;
pub mod paths;
pub mod profile_store;
pub mod settings_repository;
pub mod storage;

pub use crate::paths::WordPaths;
pub use crate::profile_store::ProfileStore;
pub use crate::settings_repository::TomlSettingsRepository;
