//! System prompt selection and rendering.

use minijinja::{Environment, context};
use std::path::{Path, PathBuf};
use thiserror::Error;
use wordfriends_core::settings::{AnswerFormat, UserSettings};

const BUNDLED_EMPTY: &str = include_str!("../prompts/system_empty.md");
const BUNDLED_TABLE: &str = include_str!("../prompts/system_table.md");
const BUNDLED_SENTENCE: &str = include_str!("../prompts/system_sentence.md");

const FALLBACK_EMPTY: &str = "You are a friendly English assistant. Share one famous English \
quote with its translation and greet the user warmly.";
const FALLBACK_WORD: &str = "Translate the word the user gives you (English to Chinese or \
Chinese to English). Never output more than 30 characters. Begin the reply with \
\"Service degraded\" on its own line.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Empty,
    Table,
    Sentence,
}

impl PromptKind {
    /// Empty input gets the greeting prompt; otherwise the answer format decides.
    pub fn select(input_is_empty: bool, format: AnswerFormat) -> Self {
        if input_is_empty {
            return PromptKind::Empty;
        }
        match format {
            AnswerFormat::Table => PromptKind::Table,
            AnswerFormat::Sentence => PromptKind::Sentence,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PromptKind::Empty => "empty",
            PromptKind::Table => "table",
            PromptKind::Sentence => "sentence",
        }
    }

    pub fn file_name(&self) -> String {
        format!("system_{}.md", self.as_str())
    }

    fn bundled(&self) -> &'static str {
        match self {
            PromptKind::Empty => BUNDLED_EMPTY,
            PromptKind::Table => BUNDLED_TABLE,
            PromptKind::Sentence => BUNDLED_SENTENCE,
        }
    }

    pub fn fallback(&self) -> &'static str {
        match self {
            PromptKind::Empty => FALLBACK_EMPTY,
            PromptKind::Table | PromptKind::Sentence => FALLBACK_WORD,
        }
    }
}

#[derive(Error, Debug)]
enum PromptError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to render template: {0}")]
    Render(#[from] minijinja::Error),
}

/// Loads `system_<kind>.md` templates from an optional override directory,
/// falling back to the bundled templates.
pub struct PromptLibrary {
    dir: Option<PathBuf>,
    env: Environment<'static>,
}

impl Default for PromptLibrary {
    fn default() -> Self {
        Self::bundled()
    }
}

impl PromptLibrary {
    /// Uses templates from `dir` when present there.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            env: Self::environment(),
        }
    }

    /// Uses the bundled templates only.
    pub fn bundled() -> Self {
        Self {
            dir: None,
            env: Self::environment(),
        }
    }

    fn environment() -> Environment<'static> {
        let mut env = Environment::new();
        env.set_keep_trailing_newline(true);
        env
    }

    pub fn dir(&self) -> Option<&Path> {
        self.dir.as_deref()
    }

    /// Builds the system prompt for `kind`. Never fails: unreadable or
    /// unrenderable templates yield the fallback prompt.
    pub fn system_prompt(&self, kind: PromptKind, settings: &UserSettings) -> String {
        match self.try_system_prompt(kind, settings) {
            Ok(prompt) => prompt,
            Err(e) => {
                tracing::error!(
                    "[Prompt] Failed to load '{}' prompt: {}; using fallback",
                    kind.as_str(),
                    e
                );
                kind.fallback().to_string()
            }
        }
    }

    fn try_system_prompt(
        &self,
        kind: PromptKind,
        settings: &UserSettings,
    ) -> Result<String, PromptError> {
        let template = self.load_template(kind)?;

        // The greeting prompt has no placeholders.
        if kind == PromptKind::Empty {
            return Ok(template);
        }

        let rendered = self.env.render_str(
            &template,
            context! {
                phonetic_type => settings.phonetic.as_str(),
                friend_number => settings.friend_number,
                difficulty_range => settings.difficulty.range_description(),
            },
        )?;
        Ok(rendered)
    }

    fn load_template(&self, kind: PromptKind) -> Result<String, PromptError> {
        let Some(dir) = &self.dir else {
            return Ok(kind.bundled().to_string());
        };

        let path = dir.join(kind.file_name());
        match std::fs::read_to_string(&path) {
            Ok(text) => {
                tracing::debug!("[Prompt] Using {}", path.display());
                Ok(text)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Ok(kind.bundled().to_string())
            }
            Err(source) => Err(PromptError::Io { path, source }),
        }
    }
}
