//! User settings domain model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which phonetic notation the answer should use.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum PhoneticType {
    #[default]
    Uk,
    Us,
}

impl PhoneticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhoneticType::Uk => "uk",
            PhoneticType::Us => "us",
        }
    }
}

impl FromStr for PhoneticType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uk" => Ok(PhoneticType::Uk),
            "us" => Ok(PhoneticType::Us),
            other => Err(format!("Unknown phonetic type: {}", other)),
        }
    }
}

/// Vocabulary difficulty band used to pick related words.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Difficulty {
    B,
    #[default]
    A,
    S,
    SS,
    SSS,
}

impl Difficulty {
    /// Human-readable range description substituted into prompts.
    pub fn range_description(&self) -> &'static str {
        match self {
            Difficulty::B => {
                "Middle to high school level, everyday life and simple study topics. \
                 Example words: apple, book, run, happy, school."
            }
            Difficulty::A => {
                "College entrance exam level, everyday and basic academic vocabulary. \
                 Example words: analyze, debate, environment, manage, strategy."
            }
            Difficulty::S => {
                "Entrance exam to CET-4 level, broader everyday and basic academic topics. \
                 Example words: philosophy, economy, innovate, perspective, diverse."
            }
            Difficulty::SS => {
                "Entrance exam to CET-6 level, more academic and professional vocabulary, \
                 enough for news, literature and intermediate academic material. \
                 Example words: metaphor, hypothesis, bureaucracy, paradox, renaissance."
            }
            Difficulty::SSS => {
                "CET-4 to TOEFL level, common academic and written vocabulary for reading \
                 scientific literature. Example words: paradigm, synthesis, epistemology, \
                 ontology, heuristic."
            }
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Difficulty::B => "B",
            Difficulty::A => "A",
            Difficulty::S => "S",
            Difficulty::SS => "SS",
            Difficulty::SSS => "SSS",
        };
        f.write_str(label)
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "B" => Ok(Difficulty::B),
            "A" => Ok(Difficulty::A),
            "S" => Ok(Difficulty::S),
            "SS" => Ok(Difficulty::SS),
            "SSS" => Ok(Difficulty::SSS),
            other => Err(format!("Unknown difficulty: {}", other)),
        }
    }
}

/// Answer layout requested from the model.
#[derive(Deserialize, Serialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum AnswerFormat {
    /// Compact table of related words
    #[default]
    Table,
    /// Long form with example sentences
    Sentence,
}

impl FromStr for AnswerFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "table" => Ok(AnswerFormat::Table),
            "sentence" => Ok(AnswerFormat::Sentence),
            other => Err(format!("Unknown answer format: {}", other)),
        }
    }
}

pub const MIN_FRIEND_NUMBER: u8 = 1;
pub const MAX_FRIEND_NUMBER: u8 = 10;
pub const DEFAULT_FRIEND_NUMBER: u8 = 5;

fn default_friend_number() -> u8 {
    DEFAULT_FRIEND_NUMBER
}

/// Lookup preferences that shape the system prompt.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct UserSettings {
    #[serde(default)]
    pub phonetic: PhoneticType,
    /// Number of related words ("friends") to ask for
    #[serde(default = "default_friend_number")]
    pub friend_number: u8,
    #[serde(default)]
    pub difficulty: Difficulty,
    #[serde(default)]
    pub format: AnswerFormat,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            phonetic: PhoneticType::default(),
            friend_number: DEFAULT_FRIEND_NUMBER,
            difficulty: Difficulty::default(),
            format: AnswerFormat::default(),
        }
    }
}

impl UserSettings {
    /// Returns a copy with out-of-range values pulled back into range.
    pub fn normalized(mut self) -> Self {
        self.friend_number = self
            .friend_number
            .clamp(MIN_FRIEND_NUMBER, MAX_FRIEND_NUMBER);
        self
    }
}
