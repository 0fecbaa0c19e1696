use super::AppContext;
use anyhow::Result;
use wordfriends_core::settings::{
    AnswerFormat, Difficulty, MAX_FRIEND_NUMBER, MIN_FRIEND_NUMBER, PhoneticType,
    SettingsRepository, UserSettings,
};

pub fn show(ctx: &AppContext) -> Result<()> {
    print_settings(&ctx.settings_repository().load());
    Ok(())
}

pub fn set(
    ctx: &AppContext,
    phonetic: Option<PhoneticType>,
    friends: Option<u8>,
    difficulty: Option<Difficulty>,
    format: Option<AnswerFormat>,
) -> Result<()> {
    let repo = ctx.settings_repository();
    let mut settings = repo.load();

    if let Some(phonetic) = phonetic {
        settings.phonetic = phonetic;
    }
    if let Some(friends) = friends {
        if !(MIN_FRIEND_NUMBER..=MAX_FRIEND_NUMBER).contains(&friends) {
            anyhow::bail!(
                "--friends must be between {} and {}",
                MIN_FRIEND_NUMBER,
                MAX_FRIEND_NUMBER
            );
        }
        settings.friend_number = friends;
    }
    if let Some(difficulty) = difficulty {
        settings.difficulty = difficulty;
    }
    if let Some(format) = format {
        settings.format = format;
    }

    repo.save(&settings)?;
    print_settings(&settings);
    Ok(())
}

fn print_settings(settings: &UserSettings) {
    println!("phonetic:   {}", settings.phonetic.as_str());
    println!("friends:    {}", settings.friend_number);
    println!(
        "difficulty: {} ({})",
        settings.difficulty,
        settings.difficulty.range_description()
    );
    println!(
        "format:     {}",
        match settings.format {
            AnswerFormat::Table => "table",
            AnswerFormat::Sentence => "sentence",
        }
    );
}
