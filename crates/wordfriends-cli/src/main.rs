use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use wordfriends_core::settings::{AnswerFormat, Difficulty, PhoneticType};

mod commands;

use commands::AppContext;

#[derive(Parser)]
#[command(name = "wordfriends")]
#[command(about = "Word'n'Friends - look up a word together with its word friends", long_about = None)]
struct Cli {
    /// Configuration directory (default: $WORDFRIENDS_CONFIG_DIR or the platform config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    /// Built-in profile source file (default: <config-dir>/defaults.ini)
    #[arg(long, global = true)]
    defaults: Option<PathBuf>,

    /// Directory with system_<kind>.md prompt templates (default: <config-dir>/prompts)
    #[arg(long, global = true)]
    prompts: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Look up a word; without a word, ask for a quote and a greeting
    Lookup {
        word: Option<String>,

        /// Print the rendered HTML after the stream ends
        #[arg(long)]
        html: bool,

        /// Cancel the request after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Print the daily quote
    Quote {
        /// Print the quote as JSON
        #[arg(long)]
        json: bool,

        /// Give up on the request after this many seconds
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,
    },

    /// Manage endpoint profiles
    Profiles {
        #[command(subcommand)]
        action: ProfilesAction,
    },

    /// Show or change lookup settings
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum ProfilesAction {
    /// List built-in and user profiles
    List,
    /// Show the current profile
    Current,
    /// Select the current profile
    Use { id: String },
    /// Add a user profile
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        base_url: String,
        #[arg(long)]
        model: String,
        /// API key; stored obfuscated
        #[arg(long, env = "WORDFRIENDS_API_KEY", hide_env_values = true)]
        key: String,
    },
    /// Remove a user profile
    Remove { id: String },
    /// Remove all user profiles and the current selection
    Reset,
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the current settings
    Show,
    /// Change one or more settings
    Set {
        #[arg(long)]
        phonetic: Option<PhoneticType>,
        #[arg(long)]
        friends: Option<u8>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
        #[arg(long)]
        format: Option<AnswerFormat>,
    },
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let ctx = AppContext::new(cli.config_dir, cli.defaults, cli.prompts)?;

    match cli.command {
        Commands::Lookup {
            word,
            html,
            timeout,
        } => commands::lookup::run(&ctx, word.as_deref().unwrap_or(""), html, timeout).await?,
        Commands::Quote { json, timeout } => commands::quote::run(&ctx, json, timeout).await?,
        Commands::Profiles { action } => match action {
            ProfilesAction::List => commands::profiles::list(&ctx)?,
            ProfilesAction::Current => commands::profiles::current(&ctx)?,
            ProfilesAction::Use { id } => commands::profiles::use_profile(&ctx, &id)?,
            ProfilesAction::Add {
                name,
                base_url,
                model,
                key,
            } => commands::profiles::add(&ctx, &name, &base_url, &model, &key)?,
            ProfilesAction::Remove { id } => commands::profiles::remove(&ctx, &id)?,
            ProfilesAction::Reset => commands::profiles::reset(&ctx)?,
        },
        Commands::Settings { action } => match action {
            SettingsAction::Show => commands::settings::show(&ctx)?,
            SettingsAction::Set {
                phonetic,
                friends,
                difficulty,
                format,
            } => commands::settings::set(&ctx, phonetic, friends, difficulty, format)?,
        },
    }

    Ok(())
}
