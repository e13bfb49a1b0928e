//! Config command - manage configuration

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;

use dada_cli::config::{mask_secret, Config, CONFIG_KEYS};

#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    dada config                              Show the effective configuration\n    \
    dada config get groq_model               Print one value\n    \
    dada config set groq_api_key gsk_...     Store a key in ~/.dada/config.yaml\n    \
    dada config set gemini_model \"\"          Unset a value")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<ConfigCommand>,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,
    /// Get a configuration value
    Get { key: String },
    /// Set a configuration value
    Set { key: String, value: String },
}

pub fn run(args: Args) -> Result<()> {
    match args.command {
        Some(ConfigCommand::Show) | None => show_config(),
        Some(ConfigCommand::Get { key }) => get_config(&key),
        Some(ConfigCommand::Set { key, value }) => set_config(&key, &value),
    }
}

fn is_secret(key: &str) -> bool {
    key.ends_with("_api_key")
}

fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("{}", "Dada Configuration".bold());
    println!();
    println!("  {}  {}", "File:".dimmed(), Config::config_path()?.display());
    println!();

    for key in CONFIG_KEYS {
        let display = match config.get(key)? {
            Some(value) if is_secret(key) => mask_secret(&value),
            Some(value) => value,
            None => "(unset)".dimmed().to_string(),
        };
        println!("  {:<22}  {}", key, display);
    }

    println!();
    println!(
        "  {:<22}  {}",
        "effective database",
        config.database_path()?.display()
    );
    println!(
        "  {:<22}  {}",
        "effective conversations",
        config.conversations_path()?.display()
    );

    Ok(())
}

fn get_config(key: &str) -> Result<()> {
    let config = Config::load()?;
    match config.get(key)? {
        Some(value) => println!("{value}"),
        None => println!("{}", format!("Config key '{key}' is not set").yellow()),
    }
    Ok(())
}

fn set_config(key: &str, value: &str) -> Result<()> {
    // Edit the file as written, without environment overrides baked in
    let path = Config::config_path()?;
    let mut config = Config::load_from(&path)?;
    config.set(key, value)?;
    config.save_to(&path)?;

    let shown = if is_secret(key) && !value.is_empty() {
        mask_secret(value)
    } else {
        value.to_string()
    };
    println!("{}", format!("Set {key} = {shown}").green());
    Ok(())
}
