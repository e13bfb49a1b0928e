//! Clear command - forget a conversation session.

use anyhow::Result;
use colored::Colorize;

use dada_cli::config::Config;
use dada_cli::recommend::Recommender;

/// Arguments for the clear command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    dada clear default      Clear the default session\n    \
    dada clear work         Clear the 'work' session")]
pub struct Args {
    /// Session id to clear
    #[arg(value_name = "ID")]
    pub session: Option<String>,
}

/// Executes the clear command.
pub fn run(args: Args) -> Result<()> {
    let config = Config::load()?;
    let recommender = Recommender::from_config(&config)?;

    let outcome = recommender.clear_session(args.session.as_deref())?;
    if outcome.success {
        println!("{}", outcome.message.green());
    } else {
        println!("{}", outcome.message.yellow());
    }
    Ok(())
}
