//! Keywords command - show which occasion tags a message maps to.

use anyhow::Result;
use colored::Colorize;

use dada_cli::retrieval::{extract_keywords, OCCASION_SYNONYMS};

use crate::cli::{print_json, OutputFormat};

/// Arguments for the keywords command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    dada keywords \"週末去逛街\"       Prints 休閒\n    \
    dada keywords --table            Show the synonym table")]
pub struct Args {
    /// Text to scan
    #[arg(value_name = "TEXT", required_unless_present = "table")]
    pub text: Option<String>,

    /// Print the tag and synonym table instead
    #[arg(long)]
    pub table: bool,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the keywords command.
pub fn run(args: Args) -> Result<()> {
    if args.table {
        match args.format {
            OutputFormat::Json => {
                let table: std::collections::BTreeMap<&str, &[&str]> =
                    OCCASION_SYNONYMS.iter().copied().collect();
                print_json(&table)?;
            }
            OutputFormat::Text => {
                for (tag, synonyms) in OCCASION_SYNONYMS {
                    println!("{}  {}", tag.bold(), synonyms.join(", ").dimmed());
                }
            }
        }
        return Ok(());
    }

    let text = args.text.unwrap_or_default();
    let tags: Vec<&str> = extract_keywords(&text).into_iter().collect();

    match args.format {
        OutputFormat::Json => print_json(&tags)?,
        OutputFormat::Text => {
            if tags.is_empty() {
                println!("{}", "No occasion keywords found.".dimmed());
            } else {
                for tag in tags {
                    println!("{tag}");
                }
            }
        }
    }
    Ok(())
}
