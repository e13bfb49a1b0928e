//! Chat command - ask the outfit advisor.
//!
//! Sends one message, or starts an interactive loop when no message is
//! given. Without any provider key the replies come straight from the
//! catalog.

use anyhow::Result;
use colored::Colorize;
use std::io::{self, BufRead, Write};

use dada_cli::config::Config;
use dada_cli::recommend::{
    Recommendation, RecommendRequest, Recommender, DEFAULT_SESSION_ID,
};
use dada_cli::retrieval::Retriever;

use crate::cli::{print_json, OutputFormat};

/// Arguments for the chat command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    dada chat \"I have a date tonight\"          One-off question\n    \
    dada chat                                   Interactive chat\n    \
    dada chat -s work \"office look?\"           Use the 'work' session\n    \
    dada chat -m groq \"weekend outfit?\"        Only ask Groq\n    \
    dada chat --format json \"gym clothes?\"     Full result as JSON")]
pub struct Args {
    /// Message to send; omit for an interactive session
    #[arg(value_name = "MESSAGE")]
    pub message: Option<String>,

    /// Conversation session id
    #[arg(short, long, default_value = DEFAULT_SESSION_ID, value_name = "ID")]
    pub session: String,

    /// Model to use: auto, gemini, groq or deepseek
    #[arg(short, long, default_value = "auto", value_name = "MODEL")]
    #[arg(
        long_help = "Which provider answers. 'auto' tries Gemini, Groq and DeepSeek\n\
        in that order until one replies. Naming a provider uses only that\n\
        provider, with no fallback when it fails."
    )]
    pub model: String,

    /// Output format: text (default), json
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

/// Executes the chat command.
pub fn run(args: Args) -> Result<()> {
    let config = Config::load()?;
    let recommender = Recommender::from_config(&config)?;

    if !recommender.ai_enabled() && args.format == OutputFormat::Text {
        println!(
            "{}",
            "No AI provider key configured; answering from the catalog only.".yellow()
        );
        println!();
    }

    match args.message {
        Some(message) => ask(&recommender, &args.session, &args.model, &message, args.format),
        None => interactive(&recommender, &args.session, &args.model, args.format),
    }
}

fn ask<R: Retriever>(
    recommender: &Recommender<R>,
    session: &str,
    model: &str,
    message: &str,
    format: OutputFormat,
) -> Result<()> {
    let request = RecommendRequest::new(message)
        .with_session(session)
        .with_model(model);
    let result = recommender.recommend(&request)?;

    match format {
        OutputFormat::Json => print_json(&result)?,
        OutputFormat::Text => print_recommendation(&result),
    }
    Ok(())
}

fn interactive<R: Retriever>(
    recommender: &Recommender<R>,
    session: &str,
    model: &str,
    format: OutputFormat,
) -> Result<()> {
    println!(
        "{} {}",
        "Chatting in session".dimmed(),
        session.cyan()
    );
    println!("{}", "Type 'exit' or press Ctrl-D to quit.".dimmed());

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("{} ", ">".bold());
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line?;
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if matches!(message, "exit" | "quit") {
            break;
        }

        if let Err(e) = ask(recommender, session, model, message, format) {
            eprintln!("{} {:#}", "Error:".red(), e);
        }
        println!();
    }
    Ok(())
}

fn print_recommendation(result: &Recommendation) {
    println!("{}", result.response.trim_end());

    let mut details = Vec::new();
    if let Some(provider) = &result.provider {
        details.push(format!("via {provider}"));
    }
    if !result.keywords.is_empty() {
        details.push(format!("keywords: {}", result.keywords.join(", ")));
    }
    if result.filter_dropped {
        details.push("no outfit matched the keywords, showing the general catalog".to_string());
    }
    if !details.is_empty() {
        println!();
        println!("{}", format!("[{}]", details.join(" | ")).dimmed());
    }
}
