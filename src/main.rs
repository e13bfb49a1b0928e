use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::commands;

/// The main CLI command line interface.
#[derive(Parser)]
#[command(name = "dada")]
#[command(version)]
#[command(about = "Outfit advice from your own catalog, with an LLM to chat it through")]
#[command(long_about = "Dada answers outfit questions by finding matching outfits in a\n\
    local catalog and asking an LLM (Gemini, Groq or DeepSeek) to turn them\n\
    into a friendly recommendation. Conversations are remembered per session.\n\n\
    Without any provider key the catalog is listed directly.")]
#[command(after_help = "EXAMPLES:\n    \
    dada catalog import seed.json   Load the outfit catalog\n    \
    dada chat \"date night outfit?\"  Ask for a recommendation\n    \
    dada chat                       Start an interactive chat\n    \
    dada history                    Show the default session\n    \
    dada clear default              Forget the default session\n    \
    dada status                     Show providers and catalog size\n\n\
    For more information about a command, run 'dada <command> --help'.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Ask for an outfit recommendation
    #[command(long_about = "Extracts occasion keywords from the message, retrieves matching\n\
        outfits from the catalog and asks the configured AI providers for a\n\
        reply. In auto mode providers are tried in order until one answers.\n\
        With no message, starts an interactive chat.")]
    Chat(commands::chat::Args),

    /// Clear a conversation session
    Clear(commands::clear::Args),

    /// Show the conversation stored for a session
    History(commands::history::Args),

    /// List conversation sessions
    Sessions(commands::sessions::Args),

    /// List catalog items
    Items(commands::items::Args),

    /// Show the occasion tags found in a piece of text
    Keywords(commands::keywords::Args),

    /// Import or inspect the outfit catalog
    Catalog(commands::catalog::Args),

    /// Show catalog, conversation store and AI provider status
    Status(commands::status::Args),

    /// View and manage configuration settings
    #[command(long_about = "Provides subcommands to show, get, and set configuration values.\n\
        Configuration is stored in ~/.dada/config.yaml. Environment variables\n\
        (LLM_API_KEY, GROQ_API_KEY, DEEPSEEK_API_KEY, DADA_DB_PATH, ...)\n\
        take precedence over the file.")]
    Config(commands::config::Args),

    /// Generate shell completion scripts
    Completions(commands::completions::Args),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "dada=debug,dada_cli=debug"
    } else {
        "dada=info,dada_cli=info"
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Chat(args) => commands::chat::run(args),
        Commands::Clear(args) => commands::clear::run(args),
        Commands::History(args) => commands::history::run(args),
        Commands::Sessions(args) => commands::sessions::run(args),
        Commands::Items(args) => commands::items::run(args),
        Commands::Keywords(args) => commands::keywords::run(args),
        Commands::Catalog(args) => commands::catalog::run(args),
        Commands::Status(args) => commands::status::run(args),
        Commands::Config(args) => commands::config::run(args),
        Commands::Completions(args) => {
            commands::completions::generate_completions(&mut Cli::command(), args.shell);
            Ok(())
        }
    }
}
