//! Completions command - shell completion scripts for `dada`.
//!
//! Completes subcommands (chat, clear, history, sessions, items, keywords,
//! catalog, status, config) and their flags, including the `--format`
//! values.

use clap::Command;
use clap_complete::{generate, Shell};
use std::io::{self, Write};

/// Arguments for the completions command.
#[derive(clap::Args)]
#[command(after_help = "EXAMPLES:\n    \
    dada completions bash > ~/.local/share/bash-completion/completions/dada\n    \
    dada completions zsh > ~/.zfunc/_dada\n    \
    dada completions fish > ~/.config/fish/completions/dada.fish\n\n\
After installing, 'dada ch<TAB>' expands to 'dada chat' and\n\
'dada chat --format <TAB>' offers text and json.")]
pub struct Args {
    /// Shell to generate completions for
    #[arg(value_name = "SHELL")]
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Writes the completion script for `cmd` to `out`.
pub fn write_completions(cmd: &mut Command, shell: Shell, out: &mut dyn Write) {
    generate(shell, cmd, "dada", out);
}

/// Writes completions for `cmd` to stdout.
///
/// Called from main.rs, which owns the top-level `Cli` definition.
pub fn generate_completions(cmd: &mut Command, shell: Shell) {
    write_completions(cmd, shell, &mut io::stdout());
}
