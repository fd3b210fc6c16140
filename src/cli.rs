//! CLI definitions: argument parsing, subcommands, and help text.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;

pub use clap_complete::generate;

const AFTER_HELP: &str = "\
EXAMPLES:
  tutor-markdown normalize reply.md        Re-space a bot reply for rendering
  tutor-markdown normalize --user -        Pass user text through unchanged
  tutor-markdown export page.html          Convert rendered HTML back to Markdown
  tutor-markdown render reply.md -w 72     Prepare, validate and wrap for the terminal
  tutor-markdown transcript chat.json      Print a saved conversation
  tutor-markdown config                    Show config file and effective settings
  tutor-markdown completions bash          Generate bash completions
";

/// Command-line arguments for the application.
#[derive(Parser)]
#[command(
    author,
    version,
    about = "Markdown/LaTeX reconciliation for math-tutoring chat messages",
    after_help = AFTER_HELP
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (use multiple times for debug)
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce log output (errors only)
    #[arg(short = 'q', long = "quiet", global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Insert blank lines around lists and LaTeX blocks in message text
    Normalize {
        /// Input file ('-' or omitted reads stdin)
        input: Option<PathBuf>,
        /// Treat the text as user-authored (left unchanged)
        #[arg(long)]
        user: bool,
    },
    /// Convert an HTML fragment to Markdown, preserving math, code and tables
    Export {
        /// Input file ('-' or omitted reads stdin)
        input: Option<PathBuf>,
    },
    /// Prepare message text for display and check it renders
    Render {
        /// Input file ('-' or omitted reads stdin)
        input: Option<PathBuf>,
        /// Treat the text as user-authored (not re-spaced)
        #[arg(long)]
        user: bool,
        /// Wrap width in columns (0 disables wrapping)
        #[arg(short = 'w', long)]
        width: Option<usize>,
    },
    /// Print a conversation JSON file with every message prepared for display
    Transcript {
        /// Conversation JSON file
        file: PathBuf,
    },
    /// Show config file location and effective settings
    Config,
    /// Generate shell completion script
    Completions {
        /// Shell to generate completions for (bash, zsh, fish, powershell, elvish)
        #[arg(value_parser = clap::value_parser!(Shell))]
        shell: Shell,
    },
}

impl Args {
    /// Log level based on -v/-q flags: error, warn, info, or debug.
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else if self.verbose >= 2 {
            "debug"
        } else if self.verbose >= 1 {
            "info"
        } else {
            "warn"
        }
    }
}
