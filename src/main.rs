//! # tutor-markdown CLI
//!
//! Pipes message text through the Markdown/LaTeX pipeline:
//! - `normalize`: re-space bot replies for a Markdown+math renderer
//! - `export`: convert rendered HTML back to Markdown with math intact
//! - `render` / `transcript`: prepare messages for display, warning on bad input

mod cli;
mod run;

use clap::{CommandFactory, Parser};
use dotenv::dotenv;

use cli::{Args, Commands};
use run::CliError;
use tutor_markdown::core::{app, config};

async fn dispatch(args: Args) -> Result<(), CliError> {
    match args.command {
        Commands::Normalize { input, user } => run::run_normalize(input.as_deref(), user),
        Commands::Export { input } => {
            let config = config::load()?;
            run::run_export(input.as_deref(), &config)
        }
        Commands::Render { input, user, width } => {
            let config = config::load()?;
            run::run_render(input.as_deref(), user, width, &config).await
        }
        Commands::Transcript { file } => {
            let config = config::load()?;
            run::run_transcript(&file, &config).await
        }
        Commands::Config => run::run_config(),
        Commands::Completions { shell } => {
            let mut cmd = Args::command();
            cli::generate(shell, &mut cmd, app::NAME, &mut std::io::stdout());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    // Load environment variables from .env file
    dotenv().ok();

    let args = Args::parse();
    run::init_logger(args.log_level());

    // Print user-friendly message; exit uses Display not Debug
    if let Err(e) = dispatch(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
