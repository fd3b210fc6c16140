//! Subcommand implementations: logger init, input reading, and output.

use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tutor_markdown::core::config::{self, Config, ConfigError};
use tutor_markdown::core::display::{self, DisplayMessage};
use tutor_markdown::core::message::{Conversation, Message, MessageSource};
use tutor_markdown::core::render::{self, RendererHandle, ValidatingRenderer};
use tutor_markdown::core::{app, export, paths};

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to read stdin: {0}")]
    Stdin(#[source] io::Error),
    #[error("Invalid conversation file {}: {source}", .path.display())]
    Conversation {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Initialize env_logger on stderr. `RUST_LOG` takes precedence over -v/-q.
pub fn init_logger(level: &str) {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .try_init();
}

/// Read a whole input: a file path, or stdin for `-` / no path.
fn read_input(input: Option<&Path>) -> Result<String, CliError> {
    match input {
        Some(path) if path != Path::new("-") => {
            std::fs::read_to_string(path).map_err(|source| CliError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(CliError::Stdin)?;
            Ok(buf)
        }
    }
}

/// Renderer handle backed by the built-in validating renderer.
fn renderer() -> RendererHandle {
    let (installer, handle) = render::channel();
    installer.install(Arc::new(ValidatingRenderer));
    handle
}

fn print_display(shown: &DisplayMessage, width: usize) {
    if let Some(warning) = &shown.warning {
        eprintln!("{}", warning);
    }
    for line in display::wrap_message(&shown.body, width) {
        println!("{}", line);
    }
}

/// Run the `normalize` command.
pub fn run_normalize(input: Option<&Path>, user: bool) -> Result<(), CliError> {
    let text = read_input(input)?;
    print!("{}", display::prepare_text(&text, !user));
    Ok(())
}

/// Run the `export` command.
pub fn run_export(input: Option<&Path>, config: &Config) -> Result<(), CliError> {
    let html = read_input(input)?;
    println!("{}", export::html_to_markdown(&html, &config.export));
    Ok(())
}

/// Run the `render` command: prepare, validate, and wrap a single message.
pub async fn run_render(
    input: Option<&Path>,
    user: bool,
    width: Option<usize>,
    config: &Config,
) -> Result<(), CliError> {
    let text = read_input(input)?;
    let message = if user {
        Message::user(text)
    } else {
        Message::bot(text, MessageSource::Backend)
    };
    let shown = display::present_when_ready(&message, &mut renderer()).await;
    print_display(&shown, width.unwrap_or(config.width));
    Ok(())
}

/// Run the `transcript` command: print each message of a saved conversation.
pub async fn run_transcript(file: &Path, config: &Config) -> Result<(), CliError> {
    let content = std::fs::read_to_string(file).map_err(|source| CliError::Read {
        path: file.to_path_buf(),
        source,
    })?;
    let conversation: Conversation =
        serde_json::from_str(&content).map_err(|source| CliError::Conversation {
            path: file.to_path_buf(),
            source,
        })?;
    log::info!(
        "Transcript {} with {} message(s)",
        conversation.id(),
        conversation.messages().len()
    );

    let mut handle = renderer();
    println!("# {}", conversation.title());
    for message in conversation.messages() {
        let shown = display::present_when_ready(message, &mut handle).await;
        println!();
        println!("{}", shown.label);
        print_display(&shown, config.width);
    }
    Ok(())
}

/// Run the `config` command: config file location and effective settings.
pub fn run_config() -> Result<(), CliError> {
    let config = config::load()?;
    let file = paths::config_file()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "(none)".to_string());
    println!("{} {}", app::NAME, app::VERSION);
    println!("Config file:   {}", file);
    println!("Bullet marker: {}", config.export.bullet_marker);
    println!("Respace:       {}", config.export.respace);
    println!("Width:         {}", config.width);
    Ok(())
}

