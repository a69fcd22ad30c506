mod script;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use rewind_history::{HistoryConfig, Store, Tracked};

/// Replays an undo/redo command script against a text state.
#[derive(Parser, Debug)]
#[command(name = "rewind", version, about)]
struct Cli {
    /// Script to run. Reads stdin when omitted.
    script: Option<PathBuf>,

    /// JSON file with `max_length` and `throttle_ms`.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of past states to keep.
    #[arg(long = "max-length")]
    max_length: Option<usize>,

    /// Drop new history entries for this many milliseconds after each one.
    #[arg(long)]
    throttle: Option<u64>,

    /// Initial state.
    #[arg(long, default_value = "")]
    initial: String,
}

impl Cli {
    fn history_config(&self) -> Result<HistoryConfig> {
        let mut config = match &self.config {
            Some(path) => HistoryConfig::load(path)?,
            None => HistoryConfig::default(),
        };
        if let Some(max_length) = self.max_length {
            config.max_length = max_length;
        }
        if let Some(throttle) = self.throttle {
            config.throttle_ms = throttle;
        }
        config.sanitize();
        Ok(config)
    }

    fn read_script(&self) -> Result<String> {
        match &self.script {
            Some(path) => std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read script {}", path.display())),
            None => {
                let mut source = String::new();
                std::io::stdin()
                    .read_to_string(&mut source)
                    .context("Failed to read script from stdin")?;
                Ok(source)
            }
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = cli.history_config()?;
    tracing::info!(?config, "Starting rewind");

    let source = cli.read_script()?;
    let commands = script::parse_script(&source)?;

    let mut state = Tracked::new(Store::new(cli.initial.clone()), config);
    let stdout = std::io::stdout();
    script::run(&mut state, &commands, &mut stdout.lock())?;

    Ok(())
}
