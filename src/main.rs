mod app;
mod catalog;
mod config;
mod error;
mod jikan;
mod ui;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::app::App;
use crate::catalog::Location;
use crate::config::Config;
use crate::error::Result;
use crate::jikan::JikanClient;

/// Browse the anime catalog from the terminal
#[derive(Parser, Debug)]
#[command(name = "anidex", version, about)]
struct Cli {
    /// Location to open, e.g. "/?q=naruto&page=2" or "/anime/20"
    location: Option<String>,

    /// Use this config file instead of the default one
    #[arg(short, long)]
    config: Option<PathBuf>,
}

fn setup_logging() -> Result<()> {
    let data_dir = config::data_dir()?;
    std::fs::create_dir_all(&data_dir)?;

    let file_appender = tracing_appender::rolling::daily(&data_dir, "anidex.log");
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("anidex=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Log to a file, the terminal belongs to the TUI
    if let Err(e) = setup_logging() {
        eprintln!("Warning: Could not set up logging: {}", e);
    }

    info!("Starting anidex");

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    info!(base_url = %config.api.base_url, "Loaded config");

    let start = match cli.location.as_deref() {
        Some(raw) => Location::parse(raw)?,
        None => Location::root(),
    };

    let api = Arc::new(JikanClient::from_config(&config.api)?);

    let mut terminal = app::init_terminal()?;

    let mut app = App::new(config, api, start);
    let result = app.run(&mut terminal).await;

    app::restore_terminal()?;

    result
}
