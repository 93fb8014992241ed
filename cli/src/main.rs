use clap::Parser;
use std::error::Error;
use std::io;
use tracing::error;

use tile_overlay_cli::args::Cli;
use tile_overlay_cli::bootstrap::state::AppState;
use tile_overlay_cli::commands;
use tile_overlay_cli::config_loader;
use tile_overlay_cli::observability;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let mut config = config_loader::load_config(&cli.config_dir)?;
    if let Some(storage) = &cli.storage {
        config.storage.path = storage.display().to_string();
    }

    observability::tracing::setup_logging(&config)?;
    observability::startup_info::log_startup_info(&config);

    let mut state = AppState::new(config)?;
    let mut stdout = io::stdout();

    if let Err(e) = commands::run(cli.command, &mut state, &mut stdout).await {
        error!("Command failed: {}", e);
        return Err(e.into());
    }
    Ok(())
}
