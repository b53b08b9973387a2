//! podsync - drive a pedal board controller against a simulated device

use std::path::Path;

use clap::Parser;
use tracing::error;
use tracing_subscriber::EnvFilter;

use podsync_cli::{Cli, CliAppConfig, CommandDispatcher, PodsyncApp, Result};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);

    let config = CliAppConfig::load(cli.config.as_deref().map(Path::new))?;
    let app = PodsyncApp::new(config)?;

    let mut stdout = std::io::stdout();
    let result = CommandDispatcher::execute(&app, &cli.command, &mut stdout).await;
    app.shutdown().await;

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

/// Setup logging based on verbosity level; `RUST_LOG` wins when set
fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
