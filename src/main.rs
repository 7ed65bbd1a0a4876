#![warn(clippy::all, clippy::pedantic)]

use anyhow::Result;
use clap::Parser;
use launch_studio::app;
use launch_studio::cli::Cli;
use launch_studio::config::Config;
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load_or_init()?;

    // `LAUNCH_STUDIO_LOG` is already folded into the config by env overrides.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.observability.level())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    app::dispatch(cli, config).await
}
