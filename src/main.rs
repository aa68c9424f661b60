use anyhow::Result;
use clap::Parser;

use bundle_api::cli::commands::config::ConfigCommand;
use bundle_api::cli::commands::simulate::SimulateCommand;
use bundle_api::cli::commands::transitions::TransitionsCommand;
use bundle_api::cli::commands::Command;
use bundle_api::cli::{Cli, Commands};
use bundle_api::{init_telemetry, BundleApiConfig};

#[tokio::main]
async fn main() -> Result<()> {
    BundleApiConfig::load_env_file()?;
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => {
            anyhow::ensure!(path.exists(), "config file not found: {}", path.display());
            BundleApiConfig::load_from(path)?
        }
        None => BundleApiConfig::load()?,
    };
    init_telemetry(&config.observability)?;

    match cli.command {
        Commands::Transitions => TransitionsCommand::new().execute().await,
        Commands::Config { write } => ConfigCommand::new(config).with_output(write).execute().await,
        Commands::Simulate {
            fixture,
            bundle,
            state,
            if_match,
            token,
        } => {
            SimulateCommand::new(config, fixture, bundle, state)
                .with_if_match(if_match)
                .with_token(token)
                .execute()
                .await
        }
    }
}
