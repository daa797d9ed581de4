use anyhow::Result;
use clap::Parser;

use travelai::cli::{self, Cli};
use travelai::{TravelAiConfig, logging};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = TravelAiConfig::load_from_path(cli.config.clone())?;
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    logging::init(&config.logging)?;

    cli::run(cli.command, config).await
}
