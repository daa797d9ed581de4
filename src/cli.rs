use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tracing::info;

use crate::api::AppState;
use crate::config::TravelAiConfig;
use crate::generation::{GroqItineraryGenerator, ItineraryGenerator, download_file_name};
use crate::models::TravelPreferences;
use crate::storage::Storage;
use crate::web;

#[derive(Parser)]
#[command(author, version, about, long_about = None, propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to `<config dir>/travelai/config.toml`).
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level.
    #[clap(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP API.
    Serve {
        /// Overrides `server.port`.
        #[clap(long)]
        port: Option<u16>,
    },

    /// Extract and geocode the places in an itinerary, printing the report as JSON.
    Extract {
        /// Itinerary text file, or `-` for stdin.
        input: String,
    },

    /// Generate an itinerary and print it.
    Generate {
        #[clap(long)]
        destination: String,

        /// Trip length, e.g. "5 days".
        #[clap(long)]
        duration: String,

        /// Budget level, e.g. "mid-range".
        #[clap(long)]
        budget: String,

        #[clap(long, default_value = "1")]
        travelers: String,

        #[clap(long, value_delimiter = ',', num_args = 1..)]
        interests: Vec<String>,

        #[clap(long, default_value = "")]
        accommodation: String,

        #[clap(long, default_value = "")]
        transportation: String,

        /// Free-text additional requests.
        #[clap(long, default_value = "")]
        requests: String,

        /// Also write the itinerary to `<destination>_itinerary.txt`.
        #[clap(long)]
        save: bool,
    },
}

fn open_storage(config: &TravelAiConfig) -> Result<Storage> {
    Storage::open(config.storage.resolved_path())
}

async fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut text = String::new();
        tokio::io::stdin()
            .read_to_string(&mut text)
            .await
            .context("Failed to read itinerary from stdin")?;
        Ok(text)
    } else {
        tokio::fs::read_to_string(input)
            .await
            .with_context(|| format!("Failed to read itinerary from {input}"))
    }
}

/// Execute a parsed command against a loaded configuration
pub async fn run(command: Command, mut config: TravelAiConfig) -> Result<()> {
    match command {
        Command::Serve { port } => {
            if let Some(port) = port {
                config.server.port = port;
            }
            let storage = open_storage(&config)?;
            let state = AppState::from_config(&config, &storage)?;
            web::run(state, &config.server).await
        }

        Command::Extract { input } => {
            let text = read_input(&input).await?;
            let storage = open_storage(&config)?;
            let state = AppState::from_config(&config, &storage)?;

            let report = state.pipeline.extract_locations(&text).await;
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }

        Command::Generate {
            destination,
            duration,
            budget,
            travelers,
            interests,
            accommodation,
            transportation,
            requests,
            save,
        } => {
            let preferences = TravelPreferences {
                destination,
                duration,
                budget,
                travelers,
                interests,
                accommodation,
                transportation,
                additional_requests: requests,
            };
            preferences.validate()?;

            let generator = GroqItineraryGenerator::new(&config.generation)?;
            let itinerary = generator.generate(&preferences).await?;
            println!("{itinerary}");

            if save {
                let file_name = download_file_name(&preferences.destination);
                tokio::fs::write(&file_name, &itinerary)
                    .await
                    .with_context(|| format!("Failed to write {file_name}"))?;
                info!("Saved itinerary to {}", file_name);
            }
            Ok(())
        }
    }
}
