mod find;
mod stations;

use clap::{CommandFactory, Parser, Subcommand};
use fuelmap_core::{load_station_config, StationConfig};
use tracing_subscriber::EnvFilter;

use crate::find::FindArgs;

#[derive(Debug, Parser)]
#[command(name = "fuelmap")]
#[command(about = "Find nearby fuel stations, filter by brand, and route to one")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Locate, search nearby stations, and route to the nearest visible one
    Find(FindArgs),
    /// Print the fuel price table
    Prices {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Print the known brands in classification order
    Brands,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = fuelmap_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    let stations = load_stations(&config.stations_path)?;
    match command {
        Commands::Find(args) => find::run_find(&config, &stations, &args).await?,
        Commands::Prices { json } => stations::run_prices(&stations, json)?,
        Commands::Brands => stations::run_brands(&stations),
    }

    Ok(())
}

/// Reads the stations file, falling back to built-in defaults when it does
/// not exist. A file that exists but is invalid is an error.
fn load_stations(path: &std::path::Path) -> anyhow::Result<StationConfig> {
    if !path.exists() {
        tracing::warn!(path = %path.display(), "stations file not found; using built-in defaults");
        return Ok(StationConfig::default());
    }
    Ok(load_station_config(path)?)
}
