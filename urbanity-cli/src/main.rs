use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use urbanity::DEFAULT_ENDPOINT;

mod commands;

/// Urban/Rural classification CLI tool
#[derive(Parser)]
#[command(name = "urbanity")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// TIGERweb query endpoint
    #[arg(
        short,
        long,
        env = "URBANITY_ENDPOINT",
        default_value = DEFAULT_ENDPOINT,
        global = true
    )]
    endpoint: String,

    /// Outbound request timeout in seconds (no timeout if unset)
    #[arg(short, long, env = "URBANITY_TIMEOUT_SECS", global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single coordinate
    Query {
        /// Latitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,

        /// Longitude in decimal degrees
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,

        /// Output the full evaluation as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Classify every row of a CSV file
    Batch {
        /// Input CSV file
        input: PathBuf,

        /// Output file (defaults to <input>_urbanity.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Column name for latitude
        #[arg(long, default_value = "lat")]
        lat_col: String,

        /// Column name for longitude
        #[arg(long, default_value = "lng")]
        lng_col: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Query { lat, lng, json } => {
            commands::query::run(&cli.endpoint, cli.timeout, lat, lng, json).await
        }
        Commands::Batch {
            input,
            output,
            lat_col,
            lng_col,
        } => {
            commands::batch::run(
                &cli.endpoint,
                cli.timeout,
                input,
                output,
                &lat_col,
                &lng_col,
            )
            .await
        }
    }
}
