//! Command-line amesh renderer.

use std::path::PathBuf;

use amesh::{RenderConfig, ReqwestFetcher};
use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use amesh_cli::render_to_file;

#[derive(Parser)]
#[command(name = "amesh-cli")]
#[command(about = "Render rain radar images for a place", long_about = None)]
struct Cli {
    /// Yahoo! JAPAN application ID for geocoding
    #[arg(long, env = "YAHOO_API_TOKEN", hide_env_values = true)]
    yahoo_api_token: String,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the radar image around a place name or "lat lng" pair
    Amesh {
        /// Place name or coordinates (default: 東京)
        place: Vec<String>,

        /// Directory to write the PNG into
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Map zoom level
        #[arg(short, long, default_value = "10", value_parser = clap::value_parser!(i32).range(0..=30))]
        zoom: i32,

        /// Tiles drawn on each side of the centre tile
        #[arg(long, default_value = "2")]
        tile_radius: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "error" => Level::ERROR,
        _ => Level::WARN,
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Amesh {
            place,
            output_dir,
            zoom,
            tile_radius,
        } => {
            let config = RenderConfig {
                zoom,
                tile_radius,
                ..RenderConfig::from_env()
            };
            let fetcher = ReqwestFetcher::new(&config)?;

            let rendered = render_to_file(
                &fetcher,
                &config,
                &place.join(" "),
                &cli.yahoo_api_token,
                &output_dir,
            )
            .await?;

            println!("{}", rendered.path.display());
        }
    }

    Ok(())
}
