//! Misskey amesh bot.
//!
//! Listens for mentions on the Misskey streaming API and replies to
//! `amesh [place]` commands with a rain radar image:
//! - Location resolution (coordinates or Yahoo geocoder)
//! - Radar/basemap/lightning compositing
//! - Reconnects when the stream drops
//! - HTTP status and Prometheus metrics

use std::sync::Arc;
use std::time::Duration;

use amesh::{HttpFetcher, RenderConfig, ReqwestFetcher};
use anyhow::{Context, Result};
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use misskey_bot::server::{self, ServerState};
use misskey_bot::{Bot, MisskeyClient};

/// Wait before reconnecting after the stream drops.
const RECONNECT_DELAY: Duration = Duration::from_secs(5);

/// Additional wait after a failed reconnect.
const RECONNECT_FAILURE_DELAY: Duration = Duration::from_secs(10);

#[derive(Parser, Debug)]
#[command(name = "misskey-bot")]
#[command(about = "Misskey bot posting rain radar images for amesh commands")]
struct Args {
    /// Misskey instance domain, e.g. misskey.io
    #[arg(long, env = "MISSKEY_DOMAIN")]
    misskey_domain: String,

    /// Misskey API token
    #[arg(long, env = "MISSKEY_API_TOKEN", hide_env_values = true)]
    misskey_api_token: String,

    /// Yahoo! JAPAN application ID for geocoding
    #[arg(long, env = "YAHOO_API_TOKEN", hide_env_values = true)]
    yahoo_api_token: String,

    /// Log level
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Port for status HTTP server
    #[arg(long, env = "STATUS_PORT", default_value = "8080")]
    status_port: u16,

    /// Disable status HTTP server
    #[arg(long)]
    no_status_server: bool,
}

/// Sleep unless shutdown is requested first. Returns false on shutdown.
async fn sleep_or_shutdown(delay: Duration, shutdown: &CancellationToken) -> bool {
    tokio::select! {
        _ = tokio::time::sleep(delay) => true,
        _ = shutdown.cancelled() => false,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    // Initialize tracing
    let level = match args.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(true)
        .with_thread_ids(true)
        .json()
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    info!(domain = %args.misskey_domain, "Starting amesh bot");

    let prometheus = PrometheusBuilder::new()
        .install_recorder()
        .context("Failed to install Prometheus recorder")?;

    let shutdown = CancellationToken::new();

    if !args.no_status_server {
        let state = Arc::new(ServerState {
            prometheus: Some(prometheus),
        });
        let port = args.status_port;
        let token = shutdown.clone();
        tokio::spawn(async move {
            if let Err(e) = server::run_server(state, port, token).await {
                error!(error = %e, "Status server failed");
            }
        });
    }

    // Handle Ctrl+C
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c().await.ok();
        info!("Received shutdown signal");
        signal_token.cancel();
    });

    let config = RenderConfig::from_env();
    let fetcher: Arc<dyn HttpFetcher> =
        Arc::new(ReqwestFetcher::new(&config).context("Failed to create tile fetcher")?);
    let client = Arc::new(
        MisskeyClient::new(&args.misskey_domain, &args.misskey_api_token, &config.user_agent)
            .context("Failed to create Misskey client")?,
    );
    let bot = Arc::new(Bot::new(
        client.clone(),
        fetcher,
        config,
        args.yahoo_api_token.clone(),
    ));

    let mut stream = client
        .connect()
        .await
        .context("Failed to connect to Misskey")?;

    loop {
        let next = tokio::select! {
            _ = shutdown.cancelled() => break,
            next = stream.next_mention() => next,
        };

        match next {
            Ok(note) => {
                let bot = bot.clone();
                let token = shutdown.clone();
                tokio::spawn(async move {
                    tokio::select! {
                        outcome = bot.handle_note(&note) => {
                            info!(note_id = %note.id, outcome = ?outcome, "Handled mention");
                        }
                        _ = token.cancelled() => {
                            warn!(note_id = %note.id, "Abandoned mention on shutdown");
                        }
                    }
                });
            }
            Err(e) => {
                warn!(error = %e, "WebSocket connection lost, reconnecting");
                if !sleep_or_shutdown(RECONNECT_DELAY, &shutdown).await {
                    break;
                }
                match client.connect().await {
                    Ok(new_stream) => stream = new_stream,
                    Err(e) => {
                        error!(error = %e, "Failed to reconnect");
                        if !sleep_or_shutdown(RECONNECT_FAILURE_DELAY, &shutdown).await {
                            break;
                        }
                    }
                }
            }
        }
    }

    info!("amesh bot stopped");
    Ok(())
}
