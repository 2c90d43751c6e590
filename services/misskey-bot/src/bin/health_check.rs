//! Container health probe: exits non-zero unless the bot's status
//! endpoint answers 2xx.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "health-check")]
#[command(about = "Check that the amesh bot status endpoint is up")]
struct Args {
    /// Status endpoint to probe
    #[arg(long, env = "HEALTH_CHECK_URL", default_value = "http://localhost:8080/status")]
    url: String,

    /// Request timeout in seconds
    #[arg(long, default_value = "5")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout_secs))
        .build()
        .context("Failed to create HTTP client")?;

    let response = client
        .get(&args.url)
        .send()
        .await
        .with_context(|| format!("GET {} failed", args.url))?;

    if !response.status().is_success() {
        bail!("{} returned status {}", args.url, response.status());
    }

    println!("Health check passed");
    Ok(())
}
