//! Run the bridge: mirror the configured Hue lights onto Govee devices until
//! Ctrl-C.
//!
//! Run with: cargo run --example hue2govee -- --config config.yaml

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use log::info;
use tracing_subscriber::filter::LevelFilter;

use hue_govee_bridge::hue::HueClient;
use hue_govee_bridge::runtime::{self, CancelToken};
use hue_govee_bridge::{Config, GoveeClient, Synchronizer};

/// How long each Govee scan listens for replies.
const SCAN_WINDOW: Duration = Duration::from_secs(2);
/// Pause between Govee scans.
const SCAN_INTERVAL: Duration = Duration::from_secs(10);

#[derive(Parser)]
#[command(name = "hue2govee")]
#[command(about = "Mirror Philips Hue lights onto Govee devices", long_about = None)]
struct Cli {
    /// Configuration file, YAML or JSON
    #[arg(short, long, default_value = "config.yaml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // The subscriber lets everything through; the config caps the log facade.
    tracing_subscriber::fmt()
        .with_max_level(LevelFilter::TRACE)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    config.apply_log_level();
    info!("starting Hue to Govee bridge for {}", config.hue_bridge_id);

    let hue = Arc::new(HueClient::from_config(&config)?);
    let govee = Arc::new(GoveeClient::new(config.govee_multicast_ip));
    let cancel = CancelToken::new();

    let scanner = Arc::clone(&govee);
    let scan_cancel = cancel.clone();
    runtime::spawn_detached(async move {
        scanner
            .run_discovery(SCAN_INTERVAL, SCAN_WINDOW, scan_cancel)
            .await
    });

    let sync = Arc::new(Synchronizer::new(hue, govee, config.poll_interval));
    let handles = sync.spawn(config.synchronizations, &cancel);

    tokio::signal::ctrl_c().await?;
    info!("shutting down Hue to Govee bridge");
    cancel.cancel();
    for handle in handles {
        handle.await;
    }
    sync.scenes().stop_all();

    Ok(())
}
