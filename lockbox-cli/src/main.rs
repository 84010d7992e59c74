//! Interactive SecureLockbox client.
//!
//! Discovers and connects to the peripheral, identifies itself by writing the
//! username, then runs the command dispatcher and the telemetry monitor as
//! two cooperative tasks over one shared session.

mod commands;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::sync::{Mutex, watch};

use lockbox_client::{BleTransport, LockboxClient, Session};
use lockbox_monitor::{Monitor, TagoSink};

#[derive(Parser)]
#[command(name = "lockbox")]
#[command(about = "PC-side client for the SecureLockbox peripheral")]
struct Cli {
    /// Advertised name of the peripheral
    #[arg(long, default_value = lockbox_proto::DEVICE_NAME)]
    device: String,

    /// Scan windows to try before giving up
    #[arg(long, default_value_t = 5)]
    scan_attempts: u32,

    /// Telemetry interval in seconds
    #[arg(long, default_value_t = 2)]
    interval: u64,

    /// TagoIO data endpoint
    #[arg(long, default_value = "https://api.tago.io/data")]
    tago_url: String,

    /// TagoIO device token; telemetry is disabled when unset
    #[arg(long, env = "TAGO_DEVICE_TOKEN", hide_env_values = true)]
    tago_token: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let transport = BleTransport::new().await?;
    let mut client = LockboxClient::new(Session::new(transport));

    let peripheral = client.discover(&cli.device, cli.scan_attempts).await?;
    client.connect(&peripheral).await?;

    // Identify as the PC client. The peripheral regenerates its passcode on a
    // username write, so give it a moment before the first status read.
    client.write_username("PC_CLIENT").await?;
    tokio::time::sleep(Duration::from_secs(1)).await;

    let client = Arc::new(Mutex::new(client));
    commands::print_status(&client).await;

    let (stop_tx, stop_rx) = watch::channel(false);
    let monitor = Monitor {
        interval: Duration::from_secs(cli.interval),
        ..Monitor::default()
    };

    let telemetry = async {
        match &cli.tago_token {
            Some(token) => {
                let sink = TagoSink::new(cli.tago_url.clone(), token.clone());
                monitor.run(client.clone(), sink, stop_rx).await;
            }
            None => tracing::warn!("no device token configured, telemetry disabled"),
        }
    };

    let dispatcher = async {
        tokio::select! {
            _ = commands::repl(&client) => {}
            _ = tokio::signal::ctrl_c() => println!(),
        }
        let _ = stop_tx.send(true);
    };

    tokio::join!(telemetry, dispatcher);

    client.lock().await.disconnect().await;
    Ok(())
}
