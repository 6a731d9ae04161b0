use std::path::PathBuf;

use battleship::{BattleshipServer, ServerConfig};
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Battleship over TCP.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Port to listen on, on all interfaces [default: 9090]
    #[arg(short, long, value_parser = clap::value_parser!(u16).range(1..), conflicts_with = "bind")]
    port: Option<u16>,

    /// Full address to listen on, e.g. 127.0.0.1:9090
    #[arg(long)]
    bind: Option<String>,

    /// JSON configuration file; command-line options override it
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    initialize_logging();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    } else if let Some(port) = args.port {
        config.bind_addr = format!("0.0.0.0:{port}");
    }

    let server = BattleshipServer::builder().config(config).build().await?;
    let handle = server.start()?;
    tracing::info!(addr = %handle.local_addr(), "press Ctrl-C to stop");

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    handle.stop().await;
    Ok(())
}

fn initialize_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
