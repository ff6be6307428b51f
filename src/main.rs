//! Group service binary.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;

use group_service::config::loader::load_config;
use group_service::config::ServerConfig;
use group_service::observability::{logging, metrics};
use group_service::store::memory::MemoryStore;
use group_service::store::{seed, GroupStore};
use group_service::{HttpServer, Shutdown};

#[derive(Parser)]
#[command(name = "group-server")]
#[command(about = "User group management service", long_about = None)]
struct Args {
    /// Path to the TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    logging::init(&config.observability);

    tracing::info!("group-server v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        edit_policy = ?config.auth.edit_policy,
        request_timeout_secs = config.listener.request_timeout_secs,
        "Configuration loaded"
    );

    let store: Arc<dyn GroupStore> = match &config.store.seed_path {
        Some(path) => {
            let store = seed::load_store(path.as_ref())?;
            tracing::info!(seed_path = %path, "Store seeded");
            Arc::new(store)
        }
        None => {
            tracing::warn!("No seed file configured; starting with an empty store");
            Arc::new(MemoryStore::new())
        }
    };

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let shutdown = Shutdown::new();

    let server = HttpServer::new(&config, store);
    server.run(listener, &shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
